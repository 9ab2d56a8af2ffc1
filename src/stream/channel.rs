//! Port capabilities a stage needs from its host
//!
//! The host owns the actual buffering and scheduling. A stage only sees the readable window
//! of its input, the free space of its output and the labels attached to either.

use crate::reed_solomon::Symbol;
use crate::stream::buffer::SymbolBuffer;
use crate::stream::label::Label;

/// Readable side of a symbol stream
pub trait InputChannel<T: Symbol> {
    /// Symbols readable from the head
    fn available(&self) -> usize;

    /// The readable symbols, starting at the head
    fn buffer(&self) -> &[T];

    /// Labels on readable symbols, indices relative to the head, ordered by index
    fn peek_labels(&self) -> Vec<Label>;

    /// Advance the head by `n` symbols, dropping their labels
    fn consume(&mut self, n: usize);

    /// Ask the host not to schedule the stage again until `n` symbols are readable
    fn set_reserve(&mut self, n: usize);

    /// Move the next `n` symbols out without copying and advance the head
    fn take(&mut self, n: usize) -> SymbolBuffer<T>;
}

/// Writable side of a symbol stream
pub trait OutputChannel<T: Symbol> {
    /// Symbols that may still be produced
    fn capacity(&self) -> usize;

    /// Copy `symbols` out and advance the write head
    fn write(&mut self, symbols: &[T]);

    /// Forward a buffer without copying and advance the write head
    fn post_buffer(&mut self, buffer: SymbolBuffer<T>);

    /// Attach a label whose index is relative to the current write head
    fn attach_label(&mut self, label: Label);
}
