//! In-memory channels
//!
//! [`MemoryInput`] feeds a stage from symbols already in memory and [`MemoryOutput`] collects
//! what it produces. Labels are stored against absolute stream positions and translated to
//! head-relative indices at the channel boundary.

use crate::reed_solomon::Symbol;
use crate::stream::buffer::SymbolBuffer;
use crate::stream::channel::{InputChannel, OutputChannel};
use crate::stream::label::Label;

/// Input channel backed by a single contiguous window
#[derive(Debug, Clone)]
pub struct MemoryInput<T> {
    pending: SymbolBuffer<T>,
    position: usize,
    /// Labels by absolute stream position, sorted
    labels: Vec<Label>,
    reserve: usize,
}

impl<T: Symbol> Default for MemoryInput<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Symbol> MemoryInput<T> {
    pub fn new() -> Self {
        Self {
            pending: SymbolBuffer::default(),
            position: 0,
            labels: Vec::new(),
            reserve: 0,
        }
    }

    pub fn from_symbols(symbols: Vec<T>) -> Self {
        let mut input = Self::new();
        input.feed_buffer(symbols.into());
        input
    }

    /// Append symbols to the readable window
    pub fn feed(&mut self, symbols: &[T]) {
        if symbols.is_empty() {
            return;
        }
        if self.pending.is_empty() {
            self.pending = symbols.to_vec().into();
        } else {
            self.pending = self.joined(symbols).into();
        }
    }

    /// Append a shared buffer, without copying when the window is empty
    pub fn feed_buffer(&mut self, buffer: SymbolBuffer<T>) {
        if self.pending.is_empty() {
            self.pending = buffer;
        } else if !buffer.is_empty() {
            self.pending = self.joined(&buffer).into();
        }
    }

    fn joined(&self, tail: &[T]) -> Vec<T> {
        let mut joined = Vec::with_capacity(self.pending.len() + tail.len());
        joined.extend_from_slice(&self.pending);
        joined.extend_from_slice(tail);
        joined
    }

    /// Attach a label; `label.index` is relative to the current head and may point past
    /// the symbols fed so far
    pub fn post_label(&mut self, label: Label) {
        let absolute = self.position + label.index;
        let slot = self.labels.partition_point(|l| l.index <= absolute);
        self.labels.insert(slot, label.at(absolute));
    }

    /// Symbols consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Most recent reserve requested by the stage
    pub fn reserve(&self) -> usize {
        self.reserve
    }

    fn advance(&mut self, n: usize) {
        self.position += n;
        let position = self.position;
        self.labels.retain(|l| l.index >= position);
    }
}

impl<T: Symbol> InputChannel<T> for MemoryInput<T> {
    fn available(&self) -> usize {
        self.pending.len()
    }

    fn buffer(&self) -> &[T] {
        &self.pending
    }

    fn peek_labels(&self) -> Vec<Label> {
        let end = self.position + self.pending.len();
        self.labels
            .iter()
            .filter(|l| l.index < end)
            .map(|l| l.at(l.index - self.position))
            .collect()
    }

    fn consume(&mut self, n: usize) {
        self.pending.split_to(n);
        self.advance(n);
    }

    fn set_reserve(&mut self, n: usize) {
        self.reserve = n;
    }

    fn take(&mut self, n: usize) -> SymbolBuffer<T> {
        let head = self.pending.split_to(n);
        self.advance(n);
        head
    }
}

/// Output channel collecting everything a stage produces
#[derive(Debug, Clone)]
pub struct MemoryOutput<T> {
    chunks: Vec<SymbolBuffer<T>>,
    /// Labels by absolute stream position
    labels: Vec<Label>,
    produced: usize,
    limit: Option<usize>,
}

impl<T: Symbol> Default for MemoryOutput<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Symbol> MemoryOutput<T> {
    /// Output with unbounded capacity
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            labels: Vec::new(),
            produced: 0,
            limit: None,
        }
    }

    /// Output that accepts at most `limit` symbols until more is granted
    pub fn with_capacity(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Raise the capacity limit by `n` symbols
    pub fn grant(&mut self, n: usize) {
        if let Some(limit) = self.limit.as_mut() {
            *limit += n;
        }
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Buffers in the order they were written or posted
    pub fn chunks(&self) -> &[SymbolBuffer<T>] {
        &self.chunks
    }

    /// All produced symbols as one vector
    pub fn symbols(&self) -> Vec<T> {
        let mut symbols = Vec::with_capacity(self.produced);
        for chunk in &self.chunks {
            symbols.extend_from_slice(chunk);
        }
        symbols
    }

    /// Labels with absolute output positions, in attachment order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn labels_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Label> + 'a {
        self.labels.iter().filter(move |l| l.has_id(id))
    }

    /// Turn the collected stream into the input of a following stage
    pub fn into_input(self) -> MemoryInput<T> {
        let mut input = MemoryInput::new();
        if self.chunks.len() == 1 {
            input.feed_buffer(self.chunks[0].clone());
        } else {
            input.feed(&self.symbols());
        }
        for label in self.labels {
            input.post_label(label);
        }
        input
    }
}

impl<T: Symbol> OutputChannel<T> for MemoryOutput<T> {
    fn capacity(&self) -> usize {
        match self.limit {
            Some(limit) => limit.saturating_sub(self.produced),
            None => usize::MAX,
        }
    }

    fn write(&mut self, symbols: &[T]) {
        if symbols.is_empty() {
            return;
        }
        self.produced += symbols.len();
        self.chunks.push(symbols.to_vec().into());
    }

    fn post_buffer(&mut self, buffer: SymbolBuffer<T>) {
        if buffer.is_empty() {
            return;
        }
        self.produced += buffer.len();
        self.chunks.push(buffer);
    }

    fn attach_label(&mut self, label: Label) {
        let absolute = self.produced + label.index;
        self.labels.push(label.at(absolute));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_the_head() {
        let mut input = MemoryInput::from_symbols(vec![0u8; 10]);
        input.post_label(Label::new("a", 3));
        input.post_label(Label::new("b", 12));

        assert_eq!(input.peek_labels(), vec![Label::new("a", 3)]);

        input.consume(2);
        assert_eq!(input.peek_labels(), vec![Label::new("a", 1)]);

        input.feed(&[0; 5]);
        assert_eq!(
            input.peek_labels(),
            vec![Label::new("a", 1), Label::new("b", 10)]
        );

        input.consume(4);
        assert_eq!(input.peek_labels(), vec![Label::new("b", 6)]);
        assert_eq!(input.position(), 6);
    }

    #[test]
    fn test_take_is_zero_copy() {
        let source = SymbolBuffer::from(vec![1u16, 2, 3, 4]);
        let mut input = MemoryInput::new();
        input.feed_buffer(source.clone());

        let head = input.take(3);
        assert_eq!(&*head, &[1, 2, 3]);
        assert!(head.shares_storage(&source));
        assert_eq!(input.buffer(), &[4]);
    }

    #[test]
    fn test_output_capacity_and_labels() {
        let mut output = MemoryOutput::<u8>::with_capacity(4);
        assert_eq!(output.capacity(), 4);

        output.attach_label(Label::new("x", 1));
        output.write(&[1, 2, 3]);
        output.attach_label(Label::new("y", 0));
        assert_eq!(output.capacity(), 1);

        output.grant(10);
        assert_eq!(output.capacity(), 11);
        assert_eq!(output.labels(), &[Label::new("x", 1), Label::new("y", 3)]);
        assert_eq!(output.labels_with_id("y").count(), 1);
    }

    #[test]
    fn test_into_input_keeps_positions() {
        let mut output = MemoryOutput::<u8>::new();
        output.write(&[1, 2]);
        output.attach_label(Label::new("m", 1));
        output.write(&[3, 4]);

        let input = output.into_input();
        assert_eq!(input.buffer(), &[1, 2, 3, 4]);
        assert_eq!(input.peek_labels(), vec![Label::new("m", 3)]);
    }
}
