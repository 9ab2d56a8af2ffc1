//! Streaming plumbing around the codec
//!
//! Channels, labels and the frame synchronizer that turn a continuous symbol stream into
//! whole-codeword work items.

pub mod buffer;
pub mod channel;
pub mod label;
pub mod memory;
pub mod propagate;
pub mod sync;

pub use buffer::SymbolBuffer;
pub use channel::{InputChannel, OutputChannel};
pub use label::Label;
pub use memory::{MemoryInput, MemoryOutput};
pub use propagate::LabelPropagator;
pub use sync::{Alignment, FrameSynchronizer};
