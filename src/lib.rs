//! Streaming Reed-Solomon forward error correction
//!
//! The crate has three layers:
//!
//! - [`reed_solomon`]: GF(2^m) tables and a systematic codec for one codeword at a time
//! - [`stream`]: channels, labels and the frame synchronizer
//! - [`coder`]: encoder and decoder stages that tie the two together
//!
//! ```
//! use rsfec::{FieldParameters, MemoryInput, MemoryOutput, RsDecoder, RsEncoder, run_stage};
//!
//! let params = FieldParameters::new(8, 0x11d, 0, 1, 32);
//! let data: Vec<u8> = (0..223u32 * 2).map(|i| i as u8).collect();
//!
//! let mut encoder = RsEncoder::<u8>::new(params, None).unwrap();
//! let mut input = MemoryInput::from_symbols(data.clone());
//! let mut encoded = MemoryOutput::new();
//! run_stage(&mut encoder, &mut input, &mut encoded).unwrap();
//!
//! let mut decoder = RsDecoder::<u8>::new(params, None).unwrap();
//! let mut decoded = MemoryOutput::new();
//! run_stage(&mut decoder, &mut encoded.into_input(), &mut decoded).unwrap();
//! assert_eq!(decoded.symbols(), data);
//! ```

pub mod coder;
pub mod config;
pub mod error;
pub mod notify;
pub mod reed_solomon;
pub mod reporters;
pub mod stream;

pub use coder::{
    run_stage, CodecStats, CoderSettings, ParityMode, RsDecoder, RsEncoder, RunSummary, Stage,
    StepOutcome, StepReport,
};
pub use config::StageConfig;
pub use error::{CodecError, FecError, FieldInitError, ParameterError, Result};
pub use notify::{ParameterEvent, ParameterListener};
pub use reed_solomon::{DecodeOutcome, FieldParameters, FieldTables, ReedSolomon, Symbol};
pub use stream::{
    FrameSynchronizer, InputChannel, Label, MemoryInput, MemoryOutput, OutputChannel,
    SymbolBuffer,
};
