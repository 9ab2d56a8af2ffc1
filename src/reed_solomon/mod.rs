//! Reed-Solomon Error Correction Module
//!
//! Systematic Reed-Solomon codes over GF(2^m) for any symbol size the storage type allows.
//! The field and generator polynomial are derived from five integers (see [`FieldParameters`]),
//! so the same codec serves the classic (255,223) byte codes, CCSDS, and wider 16-bit fields.

mod bmcf;
pub mod codec;
pub mod galois;
pub mod symbol;

pub use codec::{DecodeOutcome, ReedSolomon};
pub use galois::{FieldParameters, FieldTables};
pub use symbol::{symbols_from_bytes, symbols_to_bytes, Symbol};
