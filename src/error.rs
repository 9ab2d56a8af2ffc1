//! Error types for codec configuration and codeword operations

use thiserror::Error;

/// Field parameters that violate the code's structural limits
///
/// Raised when a codec is constructed or reconfigured, never while streaming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// Symbol size does not fit the storage type
    #[error("Symbol size cannot be larger than the element type: {symbol_size} > {max}")]
    SymbolSizeTooLarge { symbol_size: u32, max: u32 },

    /// First consecutive root index outside the field
    #[error("FCR cannot be greater or equal to the number of symbol values: {fcr} >= {limit}")]
    FcrOutOfRange { fcr: u32, limit: u64 },

    /// Primitive element is zero or outside the field
    #[error("Primitive element {prim} outside range [1, {limit})")]
    PrimElementOutOfRange { prim: u32, limit: u64 },

    /// More roots than field elements
    #[error(
        "Number of roots cannot be greater or equal to the number of symbol values: {num_roots} >= {limit}"
    )]
    NumRootsOutOfRange { num_roots: u32, limit: u64 },

    /// Parity would fill the whole codeword
    #[error("Codeword has no data symbols: {num_roots} roots in a {nn}-symbol codeword")]
    NoDataSymbols { num_roots: u32, nn: u64 },
}

/// Table construction failed for parameters that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldInitError {
    /// The field polynomial does not generate every non-zero element
    #[error("Field polynomial {poly:#x} is not primitive for GF(2^{symbol_size})")]
    NotPrimitive { poly: u32, symbol_size: u32 },

    /// No prim-th root of unity exists in the field
    #[error("Primitive element {prim} shares a factor with the field order {nn}")]
    NoPrimitiveRoot { prim: u32, nn: usize },
}

/// Malformed arguments to a single-codeword operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer length does not match the code geometry
    #[error("Block length mismatch: expected {expected} symbols, got {actual}")]
    BlockLength { expected: usize, actual: usize },

    /// Erasure index outside the codeword
    #[error("Erasure position {position} outside codeword of {nn} symbols")]
    ErasurePosition { position: usize, nn: usize },

    /// The same position was listed as erased twice
    #[error("Erasure position {0} listed more than once")]
    DuplicateErasure(usize),

    /// More erasures than parity symbols
    #[error("Too many erasures: {count} > {max}")]
    TooManyErasures { count: usize, max: usize },
}

/// Errors surfaced by the codec and its stages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FecError {
    #[error("Invalid field parameters: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Field initialization failed: {0}")]
    FieldInit(#[from] FieldInitError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Type alias for Result with FecError
pub type Result<T> = std::result::Result<T, FecError>;
