//! Storage types for code symbols
//!
//! A `symbol_size`-bit field element rides in the low bits of an unsigned integer. The byte
//! codec uses `u8`; wider types carry larger fields with the same codec.

use bytemuck::Pod;
use std::fmt::Debug;

/// Integral storage type for one code symbol
pub trait Symbol: Pod + Default + Debug + Eq + Send + Sync + 'static {
    /// Width of the storage type in bits
    const BITS: u32;

    /// Largest field exponent this type may be configured with
    const MAX_SYMBOL_SIZE: u32;

    /// Raw symbol value as a field word (upper bits included)
    fn to_field(self) -> u32;

    /// Build a symbol from a field word, truncating to the storage width
    fn from_field(value: u32) -> Self;
}

macro_rules! impl_symbol {
    ($ty:ty, $max:expr) => {
        impl Symbol for $ty {
            const BITS: u32 = (std::mem::size_of::<$ty>() * 8) as u32;
            const MAX_SYMBOL_SIZE: u32 = $max;

            #[inline]
            fn to_field(self) -> u32 {
                self as u32
            }

            #[inline]
            fn from_field(value: u32) -> Self {
                value as $ty
            }
        }
    };
}

impl_symbol!(u8, 8);
impl_symbol!(u16, 16);
// Log/antilog tables hold 2^symbol_size entries; 24 bits already needs 64 MiB per table.
impl_symbol!(u32, 24);

/// Serialize symbols as native-endian bytes for a label payload
pub fn symbols_to_bytes<T: Symbol>(symbols: &[T]) -> Vec<u8> {
    bytemuck::cast_slice::<T, u8>(symbols).to_vec()
}

/// Rebuild symbols from a label payload
///
/// Returns `None` when the payload is not a whole number of symbols.
pub fn symbols_from_bytes<T: Symbol>(bytes: &[u8]) -> Option<Vec<T>> {
    let width = std::mem::size_of::<T>();
    if bytes.len() % width != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(width)
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect(),
    )
}
