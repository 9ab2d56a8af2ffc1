//! Shared symbol buffers for zero-copy forwarding
//!
//! A [`SymbolBuffer`] is a window onto reference-counted storage. Splitting or slicing a
//! buffer never copies symbols, so a stage can hand the exact memory it received to its
//! output channel.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Window `[offset, offset + len)` onto shared symbol storage
#[derive(Clone)]
pub struct SymbolBuffer<T> {
    storage: Arc<[T]>,
    offset: usize,
    len: usize,
}

impl<T> SymbolBuffer<T> {
    /// Buffer covering all of `storage`
    pub fn new(storage: Arc<[T]>) -> Self {
        let len = storage.len();
        Self {
            storage,
            offset: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.storage[self.offset..self.offset + self.len]
    }

    /// Split off the first `at` symbols, leaving the remainder in `self`
    ///
    /// # Panics
    /// Panics if `at > self.len()`.
    pub fn split_to(&mut self, at: usize) -> Self {
        assert!(
            at <= self.len,
            "split_to out of bounds: {} > {}",
            at,
            self.len
        );

        let head = Self {
            storage: Arc::clone(&self.storage),
            offset: self.offset,
            len: at,
        };
        self.offset += at;
        self.len -= at;
        head
    }

    /// True when both windows point into the same allocation
    pub fn shares_storage(&self, other: &SymbolBuffer<T>) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<T> Deref for SymbolBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> From<Vec<T>> for SymbolBuffer<T> {
    fn from(symbols: Vec<T>) -> Self {
        Self::new(symbols.into())
    }
}

impl<T> Default for SymbolBuffer<T> {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl<T: fmt::Debug> fmt::Debug for SymbolBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolBuffer")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("symbols", &self.as_slice())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for SymbolBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for SymbolBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_to_shares_storage() {
        let mut buffer = SymbolBuffer::from(vec![1u8, 2, 3, 4, 5]);
        let head = buffer.split_to(2);

        assert_eq!(&*head, &[1, 2]);
        assert_eq!(&*buffer, &[3, 4, 5]);
        assert!(head.shares_storage(&buffer));
    }

    #[test]
    fn test_equality_ignores_storage() {
        let a = SymbolBuffer::from(vec![7u8, 8]);
        let mut b = SymbolBuffer::from(vec![6u8, 7, 8]);
        b.split_to(1);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_split_past_end() {
        let mut buffer = SymbolBuffer::from(vec![1u8]);
        buffer.split_to(2);
    }
}
