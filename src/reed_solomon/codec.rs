//! Systematic Reed-Solomon codec over one codeword at a time
//!
//! Codeword layout is `[d0 … d(kk-1) p0 … p(num_roots-1)]`: `d0` carries the highest-order
//! coefficient of the received polynomial, matching the classic shift-register encoder.
//! Symbol bits above `symbol_size` take no part in the arithmetic and pass through unchanged.

use crate::error::{CodecError, Result};
use crate::reed_solomon::bmcf::{locate, Located};
use crate::reed_solomon::galois::{FieldParameters, FieldTables};
use crate::reed_solomon::symbol::Symbol;
use smallvec::{smallvec, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Result of decoding one codeword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// All syndromes were zero
    Clean,
    /// Errors were found and repaired at these codeword positions
    Corrected { positions: Vec<usize> },
    /// The error pattern exceeds the code's capability; the codeword was left untouched
    Uncorrectable,
}

impl DecodeOutcome {
    /// Number of symbols rewritten by the decoder
    pub fn corrected_count(&self) -> usize {
        match self {
            DecodeOutcome::Corrected { positions } => positions.len(),
            _ => 0,
        }
    }

    pub fn is_uncorrectable(&self) -> bool {
        matches!(self, DecodeOutcome::Uncorrectable)
    }
}

/// Reed-Solomon encoder/decoder for symbols of type `T`
///
/// Cloning is cheap: clones share one immutable table set.
#[derive(Debug)]
pub struct ReedSolomon<T: Symbol> {
    tables: Arc<FieldTables>,
    _symbol: PhantomData<fn() -> T>,
}

impl<T: Symbol> Clone for ReedSolomon<T> {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            _symbol: PhantomData,
        }
    }
}

impl<T: Symbol> ReedSolomon<T> {
    /// Validate `params` for `T` and build the field tables
    pub fn new(params: FieldParameters) -> Result<Self> {
        params.validate::<T>()?;
        let tables = FieldTables::build(params)?;

        Ok(Self {
            tables: Arc::new(tables),
            _symbol: PhantomData,
        })
    }

    /// Build a codec for different parameters, leaving `self` untouched
    pub fn with_params(&self, params: FieldParameters) -> Result<Self> {
        if params == self.params() {
            return Ok(self.clone());
        }
        Self::new(params)
    }

    pub fn params(&self) -> FieldParameters {
        self.tables.params()
    }

    pub fn tables(&self) -> &Arc<FieldTables> {
        &self.tables
    }

    /// Symbols per codeword
    pub fn nn(&self) -> usize {
        self.tables.nn()
    }

    /// Data symbols per codeword
    pub fn kk(&self) -> usize {
        self.tables.kk()
    }

    pub fn num_roots(&self) -> usize {
        self.tables.num_roots()
    }

    /// Largest number of symbol errors guaranteed to be corrected
    pub fn correction_capacity(&self) -> usize {
        self.num_roots() / 2
    }

    /// Compute the parity of `kk` data symbols into `parity` (`num_roots` symbols)
    pub fn encode_parity(&self, data: &[T], parity: &mut [T]) -> Result<()> {
        check_len(self.kk(), data.len())?;
        check_len(self.num_roots(), parity.len())?;

        let gf = &*self.tables;
        let num_roots = gf.num_roots();
        if num_roots == 0 {
            return Ok(());
        }

        let genpoly = gf.genpoly_index();
        let mask = gf.mask();
        let mut bb: SmallVec<[u32; 32]> = smallvec![0; num_roots];

        for symbol in data {
            let feedback = gf.index_of((symbol.to_field() & mask) ^ bb[0]);

            // α^feedback · g_j, with a0 standing for a zero on either side
            let term = |coef: u32| {
                let coef = coef as usize;
                if feedback == gf.a0() || coef == gf.a0() {
                    0
                } else {
                    gf.alpha_to(gf.modnn(feedback + coef))
                }
            };

            for j in 1..num_roots {
                bb[j] ^= term(genpoly[num_roots - j]);
            }
            bb.copy_within(1.., 0);
            bb[num_roots - 1] = term(genpoly[0]);
        }

        for (out, &value) in parity.iter_mut().zip(&bb) {
            *out = T::from_field(value);
        }

        Ok(())
    }

    /// Parity for `kk` data symbols
    pub fn encode(&self, data: &[T]) -> Result<Vec<T>> {
        let mut parity = vec![T::default(); self.num_roots()];
        self.encode_parity(data, &mut parity)?;
        Ok(parity)
    }

    /// Fill the parity tail of an `nn`-symbol codeword from its `kk` data head
    pub fn encode_in_place(&self, codeword: &mut [T]) -> Result<()> {
        check_len(self.nn(), codeword.len())?;
        let (data, parity) = codeword.split_at_mut(self.kk());
        self.encode_parity(data, parity)
    }

    /// Correct an `nn`-symbol codeword in place
    pub fn decode(&self, codeword: &mut [T]) -> Result<DecodeOutcome> {
        self.decode_with_erasures(codeword, &[])
    }

    /// Correct an `nn`-symbol codeword in place, treating `erasures` as known-bad positions
    ///
    /// Up to `num_roots` erasures can be filled; combined with `e` unknown errors the
    /// correction succeeds while `2e + erasures ≤ num_roots`.
    pub fn decode_with_erasures(
        &self,
        codeword: &mut [T],
        erasures: &[usize],
    ) -> Result<DecodeOutcome> {
        let nn = self.nn();
        check_len(nn, codeword.len())?;
        self.check_erasures(erasures)?;

        if self.num_roots() == 0 {
            return Ok(DecodeOutcome::Clean);
        }

        match locate(&self.tables, codeword, erasures) {
            Located::Clean => Ok(DecodeOutcome::Clean),
            Located::Uncorrectable => Ok(DecodeOutcome::Uncorrectable),
            Located::Errors(errors) if errors.is_empty() => Ok(DecodeOutcome::Uncorrectable),
            Located::Errors(errors) => {
                let mut positions = Vec::with_capacity(errors.len());
                for (position, pattern) in errors {
                    let symbol = &mut codeword[position];
                    *symbol = T::from_field(symbol.to_field() ^ pattern);
                    positions.push(position);
                }
                positions.sort_unstable();
                Ok(DecodeOutcome::Corrected { positions })
            }
        }
    }

    fn check_erasures(&self, erasures: &[usize]) -> Result<()> {
        let nn = self.nn();
        if erasures.len() > self.num_roots() {
            return Err(CodecError::TooManyErasures {
                count: erasures.len(),
                max: self.num_roots(),
            }
            .into());
        }

        for (i, &position) in erasures.iter().enumerate() {
            if position >= nn {
                return Err(CodecError::ErasurePosition { position, nn }.into());
            }
            if erasures[..i].contains(&position) {
                return Err(CodecError::DuplicateErasure(position).into());
            }
        }

        Ok(())
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CodecError::BlockLength { expected, actual }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FecError, ParameterError};

    fn codec(params: FieldParameters) -> ReedSolomon<u8> {
        ReedSolomon::new(params).unwrap()
    }

    fn sample_data(len: usize, mask: u8) -> Vec<u8> {
        (0..len).map(|i| ((i * 37 + 11) as u8) & mask).collect()
    }

    #[test]
    fn test_codeword_has_zero_syndromes() {
        let rs = codec(FieldParameters::new(8, 0x11d, 0, 1, 32));
        let mut codeword = sample_data(255, 0xff);
        rs.encode_in_place(&mut codeword).unwrap();

        assert_eq!(rs.decode(&mut codeword.clone()).unwrap(), DecodeOutcome::Clean);
    }

    #[test]
    fn test_corrects_up_to_capacity() {
        let rs = codec(FieldParameters::CCSDS);
        let mut codeword = sample_data(255, 0xff);
        rs.encode_in_place(&mut codeword).unwrap();
        let original = codeword.clone();

        let positions: Vec<usize> = (0..16).map(|i| i * 15 + 3).collect();
        for &pos in &positions {
            codeword[pos] ^= 0x5a;
        }

        let outcome = rs.decode(&mut codeword).unwrap();
        assert_eq!(outcome, DecodeOutcome::Corrected { positions });
        assert_eq!(codeword, original);
    }

    #[test]
    fn test_erasures_double_capacity() {
        let rs = codec(FieldParameters::new(8, 0x11d, 1, 1, 32));
        let mut codeword = sample_data(255, 0xff);
        rs.encode_in_place(&mut codeword).unwrap();
        let original = codeword.clone();

        let erasures: Vec<usize> = (0..32).map(|i| i * 7).collect();
        for &pos in &erasures {
            codeword[pos] = !codeword[pos];
        }

        let outcome = rs.decode_with_erasures(&mut codeword, &erasures).unwrap();
        assert_eq!(outcome.corrected_count(), 32);
        assert_eq!(codeword, original);
    }

    #[test]
    fn test_high_bits_pass_through() {
        let rs = codec(FieldParameters::new(4, 0x13, 1, 1, 4));
        let mut codeword = sample_data(15, 0xff);
        rs.encode_in_place(&mut codeword).unwrap();
        let original = codeword.clone();

        codeword[2] ^= 0x03;
        let outcome = rs.decode(&mut codeword).unwrap();
        assert_eq!(outcome.corrected_count(), 1);
        assert_eq!(codeword, original);
    }

    #[test]
    fn test_no_roots_is_passthrough() {
        let rs = codec(FieldParameters::new(3, 0xb, 1, 1, 0));
        assert_eq!(rs.kk(), 7);
        assert!(rs.encode(&[1, 2, 3, 4, 5, 6, 7]).unwrap().is_empty());

        let mut codeword = vec![1u8, 2, 3, 4, 5, 6, 7];
        assert_eq!(rs.decode(&mut codeword).unwrap(), DecodeOutcome::Clean);
    }

    #[test]
    fn test_length_and_erasure_checks() {
        let rs = codec(FieldParameters::new(4, 0x13, 1, 1, 4));

        assert_eq!(
            rs.encode(&[0; 10]).unwrap_err(),
            FecError::Codec(CodecError::BlockLength {
                expected: 11,
                actual: 10
            })
        );

        let mut codeword = vec![0u8; 15];
        assert!(matches!(
            rs.decode_with_erasures(&mut codeword, &[15]),
            Err(FecError::Codec(CodecError::ErasurePosition { .. }))
        ));
        assert!(matches!(
            rs.decode_with_erasures(&mut codeword, &[3, 3]),
            Err(FecError::Codec(CodecError::DuplicateErasure(3)))
        ));
        assert!(matches!(
            rs.decode_with_erasures(&mut codeword, &[0, 1, 2, 3, 4]),
            Err(FecError::Codec(CodecError::TooManyErasures { count: 5, max: 4 }))
        ));
    }

    #[test]
    fn test_with_params_keeps_original() {
        let rs = codec(FieldParameters::new(8, 0x11d, 0, 1, 32));
        let smaller = rs.with_params(rs.params().with_num_roots(16)).unwrap();

        assert_eq!(rs.kk(), 223);
        assert_eq!(smaller.kk(), 239);

        let err = rs
            .with_params(rs.params().with_symbol_size(9))
            .unwrap_err();
        assert_eq!(
            err,
            FecError::Parameter(ParameterError::SymbolSizeTooLarge {
                symbol_size: 9,
                max: 8
            })
        );
    }
}
