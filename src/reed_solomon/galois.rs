//! Galois Field GF(2^m) tables for Reed-Solomon codes
//!
//! ## Field construction
//!
//! A code is described by five integers:
//!
//! - **symbol size** `m`: bits per symbol, giving `nn = 2^m - 1` symbols per codeword
//! - **field polynomial**: primitive polynomial generating GF(2^m), e.g. 0x11D
//!   (x⁸ + x⁴ + x³ + x² + 1)
//! - **fcr**: first consecutive root of the generator polynomial, in index form
//! - **primitive element**: step between consecutive roots, in index form
//! - **number of roots**: parity symbols per codeword
//!
//! The generator polynomial is g(x) = ∏ (x - α^((fcr + i)·prim)) for i in [0, num_roots).
//!
//! ## Table layout
//!
//! Both tables have `nn + 1` entries. `index_of[0]` and `alpha_to[nn]` use `nn` as the
//! stand-in for log(0) = -∞, so index-form arithmetic must test for it before adding.

use crate::error::{FieldInitError, ParameterError};
use crate::reed_solomon::symbol::Symbol;
use log::debug;

/// Field and code parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldParameters {
    pub symbol_size: u32,
    pub field_poly: u32,
    pub fcr: u32,
    pub prim_element: u32,
    pub num_roots: u32,
}

impl FieldParameters {
    /// CCSDS (255,223) code: 0x187, fcr 112, prim 11, 32 roots
    pub const CCSDS: FieldParameters = FieldParameters::new(8, 0x187, 112, 11, 32);

    pub const fn new(
        symbol_size: u32,
        field_poly: u32,
        fcr: u32,
        prim_element: u32,
        num_roots: u32,
    ) -> Self {
        Self {
            symbol_size,
            field_poly,
            fcr,
            prim_element,
            num_roots,
        }
    }

    pub fn with_symbol_size(self, symbol_size: u32) -> Self {
        Self {
            symbol_size,
            ..self
        }
    }

    pub fn with_field_poly(self, field_poly: u32) -> Self {
        Self { field_poly, ..self }
    }

    pub fn with_fcr(self, fcr: u32) -> Self {
        Self { fcr, ..self }
    }

    pub fn with_prim_element(self, prim_element: u32) -> Self {
        Self {
            prim_element,
            ..self
        }
    }

    pub fn with_num_roots(self, num_roots: u32) -> Self {
        Self { num_roots, ..self }
    }

    /// Check the parameters against the limits of symbol type `T`
    pub fn validate<T: Symbol>(&self) -> Result<(), ParameterError> {
        if self.symbol_size > T::MAX_SYMBOL_SIZE {
            return Err(ParameterError::SymbolSizeTooLarge {
                symbol_size: self.symbol_size,
                max: T::MAX_SYMBOL_SIZE,
            });
        }

        let limit = 1u64 << self.symbol_size;

        if u64::from(self.fcr) >= limit {
            return Err(ParameterError::FcrOutOfRange {
                fcr: self.fcr,
                limit,
            });
        }
        if self.prim_element == 0 || u64::from(self.prim_element) >= limit {
            return Err(ParameterError::PrimElementOutOfRange {
                prim: self.prim_element,
                limit,
            });
        }
        if u64::from(self.num_roots) >= limit {
            return Err(ParameterError::NumRootsOutOfRange {
                num_roots: self.num_roots,
                limit,
            });
        }
        if u64::from(self.num_roots) >= limit - 1 {
            return Err(ParameterError::NoDataSymbols {
                num_roots: self.num_roots,
                nn: limit - 1,
            });
        }

        Ok(())
    }

    /// Symbols per codeword: 2^symbol_size - 1
    pub fn nn(&self) -> usize {
        (1usize << self.symbol_size) - 1
    }

    /// Data symbols per codeword
    pub fn kk(&self) -> usize {
        self.nn() - self.num_roots as usize
    }
}

/// Log/antilog tables and generator polynomial for one parameter set
///
/// Immutable once built; parameter changes produce a new table set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTables {
    params: FieldParameters,
    nn: usize,
    /// α^i for i in [0, nn); alpha_to[nn] = 0
    alpha_to: Vec<u32>,
    /// log_α(x) for x in [1, nn]; index_of[0] = nn
    index_of: Vec<u32>,
    /// Generator polynomial coefficients in index form, lowest order first
    genpoly: Vec<u32>,
    /// Index of each generator root: (fcr + i)·prim mod nn
    roots: Vec<usize>,
    /// prim-th root of unity, used by the Chien search
    iprim: usize,
}

impl FieldTables {
    /// Build the tables for `params`
    ///
    /// Parameters must already satisfy [`FieldParameters::validate`].
    pub fn build(params: FieldParameters) -> Result<Self, FieldInitError> {
        let nn = params.nn();
        let count = nn + 1;

        let mut tables = FieldTables {
            params,
            nn,
            alpha_to: vec![0; count],
            index_of: vec![0; count],
            genpoly: Vec::with_capacity(params.num_roots as usize + 1),
            roots: Vec::with_capacity(params.num_roots as usize),
            iprim: 0,
        };

        tables.build_tables()?;
        tables.iprim = find_iprim(params.prim_element, nn)?;
        tables.build_generator();

        debug!(
            "Built GF(2^{}) tables for ({}, {}) code: poly {:#x}, fcr {}, prim {}",
            params.symbol_size,
            nn,
            params.kk(),
            params.field_poly,
            params.fcr,
            params.prim_element
        );

        Ok(tables)
    }

    fn build_tables(&mut self) -> Result<(), FieldInitError> {
        let count = (self.nn + 1) as u32;
        let mut b = 1u32;

        self.index_of[0] = self.nn as u32;
        self.alpha_to[self.nn] = 0;

        for l in 0..self.nn {
            // A primitive polynomial only cycles back to α^0 after exactly nn steps.
            if l > 0 && b == 1 {
                return Err(self.not_primitive());
            }

            self.index_of[b as usize] = l as u32;
            self.alpha_to[l] = b;

            b <<= 1;
            if b & count != 0 {
                b ^= self.params.field_poly;
            }
            b &= self.nn as u32;
        }

        if b != 1 {
            return Err(self.not_primitive());
        }

        Ok(())
    }

    fn not_primitive(&self) -> FieldInitError {
        FieldInitError::NotPrimitive {
            poly: self.params.field_poly,
            symbol_size: self.params.symbol_size,
        }
    }

    fn build_generator(&mut self) {
        let num_roots = self.params.num_roots as usize;
        let prim = self.params.prim_element as u64;

        // Build in polynomial form, then convert to index form for encoding.
        let mut genpoly = vec![0u32; num_roots + 1];
        genpoly[0] = 1;

        let mut root = self.modnn_wide(u64::from(self.params.fcr) * prim);
        for i in 0..num_roots {
            self.roots.push(root);
            genpoly[i + 1] = 1;

            // Multiply by (x + α^root)
            for j in (1..=i).rev() {
                genpoly[j] = if genpoly[j] != 0 {
                    genpoly[j - 1]
                        ^ self.alpha_to(self.modnn(self.index_of(genpoly[j]) + root))
                } else {
                    genpoly[j - 1]
                };
            }
            genpoly[0] = self.alpha_to(self.modnn(self.index_of(genpoly[0]) + root));

            root = self.modnn_wide(root as u64 + prim);
        }

        self.genpoly = genpoly
            .into_iter()
            .map(|coef| self.index_of[coef as usize])
            .collect();
    }

    pub fn params(&self) -> FieldParameters {
        self.params
    }

    pub fn nn(&self) -> usize {
        self.nn
    }

    pub fn kk(&self) -> usize {
        self.nn - self.num_roots()
    }

    pub fn num_roots(&self) -> usize {
        self.params.num_roots as usize
    }

    /// Index-form marker for zero: log(0)
    #[inline]
    pub fn a0(&self) -> usize {
        self.nn
    }

    /// Mask selecting the field bits of a stored symbol
    #[inline]
    pub fn mask(&self) -> u32 {
        self.nn as u32
    }

    #[inline]
    pub fn alpha_to(&self, index: usize) -> u32 {
        self.alpha_to[index]
    }

    #[inline]
    pub fn index_of(&self, value: u32) -> usize {
        self.index_of[value as usize] as usize
    }

    /// Reduce an index-form sum modulo nn
    #[inline]
    pub fn modnn(&self, x: usize) -> usize {
        x % self.nn
    }

    /// Reduce a wide index-form product modulo nn
    #[inline]
    pub fn modnn_wide(&self, x: u64) -> usize {
        (x % self.nn as u64) as usize
    }

    pub fn iprim(&self) -> usize {
        self.iprim
    }

    /// Root indices (fcr + i)·prim mod nn
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Generator polynomial in index form, lowest order first
    pub fn genpoly_index(&self) -> &[u32] {
        &self.genpoly
    }

    /// Generator polynomial coefficients as field values, lowest order first
    pub fn generator_poly(&self) -> Vec<u32> {
        self.genpoly
            .iter()
            .map(|&idx| self.alpha_to[idx as usize])
            .collect()
    }

    /// α^power for any non-negative power
    pub fn alpha_pow(&self, power: u64) -> u32 {
        self.alpha_to(self.modnn_wide(power))
    }

    /// Field multiplication
    pub fn mul(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.alpha_to(self.modnn(self.index_of(a) + self.index_of(b)))
    }

    /// Field division
    ///
    /// # Panics
    /// Panics when `b` is zero.
    pub fn div(&self, a: u32, b: u32) -> u32 {
        if b == 0 {
            panic!("Division by zero in Galois field");
        }
        if a == 0 {
            return 0;
        }
        self.alpha_to(self.modnn(self.index_of(a) + self.nn - self.index_of(b)))
    }

    /// Evaluate a polynomial (field values, lowest order first) at `x`
    pub fn eval(&self, poly: &[u32], x: u32) -> u32 {
        poly.iter()
            .rev()
            .fold(0, |acc, &coef| self.mul(acc, x) ^ coef)
    }
}

/// Find the prim-th root of unity: iprim·prim ≡ 1 (mod nn)
fn find_iprim(prim: u32, nn: usize) -> Result<usize, FieldInitError> {
    let prim_wide = u64::from(prim);
    let mut iprim = 1u64;

    // A solution exists within `prim` steps iff gcd(prim, nn) == 1.
    for _ in 0..prim {
        if iprim % prim_wide == 0 {
            return Ok((iprim / prim_wide) as usize);
        }
        iprim += nn as u64;
    }

    Err(FieldInitError::NoPrimitiveRoot { prim, nn })
}
