//! Decodes Reed-Solomon codewords using the Berlekamp-Massey, Chien search and Forney
//! algorithms.
//!
//! # Decoding procedure
//!
//! 1. Evaluate the received word r(x) at each generator root to form the syndromes
//!    s<sub>i</sub> = r(α<sup>(fcr+i)·prim</sup>). All-zero syndromes mean no errors.
//! 2. Synthesize the error locator Λ(x) with Berlekamp-Massey. Known erasures seed Λ(x) with
//!    the erasure locator so the iteration starts after them.
//! 3. Find the roots of Λ(x) by Chien search over every field element. If the root count
//!    differs from deg Λ(x), the pattern exceeds the code's capability.
//! 4. Form the evaluator Ω(x) = s(x)Λ(x) mod x<sup>num_roots</sup> and compute each error
//!    magnitude Ω(X<sup>-1</sup>)·X<sup>-(fcr-1)</sup> / Λ'(X<sup>-1</sup>) (Forney).
//!
//! Everything is kept in index (log) form where possible; `a0` (= nn) stands for log(0).

use crate::reed_solomon::galois::FieldTables;
use crate::reed_solomon::symbol::Symbol;
use smallvec::{smallvec, SmallVec};

/// Scratch polynomial sized for the common 32-root codes without heap allocation
pub(crate) type Poly = SmallVec<[usize; 33]>;

/// Root index / error location pairs
pub(crate) type RootLocations = SmallVec<[(usize, usize); 16]>;

/// Outcome of locating errors in one codeword
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Located {
    /// Syndromes were all zero
    Clean,
    /// Error positions and the XOR patterns that repair them
    Errors(SmallVec<[(usize, u32); 16]>),
    /// Locator inconsistent with its roots
    Uncorrectable,
}

/// Evaluate the received word at every generator root
///
/// Returns the syndromes in index form, or `None` when they are all zero.
pub(crate) fn syndromes<T: Symbol>(gf: &FieldTables, data: &[T]) -> Option<Poly> {
    let mask = gf.mask();
    let roots = gf.roots();

    let mut s: Poly = smallvec![(data[0].to_field() & mask) as usize; roots.len()];
    for symbol in &data[1..] {
        let d = (symbol.to_field() & mask) as usize;
        for (si, &root) in s.iter_mut().zip(roots) {
            *si = if *si == 0 {
                d
            } else {
                d ^ gf.alpha_to(gf.modnn(gf.index_of(*si as u32) + root)) as usize
            };
        }
    }

    if s.iter().all(|&si| si == 0) {
        return None;
    }

    Some(s.into_iter().map(|si| gf.index_of(si as u32)).collect())
}

/// Berlekamp-Massey synthesis of the error+erasure locator Λ(x)
///
/// `syn` holds syndromes in index form. The locator is returned in polynomial form with
/// `num_roots + 1` coefficients, lowest order first.
pub(crate) struct ErrorLocator<'a> {
    gf: &'a FieldTables,
    syn: &'a [usize],
    /// Λ(x), polynomial form
    lambda: Poly,
    /// Correction polynomial B(x), index form
    b: Poly,
    erasures: usize,
}

impl<'a> ErrorLocator<'a> {
    pub fn new(gf: &'a FieldTables, syn: &'a [usize], erasures: &[usize]) -> Self {
        let num_roots = gf.num_roots();
        let nn = gf.nn() as u64;
        let prim = u64::from(gf.params().prim_element);

        let mut lambda: Poly = smallvec![0; num_roots + 1];
        lambda[0] = 1;

        // Λ(x) = ∏ (1 + X_k x) over the erased positions
        if let Some((&first, rest)) = erasures.split_first() {
            lambda[1] = gf.alpha_pow(prim * (nn - 1 - first as u64)) as usize;
            for (i, &pos) in rest.iter().enumerate() {
                let u = gf.modnn_wide(prim * (nn - 1 - pos as u64));
                for j in (1..=i + 2).rev() {
                    let tmp = gf.index_of(lambda[j - 1] as u32);
                    if tmp != gf.a0() {
                        lambda[j] ^= gf.alpha_to(gf.modnn(u + tmp)) as usize;
                    }
                }
            }
        }

        let b = lambda.iter().map(|&l| gf.index_of(l as u32)).collect();

        ErrorLocator {
            gf,
            syn,
            lambda,
            b,
            erasures: erasures.len(),
        }
    }

    /// Run the iteration over the remaining syndromes and return Λ(x)
    pub fn build(mut self) -> Poly {
        let num_roots = self.gf.num_roots();
        let mut el = self.erasures;

        for r in (self.erasures + 1)..=num_roots {
            let discr = self.discrepancy(r);

            if discr == self.gf.a0() {
                self.shift_b();
                continue;
            }

            // T(x) = Λ(x) - discr·x·B(x)
            let mut t: Poly = smallvec![0; num_roots + 1];
            t[0] = self.lambda[0];
            for i in 0..num_roots {
                t[i + 1] = if self.b[i] != self.gf.a0() {
                    self.lambda[i + 1]
                        ^ self.gf.alpha_to(self.gf.modnn(discr + self.b[i])) as usize
                } else {
                    self.lambda[i + 1]
                };
            }

            if 2 * el <= r + self.erasures - 1 {
                el = r + self.erasures - el;
                // B(x) = Λ(x) / discr
                for (bi, &li) in self.b.iter_mut().zip(&self.lambda) {
                    *bi = if li == 0 {
                        self.gf.a0()
                    } else {
                        self.gf
                            .modnn(self.gf.index_of(li as u32) + self.gf.nn() - discr)
                    };
                }
            } else {
                self.shift_b();
            }

            self.lambda = t;
        }

        self.lambda
    }

    /// Discrepancy at step r, in index form
    fn discrepancy(&self, r: usize) -> usize {
        let gf = self.gf;
        let mut discr = 0u32;

        for i in 0..r {
            let syn = self.syn[r - i - 1];
            if self.lambda[i] != 0 && syn != gf.a0() {
                discr ^= gf.alpha_to(gf.modnn(gf.index_of(self.lambda[i] as u32) + syn));
            }
        }

        gf.index_of(discr)
    }

    /// B(x) = x·B(x)
    fn shift_b(&mut self) {
        let len = self.b.len();
        self.b.copy_within(0..len - 1, 1);
        self.b[0] = self.gf.a0();
    }
}

/// Roots of Λ(x) found by Chien search
///
/// Each entry pairs the root's index `i` (Λ(α<sup>i</sup>) = 0) with the error location it
/// maps to inside the codeword.
pub(crate) fn chien_search(gf: &FieldTables, lambda: &[usize], degree: usize) -> RootLocations {
    let mut reg: Poly = lambda.iter().copied().collect();
    let mut found = RootLocations::new();
    let mut k = gf.iprim() - 1;

    for i in 1..=gf.nn() {
        // Λ_0 is always α^0
        let mut q = 1u32;
        for j in (1..=degree).rev() {
            if reg[j] != gf.a0() {
                reg[j] = gf.modnn(reg[j] + j);
                q ^= gf.alpha_to(reg[j]);
            }
        }

        if q == 0 {
            found.push((i, k));
            if found.len() == degree {
                break;
            }
        }

        k = gf.modnn(k + gf.iprim());
    }

    found
}

/// Forney error magnitudes
pub(crate) struct ErrorDescriptions<'a> {
    gf: &'a FieldTables,
    /// Λ(x), index form
    lambda: &'a [usize],
    degree: usize,
    /// Ω(x) = s(x)Λ(x) mod x^num_roots, index form
    omega: Poly,
}

impl<'a> ErrorDescriptions<'a> {
    /// `syn` and `lambda` are both in index form
    pub fn new(gf: &'a FieldTables, syn: &[usize], lambda: &'a [usize], degree: usize) -> Self {
        let mut omega: Poly = smallvec![gf.a0(); degree];

        for (i, slot) in omega.iter_mut().enumerate() {
            let mut tmp = 0u32;
            for j in (0..=i).rev() {
                if syn[i - j] != gf.a0() && lambda[j] != gf.a0() {
                    tmp ^= gf.alpha_to(gf.modnn(syn[i - j] + lambda[j]));
                }
            }
            *slot = gf.index_of(tmp);
        }

        ErrorDescriptions {
            gf,
            lambda,
            degree,
            omega,
        }
    }

    /// Error magnitude for the root with index `root`
    ///
    /// Returns `None` when Λ'(root) vanishes, which only happens for inconsistent locators.
    pub fn magnitude(&self, root: usize) -> Option<u32> {
        let gf = self.gf;
        let nn = gf.nn() as u64;
        let root_wide = root as u64;

        // Ω(X^-1)
        let mut num1 = 0u32;
        for (i, &om) in self.omega.iter().enumerate().rev() {
            if om != gf.a0() {
                num1 ^= gf.alpha_pow(om as u64 + i as u64 * root_wide);
            }
        }

        // Λ'(X^-1): odd coefficients only in characteristic 2
        let mut den = 0u32;
        let top = self.degree.min(gf.num_roots() - 1) & !1;
        for i in (0..=top).rev().step_by(2) {
            if self.lambda[i + 1] != gf.a0() {
                den ^= gf.alpha_pow(self.lambda[i + 1] as u64 + i as u64 * root_wide);
            }
        }
        if den == 0 {
            return None;
        }
        if num1 == 0 {
            return Some(0);
        }

        // X^-(fcr-1)
        let fcr = u64::from(gf.params().fcr);
        let num2 = gf.alpha_pow(root_wide * (fcr + nn - 1));

        Some(gf.div(gf.mul(num1, num2), den))
    }
}

/// Locate errors in `data` given optional known erasures
///
/// `data` must hold exactly nn symbols; erasure positions must be distinct and `< nn`.
pub(crate) fn locate<T: Symbol>(gf: &FieldTables, data: &[T], erasures: &[usize]) -> Located {
    let syn = match syndromes(gf, data) {
        Some(syn) => syn,
        None => return Located::Clean,
    };

    let lambda: Poly = ErrorLocator::new(gf, &syn, erasures)
        .build()
        .into_iter()
        .map(|l| gf.index_of(l as u32))
        .collect();

    let degree = match lambda.iter().rposition(|&l| l != gf.a0()) {
        Some(degree) if degree > 0 => degree,
        // Non-zero syndromes with a constant locator
        _ => return Located::Uncorrectable,
    };

    let roots = chien_search(gf, &lambda, degree);
    if roots.len() != degree {
        return Located::Uncorrectable;
    }

    let forney = ErrorDescriptions::new(gf, &syn, &lambda, degree);
    let mut errors = SmallVec::new();
    for &(root, location) in roots.iter().rev() {
        match forney.magnitude(root) {
            Some(0) => {}
            Some(pattern) => errors.push((location, pattern)),
            None => return Located::Uncorrectable,
        }
    }

    Located::Errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reed_solomon::galois::FieldParameters;

    fn gf() -> FieldTables {
        FieldTables::build(FieldParameters::new(4, 0x13, 1, 1, 4)).unwrap()
    }

    #[test]
    fn test_zero_word_has_no_syndromes() {
        let gf = gf();
        let word = [0u8; 15];
        assert_eq!(syndromes(&gf, &word), None);
        assert_eq!(locate(&gf, &word, &[]), Located::Clean);
    }

    #[test]
    fn test_single_error_in_zero_word() {
        let gf = gf();
        let mut word = [0u8; 15];
        word[6] = 0x9;

        match locate(&gf, &word, &[]) {
            Located::Errors(errors) => assert_eq!(errors.as_slice(), &[(6, 0x9)]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_chien_finds_locator_roots() {
        let gf = gf();
        // Λ(x) = (1 + α^3 x)(1 + α^10 x) in polynomial form
        let a3 = gf.alpha_to(3);
        let a10 = gf.alpha_to(10);
        let lambda_poly = [1, a3 ^ a10, gf.mul(a3, a10), 0, 0];
        let lambda: Poly = lambda_poly.iter().map(|&l| gf.index_of(l)).collect();

        let roots = chien_search(&gf, &lambda, 2);
        assert_eq!(roots.len(), 2);
        for (root, _) in roots {
            let x = gf.alpha_to(root);
            assert_eq!(gf.eval(&lambda_poly, x), 0);
        }
    }

    #[test]
    fn test_erasure_locator_seed() {
        let gf = gf();
        let syn: Poly = smallvec![gf.a0(); 4];
        let locator = ErrorLocator::new(&gf, &syn, &[14, 13]);

        // Positions 14 and 13 map to X = α^0 and α^1
        let a1 = gf.alpha_to(1);
        assert_eq!(locator.lambda[0], 1);
        assert_eq!(locator.lambda[1], (1 ^ a1) as usize);
        assert_eq!(locator.lambda[2], a1 as usize);
    }
}
