//! Label propagation across a codec stage
//!
//! Input and output codewords differ in length, so a label found at offset `o` of input
//! codeword `c` is forwarded to offset `o · out / in` of output codeword `c`, with its width
//! scaled by the same ratio.

use crate::reed_solomon::{symbols_to_bytes, Symbol};
use crate::stream::label::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPropagator {
    in_width: usize,
    out_width: usize,
}

impl LabelPropagator {
    /// Propagator for stages turning `in_width` input symbols into `out_width` output symbols
    pub fn new(in_width: usize, out_width: usize) -> Self {
        Self {
            in_width,
            out_width,
        }
    }

    /// Map an input symbol count onto the output
    pub fn scale(&self, n: usize) -> usize {
        if self.in_width == 0 {
            return 0;
        }
        (n as u128 * self.out_width as u128 / self.in_width as u128) as usize
    }

    /// Labels that fall inside input codeword `codeword`, relative to its first output symbol
    ///
    /// `labels` are relative to the input head at the start of the step. Labels rejected by
    /// `skip` (the start marker) are not forwarded.
    pub fn forward<'a>(
        &'a self,
        labels: &'a [Label],
        codeword: usize,
        skip: impl Fn(&Label) -> bool + 'a,
    ) -> impl Iterator<Item = Label> + 'a {
        let start = codeword * self.in_width;
        let end = start + self.in_width;

        labels
            .iter()
            .filter(move |l| l.index >= start && l.index < end && !skip(*l))
            .map(move |l| Label {
                index: self.scale(l.index - start),
                width: self.scale(l.width),
                ..l.clone()
            })
    }

    /// Start marker re-emitted at the first produced symbol
    pub fn marker(&self, marker: &Label) -> Label {
        Label {
            index: 0,
            width: self.scale(marker.width),
            ..marker.clone()
        }
    }

    /// Parity carried out of band for one codeword
    pub fn parity<T: Symbol>(&self, id: &str, parity: &[T]) -> Label {
        Label::new(id, 0)
            .with_width(self.out_width)
            .with_payload(symbols_to_bytes(parity))
    }

    /// Flag on a codeword the decoder could not correct
    pub fn uncorrectable(&self, id: &str) -> Label {
        Label::new(id, 0).with_width(self.out_width)
    }
}
