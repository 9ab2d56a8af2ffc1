//! Console reporter

use super::CodecReporter;
use crate::coder::RunSummary;
use crate::reed_solomon::FieldParameters;

/// Show every uncorrectable codeword up to this many
const MAX_LISTED_CODEWORDS: usize = 20;
/// First/last codewords shown for longer lists
const CODEWORD_SUMMARY_HEAD_TAIL: usize = 10;

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl CodecReporter for ConsoleReporter {
    fn report_code(&self, params: &FieldParameters) {
        println!(
            "({}, {}) Reed-Solomon code over GF(2^{}): poly {:#x}, fcr {}, prim {}, {} roots",
            params.nn(),
            params.kk(),
            params.symbol_size,
            params.field_poly,
            params.fcr,
            params.prim_element,
            params.num_roots
        );
    }

    fn report_summary(&self, operation: &str, summary: &RunSummary) {
        println!(
            "{} {} codewords ({} symbols in, {} symbols out)",
            operation, summary.codewords, summary.consumed, summary.produced
        );
        if summary.corrected_symbols > 0 {
            println!("  Corrected symbols: {}", summary.corrected_symbols);
        }
        if summary.discarded > 0 {
            println!("  Discarded symbols: {}", summary.discarded);
        }
    }

    fn report_uncorrectable(&self, codewords: &[usize]) {
        if codewords.is_empty() {
            return;
        }
        println!("  {} codewords are uncorrectable", codewords.len());
        print_codeword_list(codewords);
    }

    fn report_error(&self, error: &str) {
        eprintln!("Error: {}", error);
    }
}

/// Print codeword numbers, eliding the middle of long lists
fn print_codeword_list(codewords: &[usize]) {
    if codewords.len() <= MAX_LISTED_CODEWORDS {
        for &codeword in codewords {
            println!("  Codeword {}: uncorrectable", codeword);
        }
        return;
    }

    for &codeword in &codewords[..CODEWORD_SUMMARY_HEAD_TAIL] {
        println!("  Codeword {}: uncorrectable", codeword);
    }
    println!(
        "  ... {} more uncorrectable codewords ...",
        codewords.len() - 2 * CODEWORD_SUMMARY_HEAD_TAIL
    );
    for &codeword in &codewords[codewords.len() - CODEWORD_SUMMARY_HEAD_TAIL..] {
        println!("  Codeword {}: uncorrectable", codeword);
    }
}
