//! Silent reporter
//!
//! No-output implementation for tests or when quiet operation is desired.

use super::CodecReporter;
use crate::coder::RunSummary;
use crate::reed_solomon::FieldParameters;

#[derive(Debug, Default)]
pub struct SilentReporter;

impl SilentReporter {
    pub fn new() -> Self {
        Self
    }
}

impl CodecReporter for SilentReporter {
    fn report_code(&self, _params: &FieldParameters) {}
    fn report_summary(&self, _operation: &str, _summary: &RunSummary) {}
    fn report_uncorrectable(&self, _codewords: &[usize]) {}
    fn report_error(&self, _error: &str) {}
}
