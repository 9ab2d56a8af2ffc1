//! Progress and result reporting for the command-line tools
//!
//! Stages only log. Human-facing output goes through a reporter so the binaries can switch
//! between console output and quiet operation.

mod console;
mod silent;

pub use console::ConsoleReporter;
pub use silent::SilentReporter;

use crate::coder::RunSummary;
use crate::reed_solomon::FieldParameters;

/// Reporting hooks for an encode or decode run
pub trait CodecReporter: Send + Sync {
    /// Describe the code in use
    fn report_code(&self, params: &FieldParameters);

    /// Report a run finishing; `operation` is "Encoded" or "Decoded"
    fn report_summary(&self, operation: &str, summary: &RunSummary);

    /// Report codewords the decoder could not correct
    fn report_uncorrectable(&self, codewords: &[usize]);

    /// Report an error that stopped the run
    fn report_error(&self, error: &str);
}
