//! Reed-Solomon decoder stage
//!
//! Consumes `nn`-symbol codewords in append layout and produces their `kk` data symbols.
//! A codeword the code cannot correct is forwarded exactly as received: the step report and
//! stats record it, a warning is logged and, when configured, an error label marks its
//! output symbols.

use super::{CodecStats, CoderSettings, Plan, Stage, StepOutcome, StepReport};
use crate::config::StageConfig;
use crate::error::Result;
use crate::notify::ParameterEvent;
use crate::reed_solomon::{DecodeOutcome, FieldParameters, Symbol};
use crate::stream::{InputChannel, LabelPropagator, OutputChannel};
use log::{trace, warn};

/// Decodes `nn` input symbols per codeword
#[derive(Debug)]
pub struct RsDecoder<T: Symbol> {
    settings: CoderSettings<T>,
    error_label_id: Option<String>,
    stats: CodecStats,
    scratch: Vec<T>,
}

impl<T: Symbol> RsDecoder<T> {
    pub fn new(params: FieldParameters, start_id: Option<String>) -> Result<Self> {
        Ok(Self {
            settings: CoderSettings::new(params, start_id)?,
            error_label_id: None,
            stats: CodecStats::default(),
            scratch: Vec::new(),
        })
    }

    pub fn from_config(config: &StageConfig) -> Result<Self> {
        let mut decoder = Self::new(config.params, config.start_id.clone())?;
        decoder.error_label_id = config.error_label_id.clone();
        decoder
            .settings
            .set_max_codewords_per_step(config.max_codewords_per_step);
        Ok(decoder)
    }

    pub fn settings(&self) -> &CoderSettings<T> {
        &self.settings
    }

    /// Parameter setters; see [`CoderSettings`]
    pub fn settings_mut(&mut self) -> &mut CoderSettings<T> {
        &mut self.settings
    }

    pub fn error_label_id(&self) -> Option<&str> {
        self.error_label_id.as_deref()
    }

    /// Label id attached to uncorrectable codewords; `None` disables the label
    pub fn set_error_label_id(&mut self, id: Option<String>) {
        let id = id.filter(|id| !id.is_empty());
        if id == self.error_label_id {
            return;
        }
        self.error_label_id = id;
        self.settings
            .notify(&ParameterEvent::ErrorLabelId(self.error_label_id.clone()));
    }

    fn decode_one(&mut self, input: &dyn InputChannel<T>) -> Result<DecodeOutcome> {
        let codec = self.settings.codec();
        let nn = codec.nn();

        self.scratch.clear();
        self.scratch.extend_from_slice(&input.buffer()[..nn]);
        codec.decode(&mut self.scratch)
    }
}

impl<T: Symbol> Stage<T> for RsDecoder<T> {
    fn input_width(&self) -> usize {
        self.settings.codec().nn()
    }

    fn output_width(&self) -> usize {
        self.settings.codec().kk()
    }

    fn work(
        &mut self,
        input: &mut dyn InputChannel<T>,
        output: &mut dyn OutputChannel<T>,
    ) -> Result<StepOutcome> {
        let in_width = self.input_width();
        let out_width = self.output_width();

        let plan = match self.settings.plan(input, &*output, in_width, out_width) {
            Plan::Done(outcome) => {
                if let StepOutcome::Aligned { discarded } = outcome {
                    self.stats.discarded_symbols += discarded as u64;
                }
                return Ok(outcome);
            }
            Plan::Process(plan) => plan,
        };

        let propagator = LabelPropagator::new(in_width, out_width);
        if let Some(marker) = &plan.marker {
            output.attach_label(propagator.marker(marker));
        }

        let mut report = StepReport {
            codewords: plan.iterations,
            consumed: plan.iterations * in_width,
            produced: plan.iterations * out_width,
            ..StepReport::default()
        };

        for codeword in 0..plan.iterations {
            let settings = &self.settings;
            for label in propagator.forward(&plan.labels, codeword, |l| settings.is_marker(l)) {
                output.attach_label(label);
            }

            match self.decode_one(&*input)? {
                DecodeOutcome::Clean => {}
                DecodeOutcome::Corrected { positions } => {
                    trace!("Codeword {}: corrected {:?}", codeword, positions);
                    report.corrected_symbols += positions.len();
                }
                DecodeOutcome::Uncorrectable => {
                    warn!(
                        "Codeword {} of step is uncorrectable; forwarding received data",
                        codeword
                    );
                    report.uncorrectable.push(codeword);
                    if let Some(id) = &self.error_label_id {
                        output.attach_label(propagator.uncorrectable(id));
                    }
                }
            }

            output.write(&self.scratch[..out_width]);
            input.consume(in_width);
        }

        self.settings.finish_step(report.consumed);
        self.stats.record_step(&report);
        trace!(
            "Decoded {} codewords, {} symbols corrected",
            report.codewords,
            report.corrected_symbols
        );

        Ok(StepOutcome::Processed(report))
    }

    fn stats(&self) -> CodecStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reed_solomon::ReedSolomon;
    use crate::stream::{MemoryInput, MemoryOutput};

    fn params() -> FieldParameters {
        FieldParameters::new(4, 0x13, 1, 1, 4)
    }

    fn codeword(data: &[u8]) -> Vec<u8> {
        let rs = ReedSolomon::<u8>::new(params()).unwrap();
        let mut codeword = data.to_vec();
        codeword.extend(rs.encode(data).unwrap());
        codeword
    }

    #[test]
    fn test_corrects_and_strips_parity() {
        let data: Vec<u8> = (0..11).collect();
        let mut received = codeword(&data);
        received[4] ^= 0x6;
        received[13] ^= 0x1;

        let mut decoder = RsDecoder::<u8>::new(params(), None).unwrap();
        let mut input = MemoryInput::from_symbols(received);
        let mut output = MemoryOutput::new();

        match decoder.work(&mut input, &mut output).unwrap() {
            StepOutcome::Processed(report) => {
                assert_eq!(report.codewords, 1);
                assert_eq!(report.corrected_symbols, 2);
                assert!(report.uncorrectable.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(output.symbols(), data);
    }

    /// First corruption of `codeword` with three errors that the decoder detects
    fn detected_failure(codeword: &[u8]) -> Vec<u8> {
        let rs = ReedSolomon::<u8>::new(params()).unwrap();
        for a in 0..13 {
            for flip in 1..16u8 {
                let mut received = codeword.to_vec();
                received[a] ^= flip;
                received[a + 1] ^= 0x5;
                received[a + 2] ^= 0xa;

                let mut probe = received.clone();
                if rs.decode(&mut probe).unwrap().is_uncorrectable() {
                    return received;
                }
            }
        }
        panic!("no detectable triple error found");
    }

    #[test]
    fn test_uncorrectable_is_forwarded_and_labelled() {
        let data: Vec<u8> = (0..11).collect();
        let received = detected_failure(&codeword(&data));

        let mut decoder = RsDecoder::<u8>::new(params(), None).unwrap();
        decoder.set_error_label_id(Some("rs_error".to_string()));

        let mut input = MemoryInput::from_symbols(received.clone());
        let mut output = MemoryOutput::new();
        match decoder.work(&mut input, &mut output).unwrap() {
            StepOutcome::Processed(report) => assert_eq!(report.uncorrectable, vec![0]),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(output.symbols(), &received[..11]);
        let labels: Vec<_> = output.labels_with_id("rs_error").collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].index, 0);
        assert_eq!(labels[0].width, 11);
        assert_eq!(decoder.stats().uncorrectable, 1);
    }
}
