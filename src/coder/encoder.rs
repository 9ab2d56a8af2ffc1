//! Reed-Solomon encoder stage

use super::{CodecStats, CoderSettings, Plan, Stage, StepOutcome, StepReport};
use crate::config::{StageConfig, DEFAULT_PARITY_LABEL_ID};
use crate::error::Result;
use crate::notify::ParameterEvent;
use crate::reed_solomon::{FieldParameters, Symbol};
use crate::stream::{InputChannel, LabelPropagator, OutputChannel};
use log::trace;

/// Where the encoder puts parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityMode {
    /// `[data…, parity…]`, `nn` symbols per codeword
    Append,
    /// Data forwarded untouched, parity carried in a label on each codeword
    SideChannel,
}

/// Encodes `kk` input symbols per codeword
#[derive(Debug)]
pub struct RsEncoder<T: Symbol> {
    settings: CoderSettings<T>,
    mode: ParityMode,
    parity_label_id: String,
    stats: CodecStats,
    scratch: Vec<T>,
}

impl<T: Symbol> RsEncoder<T> {
    /// Append-mode encoder
    pub fn new(params: FieldParameters, start_id: Option<String>) -> Result<Self> {
        Ok(Self {
            settings: CoderSettings::new(params, start_id)?,
            mode: ParityMode::Append,
            parity_label_id: DEFAULT_PARITY_LABEL_ID.to_string(),
            stats: CodecStats::default(),
            scratch: Vec::new(),
        })
    }

    /// Side-channel encoder emitting parity labels with `parity_label_id`
    pub fn side_channel(
        params: FieldParameters,
        start_id: Option<String>,
        parity_label_id: impl Into<String>,
    ) -> Result<Self> {
        let mut encoder = Self::new(params, start_id)?;
        encoder.mode = ParityMode::SideChannel;
        encoder.parity_label_id = parity_label_id.into();
        Ok(encoder)
    }

    pub fn from_config(config: &StageConfig, mode: ParityMode) -> Result<Self> {
        let mut encoder = Self::new(config.params, config.start_id.clone())?;
        encoder.mode = mode;
        encoder.parity_label_id = config.parity_label_id.clone();
        encoder
            .settings
            .set_max_codewords_per_step(config.max_codewords_per_step);
        Ok(encoder)
    }

    pub fn settings(&self) -> &CoderSettings<T> {
        &self.settings
    }

    /// Parameter setters; see [`CoderSettings`]
    pub fn settings_mut(&mut self) -> &mut CoderSettings<T> {
        &mut self.settings
    }

    pub fn mode(&self) -> ParityMode {
        self.mode
    }

    pub fn parity_label_id(&self) -> &str {
        &self.parity_label_id
    }

    pub fn set_parity_label_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if id == self.parity_label_id {
            return;
        }
        self.parity_label_id = id;
        self.settings
            .notify(&ParameterEvent::ParityLabelId(self.parity_label_id.clone()));
    }

    fn encode_append(
        &mut self,
        input: &mut dyn InputChannel<T>,
        output: &mut dyn OutputChannel<T>,
    ) -> Result<()> {
        let codec = self.settings.codec();
        let kk = codec.kk();

        self.scratch.resize(codec.nn(), T::default());
        self.scratch[..kk].copy_from_slice(&input.buffer()[..kk]);
        codec.encode_in_place(&mut self.scratch)?;

        output.write(&self.scratch);
        input.consume(kk);
        Ok(())
    }

    fn encode_side_channel(
        &mut self,
        input: &mut dyn InputChannel<T>,
        output: &mut dyn OutputChannel<T>,
        propagator: &LabelPropagator,
    ) -> Result<()> {
        let codec = self.settings.codec();
        let data = input.take(codec.kk());
        let parity = codec.encode(&data)?;

        output.attach_label(propagator.parity(&self.parity_label_id, &parity));
        output.post_buffer(data);
        Ok(())
    }
}

impl<T: Symbol> Stage<T> for RsEncoder<T> {
    fn input_width(&self) -> usize {
        self.settings.codec().kk()
    }

    fn output_width(&self) -> usize {
        match self.mode {
            ParityMode::Append => self.settings.codec().nn(),
            ParityMode::SideChannel => self.settings.codec().kk(),
        }
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

        for codeword in 0..plan.iterations {
            let settings = &self.settings;
            for label in propagator.forward(&plan.labels, codeword, |l| settings.is_marker(l)) {
                output.attach_label(label);
            }

            match self.mode {
                ParityMode::Append => self.encode_append(input, output)?,
                ParityMode::SideChannel => self.encode_side_channel(input, output, &propagator)?,
            }
        }

        let report = StepReport {
            codewords: plan.iterations,
            consumed: plan.iterations * in_width,
            produced: plan.iterations * out_width,
            ..StepReport::default()
        };
        self.settings.finish_step(report.consumed);
        self.stats.record_step(&report);
        trace!("Encoded {} codewords", report.codewords);

        Ok(StepOutcome::Processed(report))
    }

    fn stats(&self) -> CodecStats {
        self.stats
    }
}
