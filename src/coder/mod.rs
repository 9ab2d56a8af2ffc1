//! Streaming encoder and decoder stages
//!
//! A stage is driven by repeated calls to [`Stage::work`]. Each call looks at what its input
//! channel currently holds, lets the frame synchronizer decide whether to wait, skip junk or
//! process, and then runs as many whole codewords as the input, the output capacity and the
//! per-step bound allow.

mod decoder;
mod encoder;

pub use decoder::RsDecoder;
pub use encoder::{ParityMode, RsEncoder};

use crate::error::Result;
use crate::notify::{ParameterEvent, ParameterListener};
use crate::reed_solomon::{FieldParameters, ReedSolomon, Symbol};
use crate::stream::{Alignment, FrameSynchronizer, InputChannel, Label, OutputChannel};
use log::{debug, trace};
use std::fmt;
use std::num::NonZeroUsize;

/// Result of one [`Stage::work`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No marker yet, or not enough input or output space for a codeword
    Stalled,
    /// Symbols outside any codeword were dropped
    Aligned { discarded: usize },
    /// At least one codeword went through the codec
    Processed(StepReport),
}

impl StepOutcome {
    pub fn made_progress(&self) -> bool {
        !matches!(self, StepOutcome::Stalled)
    }
}

/// Per-step accounting for processed codewords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub codewords: usize,
    pub consumed: usize,
    pub produced: usize,
    /// Symbols rewritten by the decoder
    pub corrected_symbols: usize,
    /// Ordinals within this step of codewords that could not be corrected
    pub uncorrectable: Vec<usize>,
}

/// Cumulative counters over the lifetime of a stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecStats {
    pub codewords: u64,
    pub corrected_symbols: u64,
    pub uncorrectable: u64,
    pub discarded_symbols: u64,
}

impl CodecStats {
    pub(crate) fn record_step(&mut self, report: &StepReport) {
        self.codewords += report.codewords as u64;
        self.corrected_symbols += report.corrected_symbols as u64;
        self.uncorrectable += report.uncorrectable.len() as u64;
    }
}

impl fmt::Display for CodecStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} codewords, {} symbols corrected, {} uncorrectable, {} symbols discarded",
            self.codewords, self.corrected_symbols, self.uncorrectable, self.discarded_symbols
        )
    }
}

/// A codec stage driven by an external scheduler
pub trait Stage<T: Symbol> {
    /// Input symbols consumed per codeword
    fn input_width(&self) -> usize;

    /// Output symbols produced per codeword
    fn output_width(&self) -> usize;

    /// Process what the channels currently allow; never blocks
    fn work(
        &mut self,
        input: &mut dyn InputChannel<T>,
        output: &mut dyn OutputChannel<T>,
    ) -> Result<StepOutcome>;

    fn stats(&self) -> CodecStats;
}

/// Totals over a [`run_stage`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub codewords: usize,
    pub consumed: usize,
    pub produced: usize,
    pub corrected_symbols: usize,
    pub discarded: usize,
    /// Ordinals within this run of codewords that could not be corrected
    pub uncorrectable: Vec<usize>,
}

/// Step `stage` until it stops making progress
pub fn run_stage<T, S, I, O>(stage: &mut S, input: &mut I, output: &mut O) -> Result<RunSummary>
where
    T: Symbol,
    S: Stage<T> + ?Sized,
    I: InputChannel<T>,
    O: OutputChannel<T>,
{
    let mut summary = RunSummary::default();

    loop {
        match stage.work(input, output)? {
            StepOutcome::Stalled => break,
            StepOutcome::Aligned { discarded } => summary.discarded += discarded,
            StepOutcome::Processed(report) => {
                summary.uncorrectable.extend(
                    report
                        .uncorrectable
                        .iter()
                        .map(|ordinal| summary.codewords + ordinal),
                );
                summary.codewords += report.codewords;
                summary.consumed += report.consumed;
                summary.produced += report.produced;
                summary.corrected_symbols += report.corrected_symbols;
            }
        }
        summary.steps += 1;
    }

    debug!(
        "Stage idle after {} steps: {} codewords, {} symbols discarded",
        summary.steps, summary.codewords, summary.discarded
    );

    Ok(summary)
}

/// Work item handed to a stage once the synchronizer allows processing
pub(crate) struct StepPlan {
    pub iterations: usize,
    /// Input labels relative to the head at the start of the step
    pub labels: Vec<Label>,
    pub marker: Option<Label>,
}

/// Planning result: either a finished outcome or codewords to process
pub(crate) enum Plan {
    Done(StepOutcome),
    Process(StepPlan),
}

/// Code parameters, synchronization and notification shared by both stages
pub struct CoderSettings<T: Symbol> {
    codec: ReedSolomon<T>,
    sync: FrameSynchronizer,
    max_codewords: Option<NonZeroUsize>,
    listener: Option<Box<dyn ParameterListener>>,
}

impl<T: Symbol> fmt::Debug for CoderSettings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoderSettings")
            .field("params", &self.codec.params())
            .field("sync", &self.sync)
            .field("max_codewords", &self.max_codewords)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<T: Symbol> CoderSettings<T> {
    pub fn new(params: FieldParameters, start_id: Option<String>) -> Result<Self> {
        Ok(Self {
            codec: ReedSolomon::new(params)?,
            sync: FrameSynchronizer::new(start_id),
            max_codewords: None,
            listener: None,
        })
    }

    /// Codec for the current parameters
    ///
    /// The handle keeps its tables even if the parameters change afterwards.
    pub fn codec(&self) -> &ReedSolomon<T> {
        &self.codec
    }

    pub fn params(&self) -> FieldParameters {
        self.codec.params()
    }

    pub fn symbol_size(&self) -> u32 {
        self.params().symbol_size
    }

    pub fn field_poly(&self) -> u32 {
        self.params().field_poly
    }

    pub fn fcr(&self) -> u32 {
        self.params().fcr
    }

    pub fn prim_element(&self) -> u32 {
        self.params().prim_element
    }

    pub fn num_roots(&self) -> u32 {
        self.params().num_roots
    }

    pub fn start_id(&self) -> Option<&str> {
        self.sync.start_id()
    }

    pub fn max_codewords_per_step(&self) -> Option<NonZeroUsize> {
        self.max_codewords
    }

    pub fn is_synchronized(&self) -> bool {
        self.sync.is_synchronized()
    }

    pub fn set_symbol_size(&mut self, symbol_size: u32) -> Result<()> {
        self.update_params(
            self.params().with_symbol_size(symbol_size),
            ParameterEvent::SymbolSize(symbol_size),
        )
    }

    pub fn set_field_poly(&mut self, field_poly: u32) -> Result<()> {
        self.update_params(
            self.params().with_field_poly(field_poly),
            ParameterEvent::FieldPoly(field_poly),
        )
    }

    pub fn set_fcr(&mut self, fcr: u32) -> Result<()> {
        self.update_params(self.params().with_fcr(fcr), ParameterEvent::Fcr(fcr))
    }

    pub fn set_prim_element(&mut self, prim_element: u32) -> Result<()> {
        self.update_params(
            self.params().with_prim_element(prim_element),
            ParameterEvent::PrimElement(prim_element),
        )
    }

    pub fn set_num_roots(&mut self, num_roots: u32) -> Result<()> {
        self.update_params(
            self.params().with_num_roots(num_roots),
            ParameterEvent::NumRoots(num_roots),
        )
    }

    /// Replace all five parameters at once
    ///
    /// Useful when moving between codes whose intermediate combinations are invalid (for
    /// example a smaller symbol size with a large root count). One event is sent per
    /// parameter that changed.
    pub fn set_params(&mut self, params: FieldParameters) -> Result<()> {
        let old = self.params();
        self.swap_codec(params)?;

        let events = [
            (old.symbol_size != params.symbol_size)
                .then_some(ParameterEvent::SymbolSize(params.symbol_size)),
            (old.field_poly != params.field_poly)
                .then_some(ParameterEvent::FieldPoly(params.field_poly)),
            (old.fcr != params.fcr).then_some(ParameterEvent::Fcr(params.fcr)),
            (old.prim_element != params.prim_element)
                .then_some(ParameterEvent::PrimElement(params.prim_element)),
            (old.num_roots != params.num_roots)
                .then_some(ParameterEvent::NumRoots(params.num_roots)),
        ];
        for event in events.into_iter().flatten() {
            self.notify(&event);
        }

        Ok(())
    }

    pub fn set_start_id(&mut self, start_id: Option<String>) {
        let start_id = start_id.filter(|id| !id.is_empty());
        if start_id.as_deref() == self.sync.start_id() {
            return;
        }
        self.sync.set_start_id(start_id);
        debug!("Start id set to {:?}", self.sync.start_id());
        self.notify(&ParameterEvent::StartId(
            self.sync.start_id().map(str::to_string),
        ));
    }

    pub fn set_max_codewords_per_step(&mut self, max: Option<NonZeroUsize>) {
        if max == self.max_codewords {
            return;
        }
        self.max_codewords = max;
        self.notify(&ParameterEvent::MaxCodewordsPerStep(max));
    }

    /// Install the listener for parameter changes, replacing any previous one
    pub fn set_listener(&mut self, listener: impl ParameterListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub(crate) fn notify(&self, event: &ParameterEvent) {
        if let Some(listener) = &self.listener {
            listener.parameter_changed(event);
        }
    }

    fn update_params(&mut self, params: FieldParameters, event: ParameterEvent) -> Result<()> {
        if params == self.params() {
            return Ok(());
        }
        self.swap_codec(params)?;
        self.notify(&event);
        Ok(())
    }

    /// Build the new table set first so a failure leaves the stage untouched
    fn swap_codec(&mut self, params: FieldParameters) -> Result<()> {
        let codec = self.codec.with_params(params)?;
        if codec.nn() != self.codec.nn() || codec.kk() != self.codec.kk() {
            // Codeword geometry changed under the current frame
            self.sync.reset();
        }
        self.codec = codec;

        debug!(
            "Reconfigured ({}, {}) code: symbol size {}, poly {:#x}, fcr {}, prim {}",
            self.codec.nn(),
            self.codec.kk(),
            params.symbol_size,
            params.field_poly,
            params.fcr,
            params.prim_element
        );
        Ok(())
    }

    /// Consult the synchronizer and the channel sizes for the next step
    pub(crate) fn plan(
        &mut self,
        input: &mut dyn InputChannel<T>,
        output: &dyn OutputChannel<T>,
        in_width: usize,
        out_width: usize,
    ) -> Plan {
        let labels = input.peek_labels();

        match self.sync.align(&labels, input.available(), in_width) {
            Alignment::Stalled => Plan::Done(StepOutcome::Stalled),
            Alignment::Discard(discarded) => {
                input.consume(discarded);
                input.set_reserve(in_width);
                Plan::Done(StepOutcome::Aligned { discarded })
            }
            Alignment::Ready { limit, marker } => {
                let mut iterations = input.available() / in_width;
                if out_width > 0 {
                    iterations = iterations.min(output.capacity() / out_width);
                }
                if let Some(limit) = limit {
                    iterations = iterations.min(limit / in_width);
                }
                if let Some(max) = self.max_codewords {
                    iterations = iterations.min(max.get());
                }

                if iterations == 0 {
                    input.set_reserve(in_width);
                    trace!(
                        "Waiting for a codeword: {} symbols in, {} free out",
                        input.available(),
                        output.capacity()
                    );
                    return Plan::Done(StepOutcome::Stalled);
                }

                Plan::Process(StepPlan {
                    iterations,
                    labels,
                    marker,
                })
            }
        }
    }

    pub(crate) fn is_marker(&self, label: &Label) -> bool {
        self.sync.is_marker(label)
    }

    /// Record the input consumed by a processing step
    pub(crate) fn finish_step(&mut self, consumed: usize) {
        self.sync.advance(consumed, true);
    }
}
