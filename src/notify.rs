//! Parameter change notification
//!
//! Stages report every successful configuration change to an optional host listener. Plain
//! closures and `mpsc` senders both work as listeners.

use std::num::NonZeroUsize;
use std::sync::mpsc::Sender;

/// A configuration value that changed, with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterEvent {
    SymbolSize(u32),
    FieldPoly(u32),
    Fcr(u32),
    PrimElement(u32),
    NumRoots(u32),
    StartId(Option<String>),
    ParityLabelId(String),
    ErrorLabelId(Option<String>),
    MaxCodewordsPerStep(Option<NonZeroUsize>),
}

impl ParameterEvent {
    /// Name of the changed parameter
    pub fn name(&self) -> &'static str {
        match self {
            ParameterEvent::SymbolSize(_) => "symbol_size",
            ParameterEvent::FieldPoly(_) => "field_poly",
            ParameterEvent::Fcr(_) => "fcr",
            ParameterEvent::PrimElement(_) => "prim_element",
            ParameterEvent::NumRoots(_) => "num_roots",
            ParameterEvent::StartId(_) => "start_id",
            ParameterEvent::ParityLabelId(_) => "parity_label_id",
            ParameterEvent::ErrorLabelId(_) => "error_label_id",
            ParameterEvent::MaxCodewordsPerStep(_) => "max_codewords_per_step",
        }
    }
}

/// Host-side receiver of parameter changes
pub trait ParameterListener: Send {
    fn parameter_changed(&self, event: &ParameterEvent);
}

impl<F> ParameterListener for F
where
    F: Fn(&ParameterEvent) + Send,
{
    fn parameter_changed(&self, event: &ParameterEvent) {
        self(event)
    }
}

impl ParameterListener for Sender<ParameterEvent> {
    fn parameter_changed(&self, event: &ParameterEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.send(event.clone());
    }
}
