//! Position-anchored stream annotations

/// Out-of-band annotation on a symbol stream
///
/// `index` is relative to the read head of an input channel or the write head of an output
/// channel at the moment the label is observed or attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub id: String,
    pub payload: Option<Vec<u8>>,
    pub index: usize,
    /// Number of symbols covered, starting at `index`
    pub width: usize,
}

impl Label {
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            payload: None,
            index,
            width: 0,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Copy of this label moved to `index`
    pub fn at(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id == id
    }
}
