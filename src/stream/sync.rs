//! Frame synchronization
//!
//! A stream may start with junk and may carry several frames. The start marker (a label with
//! the configured start id) points at the first symbol of a frame. The synchronizer decides,
//! per step, whether the stage must wait, discard leading symbols or process whole codewords.
//!
//! ```text
//!  Unsynchronized ──marker at p > 0──▶ discard p ──▶ Synchronized
//!        ▲                                              │
//!        └──────────── frame width exhausted ───────────┘
//! ```
//!
//! A marker with a non-zero width bounds its frame: once that many input symbols have been
//! consumed the synchronizer waits for the next marker. A second marker seen while
//! synchronized re-anchors the stream at its position. Without a start id the whole stream is
//! one open frame starting at position 0.

use crate::stream::label::Label;
use log::{debug, warn};

/// What the stage should do this step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    /// Nothing to do until more input or a marker arrives
    Stalled,
    /// Consume and drop this many symbols without producing output
    Discard(usize),
    /// Process whole codewords
    Ready {
        /// Input symbols that may be consumed before the next frame boundary
        limit: Option<usize>,
        /// Marker to re-emit at the first produced symbol
        marker: Option<Label>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    marker: Label,
    consumed: usize,
    announced: bool,
}

impl Frame {
    fn new(marker: Label) -> Self {
        Self {
            marker,
            consumed: 0,
            announced: false,
        }
    }

    /// Input symbols left in a bounded frame
    fn remaining(&self) -> Option<usize> {
        (self.marker.width > 0).then(|| self.marker.width.saturating_sub(self.consumed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SyncState {
    Unsynchronized,
    Synchronized(Frame),
}

/// Aligns a continuous stream onto codeword boundaries
#[derive(Debug, Clone)]
pub struct FrameSynchronizer {
    start_id: Option<String>,
    state: SyncState,
}

impl FrameSynchronizer {
    pub fn new(start_id: Option<String>) -> Self {
        Self {
            start_id: start_id.filter(|id| !id.is_empty()),
            state: SyncState::Unsynchronized,
        }
    }

    pub fn start_id(&self) -> Option<&str> {
        self.start_id.as_deref()
    }

    /// Change the marker id; an empty id disables synchronization
    pub fn set_start_id(&mut self, start_id: Option<String>) {
        self.start_id = start_id.filter(|id| !id.is_empty());
        self.reset();
    }

    /// Forget the current frame
    pub fn reset(&mut self) {
        self.state = SyncState::Unsynchronized;
    }

    pub fn is_synchronized(&self) -> bool {
        self.start_id.is_none() || matches!(self.state, SyncState::Synchronized(_))
    }

    /// True for labels carrying the configured start id
    pub fn is_marker(&self, label: &Label) -> bool {
        self.start_id.as_deref().is_some_and(|id| label.has_id(id))
    }

    /// Decide the next step from the visible input
    ///
    /// `labels` are relative to the input head, `available` is the readable symbol count and
    /// `codeword_len` the input symbols per codeword. A returned `Discard` is already counted
    /// against the current frame; the caller must consume exactly that many symbols.
    pub fn align(&mut self, labels: &[Label], available: usize, codeword_len: usize) -> Alignment {
        if self.start_id.is_none() {
            return Alignment::Ready {
                limit: None,
                marker: None,
            };
        }

        let first_marker = labels
            .iter()
            .filter(|l| self.is_marker(l))
            .min_by_key(|l| l.index)
            .cloned();

        if self.state == SyncState::Unsynchronized {
            let Some(marker) = first_marker else {
                return Alignment::Stalled;
            };

            debug!(
                "Start marker '{}' found at offset {} (frame width {})",
                marker.id, marker.index, marker.width
            );
            let skip = marker.index;
            self.state = SyncState::Synchronized(Frame::new(marker.at(0)));
            if skip > 0 {
                return Alignment::Discard(skip);
            }
        }

        let next_marker = labels
            .iter()
            .filter(|l| self.is_marker(l) && l.index > 0)
            .map(|l| l.index)
            .min();

        let SyncState::Synchronized(frame) = &mut self.state else {
            return Alignment::Stalled;
        };

        // A marker at the head after part of a frame was consumed starts a new frame.
        if frame.consumed > 0 {
            if let Some(marker) = labels.iter().find(|l| l.index == 0 && l.has_id(&frame.marker.id)) {
                debug!(
                    "Re-anchored on start marker after {} symbols",
                    frame.consumed
                );
                *frame = Frame::new(marker.clone());
            }
        }

        let limit = match (frame.remaining(), next_marker) {
            (Some(remaining), Some(next)) => Some(remaining.min(next)),
            (remaining, next) => remaining.or(next),
        };

        if let Some(limit) = limit {
            if limit < codeword_len {
                let discard = limit.min(available);
                if discard == 0 {
                    return Alignment::Stalled;
                }
                warn!(
                    "Discarding {} symbols: partial codeword before frame boundary",
                    discard
                );
                self.advance(discard, false);
                return Alignment::Discard(discard);
            }
        }

        let marker = (!frame.announced).then(|| frame.marker.clone());
        Alignment::Ready { limit, marker }
    }

    /// Record `consumed` input symbols of the current frame
    pub fn advance(&mut self, consumed: usize, produced: bool) {
        if let SyncState::Synchronized(frame) = &mut self.state {
            frame.consumed += consumed;
            frame.announced |= produced;

            if frame.remaining() == Some(0) {
                debug!("Frame complete after {} symbols", frame.consumed);
                self.state = SyncState::Unsynchronized;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync() -> FrameSynchronizer {
        FrameSynchronizer::new(Some("sof".to_string()))
    }

    #[test]
    fn test_marker_free_is_always_ready() {
        let mut sync = FrameSynchronizer::new(None);
        assert!(sync.is_synchronized());
        assert_eq!(
            sync.align(&[], 0, 10),
            Alignment::Ready {
                limit: None,
                marker: None
            }
        );

        // An empty id means the same
        let sync = FrameSynchronizer::new(Some(String::new()));
        assert_eq!(sync.start_id(), None);
    }

    #[test]
    fn test_stall_without_marker() {
        let mut sync = sync();
        let labels = [Label::new("other", 2)];
        assert_eq!(sync.align(&labels, 100, 10), Alignment::Stalled);
        assert!(!sync.is_synchronized());
    }

    #[test]
    fn test_skip_then_process() {
        let mut sync = sync();
        let marker = Label::new("sof", 7);

        assert_eq!(sync.align(&[marker.clone()], 100, 10), Alignment::Discard(7));
        assert!(sync.is_synchronized());

        match sync.align(&[marker.at(0)], 93, 10) {
            Alignment::Ready { limit, marker } => {
                assert_eq!(limit, None);
                assert_eq!(marker, Some(Label::new("sof", 0)));
            }
            other => panic!("unexpected {:?}", other),
        }

        sync.advance(90, true);
        match sync.align(&[], 3, 10) {
            Alignment::Ready { marker, .. } => assert_eq!(marker, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bounded_frame() {
        let mut sync = sync();
        let marker = Label::new("sof", 0).with_width(25);

        match sync.align(&[marker], 100, 10) {
            Alignment::Ready { limit, .. } => assert_eq!(limit, Some(25)),
            other => panic!("unexpected {:?}", other),
        }
        sync.advance(20, true);

        // 5 symbols left cannot form a codeword
        assert_eq!(sync.align(&[], 80, 10), Alignment::Discard(5));
        assert!(!sync.is_synchronized());
        assert_eq!(sync.align(&[], 75, 10), Alignment::Stalled);
    }

    #[test]
    fn test_next_marker_limits_step() {
        let mut sync = sync();
        let labels = [Label::new("sof", 0), Label::new("sof", 34)];

        match sync.align(&labels, 100, 10) {
            Alignment::Ready { limit, .. } => assert_eq!(limit, Some(34)),
            other => panic!("unexpected {:?}", other),
        }
        sync.advance(30, true);

        assert_eq!(sync.align(&[Label::new("sof", 4)], 70, 10), Alignment::Discard(4));

        // The new marker is now at the head and starts a new frame
        match sync.align(&[Label::new("sof", 0)], 66, 10) {
            Alignment::Ready { marker, .. } => assert_eq!(marker, Some(Label::new("sof", 0))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_set_start_id_resets() {
        let mut sync = sync();
        sync.align(&[Label::new("sof", 0)], 10, 10);
        assert!(sync.is_synchronized());

        sync.set_start_id(Some("frame".to_string()));
        assert!(!sync.is_synchronized());
        assert!(sync.is_marker(&Label::new("frame", 0)));
        assert!(!sync.is_marker(&Label::new("sof", 0)));
    }
}
