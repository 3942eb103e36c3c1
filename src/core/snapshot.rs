//! Two-slot snapshot store for rate diffing

use crate::core::quote::RateQuote;
use chrono::{DateTime, Utc};

/// One point-in-time set of quotes for all resolved instruments. Only the
/// minimal quote fields are retained; deltas are recomputed on each fetch,
/// never stored.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub quotes: Vec<RateQuote>,
}

impl RateSnapshot {
    pub fn new(quotes: Vec<RateQuote>) -> Self {
        Self {
            fetched_at: Utc::now(),
            quotes,
        }
    }
}

/// Holds exactly one current and one previous snapshot. Rotated atomically
/// after each successful fetch; a failed fetch leaves both slots untouched.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<RateSnapshot>,
    previous: Option<RateSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes the current snapshot, demoting it to the previous slot.
    pub fn apply(&mut self, snapshot: RateSnapshot) {
        self.previous = self.current.take();
        self.current = Some(snapshot);
    }

    pub fn current(&self) -> Option<&RateSnapshot> {
        self.current.as_ref()
    }

    /// Quotes to diff the next fetch against. The current snapshot serves as
    /// "previous" for the cycle that supersedes it.
    pub fn diff_base(&self) -> &[RateQuote] {
        self.current.as_ref().map_or(&[], |s| &s.quotes)
    }
}
