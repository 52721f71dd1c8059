//! Event normalization.
//!
//! Converts raw capture rows into the immutable [`StateTable`] every report
//! reads from: durations go from trace-native nanoseconds to milliseconds and
//! timestamps are rebased so the earliest event in the whole trace (not per
//! task) sits at zero.

use crate::trace::{RawStateEvent, StateEvent, TaskState};

/// Nanoseconds per millisecond, the duration conversion factor.
const NS_PER_MS: f64 = 1_000_000.0;

/// The normalized event table for one trace session.
///
/// Built once per trace load and read-only thereafter; every aggregator
/// derives new, disposable result values from it. An empty table is a normal
/// value: downstream consumers produce no output rather than erroring.
#[derive(Clone, Debug, Default)]
pub struct StateTable {
    events: Vec<StateEvent>,
}

impl StateTable {
    /// Normalize raw capture rows into a state table.
    ///
    /// Empty input is a no-op producing an empty table.
    pub fn from_raw(raw: Vec<RawStateEvent>) -> Self {
        let origin = raw.iter().map(|e| e.ts).min().unwrap_or(0);
        let events = raw
            .into_iter()
            .map(|e| StateEvent {
                state: TaskState::from_label(&e.state),
                name: e.name,
                tid: e.tid,
                parent: e.parent,
                cpu: e.cpu,
                ts: e.ts - origin,
                dur_ms: e.dur as f64 / NS_PER_MS,
            })
            .collect();
        StateTable { events }
    }

    pub fn events(&self) -> &[StateEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
