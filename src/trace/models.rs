//! Data model structs shared between ingestion and analysis.
//!
//! These structs represent the canonical format for scheduler state intervals.
//! The capture tool emits `RawStateEvent` rows; the normalizer converts them
//! into `StateEvent` rows held by a [`crate::normalize::StateTable`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw state-interval row as emitted by the capture tool.
///
/// # Fields
/// - `name`: Task/thread name (absent for some kernel-internal tasks)
/// - `tid`: OS thread ID
/// - `parent`: Owning process name (absent for kernel-internal tasks)
/// - `cpu`: CPU the task ran on (meaningful only for the Running state)
/// - `state`: State symbol verbatim from the trace (e.g. "Running", "R", "D")
/// - `ts`: Absolute monotonic timestamp in nanoseconds
/// - `dur`: Interval length in nanoseconds
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawStateEvent {
    pub name: Option<String>,
    pub tid: u32,
    pub parent: Option<String>,
    pub cpu: u32,
    pub state: String,
    pub ts: u64,
    pub dur: u64,
}

/// Scheduling state a task held over one interval.
///
/// The states the reports treat specially get their own variants so the
/// exclusion logic (e.g. dropping interruptible sleep from drilldowns) is
/// exhaustive-checked; anything else the trace emits is carried verbatim in
/// `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    Running,
    /// Ready to run, waiting for a CPU (`R`).
    Runnable,
    /// Ready to run after being preempted (`R+`).
    RunnablePreempted,
    /// Blocked on I/O or a kernel resource (`D`).
    UninterruptibleSleep,
    /// Signal-interruptible sleep (`S`).
    InterruptibleSleep,
    Other(String),
}

impl TaskState {
    /// Parse a trace state symbol. Never fails; unknown symbols land in
    /// `Other` with the label preserved.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Running" => TaskState::Running,
            "R" => TaskState::Runnable,
            "R+" => TaskState::RunnablePreempted,
            "D" => TaskState::UninterruptibleSleep,
            "S" => TaskState::InterruptibleSleep,
            other => TaskState::Other(other.to_string()),
        }
    }

    /// The trace symbol this state was parsed from.
    pub fn as_label(&self) -> &str {
        match self {
            TaskState::Running => "Running",
            TaskState::Runnable => "R",
            TaskState::RunnablePreempted => "R+",
            TaskState::UninterruptibleSleep => "D",
            TaskState::InterruptibleSleep => "S",
            TaskState::Other(label) => label,
        }
    }

    /// Covers both plain runnable (`R`) and preempted-runnable (`R+`).
    pub fn is_runnable(&self) -> bool {
        matches!(self, TaskState::Runnable | TaskState::RunnablePreempted)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Normalized state-interval row.
///
/// # Fields
/// - `ts`: Start timestamp in nanoseconds, rebased to zero at trace start
/// - `dur_ms`: Interval length in milliseconds (always >= 0)
#[derive(Clone, Debug, PartialEq)]
pub struct StateEvent {
    pub name: Option<String>,
    pub tid: u32,
    pub parent: Option<String>,
    pub cpu: u32,
    pub state: TaskState,
    pub ts: u64,
    pub dur_ms: f64,
}
