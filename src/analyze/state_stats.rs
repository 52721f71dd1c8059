//! Per-state and per-task duration statistics.

use serde::Serialize;

use super::{group_durations, summarize_groups, DurationStats, GroupOrder};
use crate::trace::{StateEvent, TaskState};

/// Composite grouping key for per-task statistics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TaskKey {
    pub name: String,
    pub tid: u32,
}

/// Group events by scheduling state and compute duration statistics per
/// group.
///
/// `order` picks the result row order: first appearance of the state label,
/// or sorted by label.
pub fn summarize_by_state(
    events: &[StateEvent],
    order: GroupOrder,
) -> Vec<(TaskState, DurationStats)> {
    let mut groups = summarize_groups(group_durations(events, |e| Some(e.state.clone())));
    if order == GroupOrder::Key {
        groups.sort_by(|(a, _), (b, _)| a.as_label().cmp(b.as_label()));
    }
    groups
}

/// Group events by `(task_name, tid)` and compute duration statistics per
/// group, in first-appearance order.
///
/// Events without a task name carry no grouping identity and are skipped.
pub fn summarize_by_task(events: &[StateEvent]) -> Vec<(TaskKey, DurationStats)> {
    summarize_groups(group_durations(events, |e| {
        e.name.as_ref().map(|name| TaskKey {
            name: name.clone(),
            tid: e.tid,
        })
    }))
}
