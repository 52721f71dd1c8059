//! CPU residency statistics.
//!
//! Same statistical machinery as the state aggregator, restricted to the
//! Running state and keyed by CPU index. A task that was never observed
//! running yields an empty result and the reports skip its CPU panels.

use super::{group_durations, summarize_groups, DurationStats, GroupOrder};
use crate::trace::{StateEvent, TaskState};

/// Group Running-state events by CPU index and compute duration statistics
/// per CPU. Non-Running events are ignored.
pub fn summarize_by_cpu(events: &[StateEvent], order: GroupOrder) -> Vec<(u32, DurationStats)> {
    let mut groups = summarize_groups(group_durations(events, |e| {
        (e.state == TaskState::Running).then_some(e.cpu)
    }));
    if order == GroupOrder::Key {
        groups.sort_by_key(|(cpu, _)| *cpu);
    }
    groups
}
