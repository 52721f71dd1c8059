//! Analysis logic over the normalized state table.
//!
//! This module provides the statistics machinery shared by every report:
//! descriptive statistics over grouped interval durations, with explicit
//! control over group ordering. All functions are pure transformations over
//! the read-only event slice; an empty input always yields an empty result.

mod cpu_stats;
mod drilldown;
mod filter;
mod report;
mod state_stats;

pub use cpu_stats::summarize_by_cpu;
pub use drilldown::task_drilldown;
pub use filter::{drilldown_by_name, drilldown_by_parent};
pub use report::{
    build_sched_report, render_sched_report, PartitionRanking, ReportConfig, SchedReport,
    StateSummary, TaskSummary,
};
pub use state_stats::{summarize_by_state, summarize_by_task, TaskKey};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::trace::StateEvent;

/// Row ordering for grouped results.
///
/// Grouping itself is order-independent; which order the result rows come
/// back in is an explicit choice of the caller, not an artifact of container
/// iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Groups appear in order of first appearance in the event table.
    FirstSeen,
    /// Groups are sorted by their key.
    Key,
}

/// Descriptive statistics over one group of interval durations (ms).
///
/// All values are rounded to 2 decimal places. Percentiles use linear
/// interpolation between closest ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: u64,
    pub mean: f64,
    /// Sample standard deviation; `None` when the group has a single event.
    pub std: Option<f64>,
    pub min: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

impl DurationStats {
    /// Column headers matching the statistic fields, in table order.
    pub const COLUMNS: [&'static str; 9] = [
        "count", "mean", "std", "min", "75%", "90%", "95%", "99%", "max",
    ];

    /// Compute statistics over a group of durations. Returns `None` for an
    /// empty group.
    pub fn from_durations(durs: &[f64]) -> Option<Self> {
        if durs.is_empty() {
            return None;
        }
        let mean = durs.iter().sum::<f64>() / durs.len() as f64;
        let std = (durs.len() > 1).then(|| {
            let var =
                durs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (durs.len() - 1) as f64;
            round2(var.sqrt())
        });

        let mut sorted = durs.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        Some(DurationStats {
            count: durs.len() as u64,
            mean: round2(mean),
            std,
            min: round2(sorted[0]),
            p75: round2(percentile(&sorted, 75.0)),
            p90: round2(percentile(&sorted, 90.0)),
            p95: round2(percentile(&sorted, 95.0)),
            p99: round2(percentile(&sorted, 99.0)),
            max: round2(sorted[sorted.len() - 1]),
        })
    }

    /// Render the statistic fields as display strings, in [`Self::COLUMNS`]
    /// order. A single-sample standard deviation renders as `NaN`.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.count.to_string(),
            format!("{:.2}", self.mean),
            match self.std {
                Some(std) => format!("{std:.2}"),
                None => "NaN".to_string(),
            },
            format!("{:.2}", self.min),
            format!("{:.2}", self.p75),
            format!("{:.2}", self.p90),
            format!("{:.2}", self.p95),
            format!("{:.2}", self.p99),
            format!("{:.2}", self.max),
        ]
    }
}

/// Round to 2 decimal places, the fixed display precision of every report.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentile of a sorted slice by linear interpolation between closest
/// ranks. `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Collect event durations into groups keyed by `key_fn`, preserving
/// first-appearance order. Events for which `key_fn` returns `None` are
/// skipped.
pub(crate) fn group_durations<K, F>(events: &[StateEvent], mut key_fn: F) -> Vec<(K, Vec<f64>)>
where
    K: Clone + Eq + Hash,
    F: FnMut(&StateEvent) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<f64>)> = Vec::new();
    for event in events {
        let Some(key) = key_fn(event) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(event.dur_ms),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![event.dur_ms]));
            }
        }
    }
    groups
}

/// Reduce duration groups to their statistics, keeping group order.
pub(crate) fn summarize_groups<K>(groups: Vec<(K, Vec<f64>)>) -> Vec<(K, DurationStats)> {
    groups
        .into_iter()
        .filter_map(|(key, durs)| DurationStats::from_durations(&durs).map(|stats| (key, stats)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TaskState;

    pub(crate) fn event(
        name: Option<&str>,
        tid: u32,
        state: TaskState,
        cpu: u32,
        dur_ms: f64,
    ) -> StateEvent {
        StateEvent {
            name: name.map(str::to_string),
            tid,
            parent: None,
            cpu,
            state,
            ts: 0,
            dur_ms,
        }
    }

    #[test]
    fn test_stats_empty_group() {
        assert_eq!(DurationStats::from_durations(&[]), None);
    }

    #[test]
    fn test_stats_single_event_has_no_std() {
        let stats = DurationStats::from_durations(&[5.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, None);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.p90, 5.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_stats_two_events() {
        let stats = DurationStats::from_durations(&[10.0, 20.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 15.0);
        // Sample std of {10, 20} is sqrt(50) ~= 7.07
        assert_eq!(stats.std, Some(7.07));
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.p75, 17.5);
        assert_eq!(stats.p90, 19.0);
        assert_eq!(stats.max, 20.0);
    }

    #[test]
    fn test_percentile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&sorted, 75.0), 4.0);
        assert_eq!(percentile(&sorted, 90.0), 4.6);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
    }

    #[test]
    fn test_percentiles_monotonic() {
        let durs = [0.3, 12.5, 7.1, 0.0, 99.4, 3.3, 42.0];
        let stats = DurationStats::from_durations(&durs).unwrap();
        assert!(stats.p75 <= stats.p90);
        assert!(stats.p90 <= stats.p95);
        assert!(stats.p95 <= stats.p99);
        assert!(stats.p99 <= stats.max);
    }

    #[test]
    fn test_sum_equals_count_times_mean() {
        let durs = [1.25, 2.5, 3.75, 10.0];
        let stats = DurationStats::from_durations(&durs).unwrap();
        let sum: f64 = durs.iter().sum();
        assert!((sum - stats.count as f64 * stats.mean).abs() < 0.01 * stats.count as f64);
    }

    #[test]
    fn test_group_durations_first_seen_order() {
        let events = vec![
            event(Some("a"), 1, TaskState::Runnable, 0, 1.0),
            event(Some("b"), 2, TaskState::Running, 0, 2.0),
            event(Some("a"), 1, TaskState::Runnable, 0, 3.0),
        ];
        let groups = group_durations(&events, |e| Some(e.state.clone()));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, TaskState::Runnable);
        assert_eq!(groups[0].1, vec![1.0, 3.0]);
        assert_eq!(groups[1].0, TaskState::Running);
    }

    #[test]
    fn test_group_durations_skips_none_keys() {
        let events = vec![
            event(None, 1, TaskState::Running, 0, 1.0),
            event(Some("a"), 2, TaskState::Running, 0, 2.0),
        ];
        let groups = group_durations(&events, |e| e.name.clone());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "a");
    }
}
