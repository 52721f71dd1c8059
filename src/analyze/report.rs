//! Whole-trace scheduling report: per-state summary plus top-N rankings of
//! the most runnable, running, and blocked tasks.

use std::cmp::Ordering;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::{summarize_by_state, summarize_by_task, DurationStats, GroupOrder, TaskKey};
use crate::normalize::StateTable;
use crate::output::print_table;
use crate::trace::{StateEvent, TaskState};

/// Process-wide display configuration. The width drives chart and ruler
/// sizing and doubles as the top-N row count of the ranking tables.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig { width: 80 }
    }
}

/// One state row of the whole-trace summary.
#[derive(Debug, Serialize)]
pub struct StateSummary {
    pub state: String,
    #[serde(flatten)]
    pub stats: DurationStats,
}

/// One ranked task row.
#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub tid: u32,
    #[serde(flatten)]
    pub stats: DurationStats,
}

/// Top-N rankings for one task-state partition, sorted descending by max
/// duration and by 90th-percentile duration.
#[derive(Debug, Serialize)]
pub struct PartitionRanking {
    pub state: String,
    pub by_max: Vec<TaskSummary>,
    pub by_p90: Vec<TaskSummary>,
}

/// The whole-trace scheduling report. Partitions with no events are absent.
#[derive(Debug, Serialize)]
pub struct SchedReport {
    pub states: Vec<StateSummary>,
    pub partitions: Vec<PartitionRanking>,
}

/// The three ranked task-state partitions of the report.
const PARTITIONS: [(&str, fn(&StateEvent) -> bool); 3] = [
    ("Runnable", |e| e.state.is_runnable()),
    ("Running", |e| e.state == TaskState::Running),
    ("Uninterruptible Sleep", |e| {
        e.state == TaskState::UninterruptibleSleep
    }),
];

/// Aggregate the whole-trace report. An empty table yields an empty report.
pub fn build_sched_report(table: &StateTable, cfg: &ReportConfig) -> SchedReport {
    let events = table.events();

    let states = summarize_by_state(events, GroupOrder::Key)
        .into_iter()
        .map(|(state, stats)| StateSummary {
            state: state.as_label().to_string(),
            stats,
        })
        .collect();

    let mut partitions = Vec::new();
    for (label, matches) in PARTITIONS {
        let subset: Vec<StateEvent> = events.iter().filter(|e| matches(e)).cloned().collect();
        if subset.is_empty() {
            continue;
        }
        let tasks = summarize_by_task(&subset);
        partitions.push(PartitionRanking {
            state: label.to_string(),
            by_max: rank_tasks(&tasks, |s| s.max, cfg.width),
            by_p90: rank_tasks(&tasks, |s| s.p90, cfg.width),
        });
    }

    SchedReport { states, partitions }
}

/// Render the report as fixed-width tables. An empty report writes nothing.
pub fn render_sched_report<W: Write>(
    out: &mut W,
    report: &SchedReport,
    cfg: &ReportConfig,
) -> Result<()> {
    if report.states.is_empty() {
        return Ok(());
    }

    let ruler = "-".repeat(cfg.width);

    writeln!(out)?;
    writeln!(out, "States Summary (ms):")?;
    writeln!(out, "{ruler}")?;
    let headers = state_headers();
    let rows: Vec<Vec<String>> = report
        .states
        .iter()
        .map(|row| {
            let mut cells = vec![row.state.clone()];
            cells.extend(row.stats.cells());
            cells
        })
        .collect();
    print_table(out, &headers, &rows)?;

    for partition in &report.partitions {
        render_ranking(out, &partition.state, "max", &partition.by_max, cfg)?;
        render_ranking(out, &partition.state, "90%", &partition.by_p90, cfg)?;
    }

    Ok(())
}

fn render_ranking<W: Write>(
    out: &mut W,
    state: &str,
    sort_key: &str,
    rows: &[TaskSummary],
    cfg: &ReportConfig,
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Top {} {} Tasks (ms) - sorted-by {}:",
        cfg.width, state, sort_key
    )?;
    writeln!(out, "{}", "-".repeat(cfg.width))?;

    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.name.clone(), row.tid.to_string()];
            cells.extend(row.stats.cells());
            cells
        })
        .collect();
    print_table(out, &task_headers(), &table_rows)
}

fn state_headers() -> Vec<String> {
    let mut headers = vec!["state".to_string()];
    headers.extend(DurationStats::COLUMNS.iter().map(|c| c.to_string()));
    headers
}

fn task_headers() -> Vec<String> {
    let mut headers = vec!["name".to_string(), "tid".to_string()];
    headers.extend(DurationStats::COLUMNS.iter().map(|c| c.to_string()));
    headers
}

/// Stable descending sort by a chosen statistic, truncated to `top_n` rows.
/// Ties keep the group's first-appearance order.
fn rank_tasks(
    groups: &[(TaskKey, DurationStats)],
    key: fn(&DurationStats) -> f64,
    top_n: usize,
) -> Vec<TaskSummary> {
    let mut ranked: Vec<&(TaskKey, DurationStats)> = groups.iter().collect();
    ranked.sort_by(|a, b| key(&b.1).partial_cmp(&key(&a.1)).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(task, stats)| TaskSummary {
            name: task.name.clone(),
            tid: task.tid,
            stats: stats.clone(),
        })
        .collect()
}
