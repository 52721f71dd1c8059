//! Per-task drilldown: state and CPU time breakdowns for a single task.
//!
//! For each thread id observed under a task name the drilldown renders sum
//! and percentage bar charts for time in state (interruptible sleep is
//! excluded throughout) and for time running per CPU, followed by percentile
//! tables. The percentage
//! series rescales onto the configured display width rather than 0-100, so
//! percentage bars stay proportionate to the magnitude bars at a fixed
//! terminal width.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use anyhow::Result;

use super::{
    round2, summarize_by_cpu, summarize_by_state, DurationStats, GroupOrder, ReportConfig,
};
use crate::normalize::StateTable;
use crate::output::{print_table, ChartRenderer};
use crate::trace::{StateEvent, TaskState};

/// Render the drilldown for every thread id observed under `name`,
/// optionally restricted to events owned by `parent`.
///
/// A task with no matching events, or whose non-sleep state durations sum to
/// zero, produces no output.
pub fn task_drilldown<W: Write, C: ChartRenderer>(
    out: &mut W,
    chart: &mut C,
    table: &StateTable,
    name: &str,
    parent: Option<&str>,
    cfg: &ReportConfig,
) -> Result<()> {
    let selected: Vec<&StateEvent> = table
        .events()
        .iter()
        .filter(|e| e.name.as_deref() == Some(name))
        .filter(|e| parent.map_or(true, |p| e.parent.as_deref() == Some(p)))
        .collect();

    let tids: BTreeSet<u32> = selected.iter().map(|e| e.tid).collect();
    for tid in tids {
        let events: Vec<StateEvent> = selected
            .iter()
            .filter(|e| e.tid == tid)
            .map(|e| (*e).clone())
            .collect();
        render_thread(out, chart, &events, name, tid, cfg)?;
    }

    Ok(())
}

fn render_thread<W: Write, C: ChartRenderer>(
    out: &mut W,
    chart: &mut C,
    events: &[StateEvent],
    name: &str,
    tid: u32,
    cfg: &ReportConfig,
) -> Result<()> {
    let state_sums = summed_by_key(events, |e| {
        (e.state != TaskState::InterruptibleSleep).then(|| e.state.as_label().to_string())
    });
    let total: f64 = state_sums.iter().map(|(_, sum)| sum).sum();
    if total == 0.0 {
        return Ok(());
    }

    let ruler = "-".repeat(cfg.width);
    let parents: BTreeSet<String> = events.iter().filter_map(|e| e.parent.clone()).collect();
    let parents: Vec<String> = parents.into_iter().collect();
    let banner = format!("::  {} | {} | [{}] ::", tid, name, parents.join(", "));

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(banner.len()))?;
    writeln!(out, "{banner}")?;
    writeln!(out, "{}", "=".repeat(cfg.width))?;
    writeln!(out, "{ruler}")?;

    let labels: Vec<String> = state_sums.iter().map(|(label, _)| label.clone()).collect();
    let sums: Vec<f64> = state_sums.iter().map(|(_, sum)| *sum).collect();

    chart.clear();
    chart.simple_bar(
        &labels,
        &sums,
        cfg.width,
        "Sum Time in State Exclude Sleeping (ms)",
    );
    chart.show()?;

    writeln!(out)?;
    let pct = width_percentages(&sums, total, cfg.width);
    chart.clear();
    chart.simple_bar(
        &labels,
        &pct,
        cfg.width,
        "% Time in State Exclude Sleeping (ms)",
    );
    chart.show()?;

    // CPU residency panels, skipped when the task was never observed running.
    let cpu_sums = summed_by_key(events, |e| (e.state == TaskState::Running).then_some(e.cpu));
    let cpu_total: f64 = cpu_sums.iter().map(|(_, sum)| sum).sum();
    if cpu_total > 0.0 {
        let cpu_labels: Vec<String> = cpu_sums.iter().map(|(cpu, _)| format!("CPU{cpu}")).collect();
        let cpu_values: Vec<f64> = cpu_sums.iter().map(|(_, sum)| *sum).collect();

        writeln!(out)?;
        chart.clear();
        chart.simple_bar(
            &cpu_labels,
            &cpu_values,
            cfg.width,
            "Sum Time Running on CPU (ms)",
        );
        chart.show()?;

        writeln!(out)?;
        let cpu_pct = width_percentages(&cpu_values, cpu_total, cfg.width);
        chart.clear();
        chart.simple_bar(
            &cpu_labels,
            &cpu_pct,
            cfg.width,
            "% Time Running on CPU (ms)",
        );
        chart.show()?;
    }

    let non_sleep: Vec<StateEvent> = events
        .iter()
        .filter(|e| e.state != TaskState::InterruptibleSleep)
        .cloned()
        .collect();

    writeln!(out)?;
    writeln!(out, "Time in State (ms):")?;
    writeln!(out, "{ruler}")?;
    let state_rows: Vec<Vec<String>> = summarize_by_state(&non_sleep, GroupOrder::Key)
        .into_iter()
        .map(|(state, stats)| {
            let mut cells = vec![state.as_label().to_string()];
            cells.extend(stats.cells());
            cells
        })
        .collect();
    print_table(out, &keyed_headers("state"), &state_rows)?;

    let cpu_stat_rows: Vec<Vec<String>> = summarize_by_cpu(events, GroupOrder::Key)
        .into_iter()
        .map(|(cpu, stats)| {
            let mut cells = vec![cpu.to_string()];
            cells.extend(stats.cells());
            cells
        })
        .collect();
    if !cpu_stat_rows.is_empty() {
        writeln!(out)?;
        writeln!(out, "Time Running on CPU (ms):")?;
        writeln!(out, "{ruler}")?;
        print_table(out, &keyed_headers("cpu"), &cpu_stat_rows)?;
    }

    Ok(())
}

/// Summed duration per key, sorted by key, each sum rounded to 2 decimals.
fn summed_by_key<K, F>(events: &[StateEvent], mut key_fn: F) -> Vec<(K, f64)>
where
    K: Ord,
    F: FnMut(&StateEvent) -> Option<K>,
{
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();
    for event in events {
        if let Some(key) = key_fn(event) {
            *sums.entry(key).or_insert(0.0) += event.dur_ms;
        }
    }
    sums.into_iter().map(|(key, sum)| (key, round2(sum))).collect()
}

/// Rescale sums so the series totals the display width. `total` must be
/// nonzero; callers guard before dividing.
fn width_percentages(sums: &[f64], total: f64, width: usize) -> Vec<f64> {
    sums.iter().map(|sum| sum * width as f64 / total).collect()
}

fn keyed_headers(key: &str) -> Vec<String> {
    let mut headers = vec![key.to_string()];
    headers.extend(DurationStats::COLUMNS.iter().map(|c| c.to_string()));
    headers
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::trace::RawStateEvent;

    /// Chart double recording every shown bar series.
    #[derive(Default)]
    pub(crate) struct RecordingChart {
        staged: Vec<(String, Vec<String>, Vec<f64>)>,
        pub shown: Vec<(String, Vec<String>, Vec<f64>)>,
    }

    impl ChartRenderer for RecordingChart {
        fn clear(&mut self) {
            self.staged.clear();
        }

        fn simple_bar(&mut self, labels: &[String], values: &[f64], _width: usize, title: &str) {
            self.staged
                .push((title.to_string(), labels.to_vec(), values.to_vec()));
        }

        fn show(&mut self) -> Result<()> {
            self.shown.append(&mut self.staged);
            Ok(())
        }
    }

    fn raw(
        name: &str,
        parent: Option<&str>,
        tid: u32,
        cpu: u32,
        state: &str,
        dur_ns: u64,
    ) -> RawStateEvent {
        RawStateEvent {
            name: Some(name.to_string()),
            tid,
            parent: parent.map(str::to_string),
            cpu,
            state: state.to_string(),
            ts: 0,
            dur: dur_ns,
        }
    }

    fn drill(
        table: &StateTable,
        name: &str,
        parent: Option<&str>,
        width: usize,
    ) -> (String, RecordingChart) {
        let mut out = Vec::new();
        let mut chart = RecordingChart::default();
        let cfg = ReportConfig { width };
        task_drilldown(&mut out, &mut chart, table, name, parent, &cfg).unwrap();
        (String::from_utf8(out).unwrap(), chart)
    }

    #[test]
    fn test_no_matching_events_no_output() {
        let table = StateTable::from_raw(vec![raw("bar", None, 1, 0, "R", 1_000_000)]);
        let (text, chart) = drill(&table, "foo", None, 80);
        assert!(text.is_empty());
        assert!(chart.shown.is_empty());
    }

    #[test]
    fn test_zero_total_no_output() {
        // Only zero-length intervals: the percentage denominator is zero.
        let table = StateTable::from_raw(vec![raw("foo", None, 1, 0, "R", 0)]);
        let (text, chart) = drill(&table, "foo", None, 80);
        assert!(text.is_empty());
        assert!(chart.shown.is_empty());
    }

    #[test]
    fn test_sleep_only_task_no_output() {
        let table = StateTable::from_raw(vec![raw("foo", None, 1, 0, "S", 5_000_000)]);
        let (text, chart) = drill(&table, "foo", None, 80);
        assert!(text.is_empty());
        assert!(chart.shown.is_empty());
    }

    #[test]
    fn test_interruptible_sleep_excluded_from_state_series() {
        let table = StateTable::from_raw(vec![
            raw("foo", None, 1, 0, "Running", 10_000_000),
            raw("foo", None, 1, 0, "S", 50_000_000),
            raw("foo", None, 1, 0, "D", 5_000_000),
        ]);
        let (text, chart) = drill(&table, "foo", None, 80);

        let (title, labels, _) = &chart.shown[0];
        assert_eq!(title, "Sum Time in State Exclude Sleeping (ms)");
        assert_eq!(labels, &vec!["D".to_string(), "Running".to_string()]);

        // The percentile table drops it too.
        assert!(text.contains("Time in State (ms):"));
        assert!(!text
            .lines()
            .any(|line| line.starts_with("S ") && line.contains(" | ")));
    }

    #[test]
    fn test_percentage_series_sums_to_width() {
        let table = StateTable::from_raw(vec![
            raw("foo", None, 1, 0, "Running", 30_000_000),
            raw("foo", None, 1, 0, "R", 10_000_000),
            raw("foo", None, 1, 0, "D", 20_000_000),
        ]);
        let (_, chart) = drill(&table, "foo", None, 80);

        let (title, _, pct) = &chart.shown[1];
        assert_eq!(title, "% Time in State Exclude Sleeping (ms)");
        let sum: f64 = pct.iter().sum();
        assert!((sum - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_cpu_percentage_series() {
        // Running 30ms on CPU0 and 10ms on CPU1 at width 80 -> [60, 20].
        let table = StateTable::from_raw(vec![
            raw("foo", None, 1, 0, "Running", 30_000_000),
            raw("foo", None, 1, 1, "Running", 10_000_000),
        ]);
        let (_, chart) = drill(&table, "foo", None, 80);

        let (title, labels, sums) = &chart.shown[2];
        assert_eq!(title, "Sum Time Running on CPU (ms)");
        assert_eq!(labels, &vec!["CPU0".to_string(), "CPU1".to_string()]);
        assert_eq!(sums, &vec![30.0, 10.0]);

        let (title, _, pct) = &chart.shown[3];
        assert_eq!(title, "% Time Running on CPU (ms)");
        assert_eq!(pct, &vec![60.0, 20.0]);
    }

    #[test]
    fn test_never_running_skips_cpu_panels() {
        let table = StateTable::from_raw(vec![raw("foo", None, 1, 0, "R", 10_000_000)]);
        let (text, chart) = drill(&table, "foo", None, 80);

        assert_eq!(chart.shown.len(), 2);
        assert!(!text.contains("Time Running on CPU (ms):"));
    }

    #[test]
    fn test_one_drilldown_per_tid() {
        let table = StateTable::from_raw(vec![
            raw("foo", None, 2, 0, "Running", 1_000_000),
            raw("foo", None, 1, 0, "Running", 1_000_000),
        ]);
        let (text, _) = drill(&table, "foo", None, 80);

        let banners: Vec<&str> = text.lines().filter(|l| l.starts_with("::  ")).collect();
        assert_eq!(banners.len(), 2);
        // tids render in ascending order
        assert!(banners[0].starts_with("::  1 |"));
        assert!(banners[1].starts_with("::  2 |"));
    }

    #[test]
    fn test_parent_scoping_restricts_events() {
        let table = StateTable::from_raw(vec![
            raw("foo", Some("app"), 1, 0, "Running", 10_000_000),
            raw("foo", Some("other"), 2, 0, "Running", 10_000_000),
        ]);
        let (text, _) = drill(&table, "foo", Some("app"), 80);

        assert!(text.contains("::  1 | foo | [app] ::"));
        assert!(!text.contains("::  2 |"));
    }

    #[test]
    fn test_banner_lists_tid_name_parents() {
        let table = StateTable::from_raw(vec![raw(
            "worker",
            Some("server"),
            42,
            0,
            "Running",
            1_000_000,
        )]);
        let (text, _) = drill(&table, "worker", None, 40);

        assert!(text.contains("::  42 | worker | [server] ::"));
        assert!(text.contains(&"=".repeat(40)));
        assert!(text.contains(&"-".repeat(40)));
    }
}
