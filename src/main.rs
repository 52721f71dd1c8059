//! schedpp: post-process scheduler state traces into per-task statistics.
//!
//! Loads an already-materialized state-event table (JSON Lines, one raw event
//! per line, as emitted by the capture tool) and runs the whole-trace report,
//! per-task drilldowns, and CSV export against it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use schedpp::analyze::{
    build_sched_report, drilldown_by_name, drilldown_by_parent, render_sched_report, ReportConfig,
};
use schedpp::export::save_states_csv;
use schedpp::output::TextBarChart;
use schedpp::{RawStateEvent, StateTable};

#[derive(Debug, Parser)]
#[command(name = "schedpp")]
#[command(about = "Post-process scheduler state traces into per-task statistics")]
#[command(version)]
struct Cli {
    /// JSONL state-event table produced by the capture tool
    #[arg(short, long)]
    input: PathBuf,

    /// Display width for tables and charts, and the top-N row count
    #[arg(short, long, default_value = "80")]
    width: usize,

    /// Print the whole-trace report
    #[arg(short, long)]
    report: bool,

    /// Report output format: table, json
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Drill down into tasks whose name contains SUBSTR (repeatable)
    #[arg(short, long, value_name = "SUBSTR")]
    task: Vec<String>,

    /// Drill down into tasks owned by parents whose name contains SUBSTR
    /// (repeatable)
    #[arg(short, long, value_name = "SUBSTR")]
    parent: Vec<String>,

    /// Export the normalized table to <PREFIX>_sched_states.csv
    #[arg(long, value_name = "PREFIX")]
    save_csv: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Read raw event rows from a JSON Lines file. Blank lines are skipped;
/// malformed rows fail the load before any report runs.
fn load_events(path: &Path) -> Result<Vec<RawStateEvent>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut events = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: RawStateEvent = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed event row", path.display(), lineno + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.format != "table" && cli.format != "json" {
        bail!("Invalid format: {}. Must be one of: table, json", cli.format);
    }

    let raw = load_events(&cli.input)?;
    debug!(rows = raw.len(), "loaded raw event rows");
    let table = StateTable::from_raw(raw);
    info!(events = table.len(), "normalized state table");

    let cfg = ReportConfig { width: cli.width };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut chart = TextBarChart::new(io::stdout());

    if let Some(prefix) = &cli.save_csv {
        save_states_csv(&table, prefix)?;
    }

    if cli.report {
        let report = build_sched_report(&table, &cfg);
        match cli.format.as_str() {
            "json" => {
                if !report.states.is_empty() {
                    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
                }
            }
            _ => render_sched_report(&mut out, &report, &cfg)?,
        }
    }

    if !cli.task.is_empty() {
        drilldown_by_name(&mut out, &mut chart, &table, &cli.task, &cfg)?;
    }
    if !cli.parent.is_empty() {
        drilldown_by_parent(&mut out, &mut chart, &table, &cli.parent, &cfg)?;
    }

    Ok(())
}
