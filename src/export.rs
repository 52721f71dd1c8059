//! Bulk export of the normalized state table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::normalize::StateTable;

/// File name suffix appended to the caller-supplied prefix.
const STATES_SUFFIX: &str = "_sched_states.csv";

/// Write the normalized table as CSV, one row per event, to
/// `<prefix>_sched_states.csv`. Returns the path written.
pub fn save_states_csv(table: &StateTable, prefix: &str) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{prefix}{STATES_SUFFIX}"));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "name,tid,parent,cpu,state,ts,dur")?;
    for event in table.events() {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            event.name.as_deref().unwrap_or(""),
            event.tid,
            event.parent.as_deref().unwrap_or(""),
            event.cpu,
            event.state,
            event.ts,
            event.dur_ms,
        )?;
    }
    out.flush()?;

    info!(rows = table.len(), path = %path.display(), "exported state table");
    Ok(path)
}
