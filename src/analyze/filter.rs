//! Task selection driving the drilldown: name-substring and parent-substring
//! fan-out.
//!
//! Matching is case-sensitive substring containment; events without a name
//! (or parent) never match. A substring that matches nothing is a no-op, not
//! an error.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Result;

use super::{task_drilldown, ReportConfig};
use crate::normalize::StateTable;
use crate::output::ChartRenderer;

/// For each substring, drill down into every distinct task name containing
/// it, one drilldown per `(matched_name, tid)` pair.
pub fn drilldown_by_name<W: Write, C: ChartRenderer>(
    out: &mut W,
    chart: &mut C,
    table: &StateTable,
    patterns: &[String],
    cfg: &ReportConfig,
) -> Result<()> {
    for pattern in patterns {
        let names: BTreeSet<&str> = table
            .events()
            .iter()
            .filter_map(|e| e.name.as_deref())
            .filter(|name| name.contains(pattern.as_str()))
            .collect();
        for name in names {
            task_drilldown(out, chart, table, name, None, cfg)?;
        }
    }
    Ok(())
}

/// For each substring, select every distinct parent name containing it, then
/// drill down into each task name owned by that parent, restricted to the
/// parent's events.
pub fn drilldown_by_parent<W: Write, C: ChartRenderer>(
    out: &mut W,
    chart: &mut C,
    table: &StateTable,
    patterns: &[String],
    cfg: &ReportConfig,
) -> Result<()> {
    for pattern in patterns {
        let parents: BTreeSet<&str> = table
            .events()
            .iter()
            .filter_map(|e| e.parent.as_deref())
            .filter(|parent| parent.contains(pattern.as_str()))
            .collect();
        for parent in parents {
            let names: BTreeSet<&str> = table
                .events()
                .iter()
                .filter(|e| e.parent.as_deref() == Some(parent))
                .filter_map(|e| e.name.as_deref())
                .collect();
            for name in names {
                task_drilldown(out, chart, table, name, Some(parent), cfg)?;
            }
        }
    }
    Ok(())
}
