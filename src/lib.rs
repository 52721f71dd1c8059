//! schedpp library - post-process scheduler state traces into per-task
//! statistics.
//!
//! The capture tool hands over a complete table of per-task state intervals;
//! this crate normalizes it once and derives reports from the read-only
//! result: per-state and per-task duration statistics, top-N rankings of the
//! most runnable/running/blocked tasks, and per-task drilldowns with state
//! and CPU-residency breakdowns.
//!
//! # Modules
//!
//! - [`trace`] - Canonical data types for raw and normalized state events
//! - [`normalize`] - The [`StateTable`] session handle built once per trace
//! - [`analyze`] - Statistics machinery, rankings, drilldowns, filters
//! - [`output`] - Chart-renderer seam and fixed-width table printing
//! - [`export`] - Bulk CSV export of the normalized table

pub mod analyze;
pub mod export;
pub mod normalize;
pub mod output;
pub mod trace;

// Re-export for convenience
pub use normalize::StateTable;
pub use trace::{RawStateEvent, StateEvent, TaskState};
