//! Output rendering abstraction layer.
//!
//! The [`ChartRenderer`] trait decouples the reports from the terminal
//! chart-rendering backend: reports hand over finished label/value series and
//! never format bars themselves. A plain-text implementation is bundled for
//! the CLI; alternative backends (or test doubles) implement the same trait.
//!
//! The fixed-width statistics table printer used by every textual report also
//! lives here.

use std::io::Write;

use anyhow::Result;

/// Trait for terminal bar-chart backends.
///
/// Lifecycle per chart: `clear` resets any buffered figure state,
/// `simple_bar` stages one bar chart from parallel label/value series, and
/// `show` flushes the rendered chart to the output stream.
pub trait ChartRenderer {
    /// Reset figure and data state before staging a new chart.
    fn clear(&mut self);

    /// Stage a bar chart: one bar per label, scaled to `width` text columns.
    fn simple_bar(&mut self, labels: &[String], values: &[f64], width: usize, title: &str);

    /// Flush the staged chart to the output stream.
    fn show(&mut self) -> Result<()>;
}

/// Columns reserved next to each bar for the printed value.
const VALUE_COLUMNS: usize = 10;

/// Plain-text bar charts written to any `Write` sink.
pub struct TextBarChart<W: Write> {
    out: W,
    lines: Vec<String>,
}

impl<W: Write> TextBarChart<W> {
    pub fn new(out: W) -> Self {
        TextBarChart {
            out,
            lines: Vec::new(),
        }
    }
}

impl<W: Write> ChartRenderer for TextBarChart<W> {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn simple_bar(&mut self, labels: &[String], values: &[f64], width: usize, title: &str) {
        if labels.is_empty() {
            return;
        }
        self.lines.push(title.to_string());

        let label_width = labels.iter().map(String::len).max().unwrap_or(0);
        let avail = width
            .saturating_sub(label_width + 3 + VALUE_COLUMNS)
            .max(1);
        let scale = values.iter().cloned().fold(0.0_f64, f64::max);

        for (label, value) in labels.iter().zip(values) {
            let bar_len = if scale > 0.0 {
                ((value / scale) * avail as f64).round() as usize
            } else {
                0
            };
            self.lines.push(format!(
                "{label:<label_width$} | {bar} {value:.2}",
                bar = "\u{2588}".repeat(bar_len),
            ));
        }
    }

    fn show(&mut self) -> Result<()> {
        for line in self.lines.drain(..) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}

/// Column values wider than this are truncated with an ellipsis.
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Write a fixed-width table with a header row and a separator line.
pub fn print_table<W: Write>(out: &mut W, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "(no results)")?;
        return Ok(());
    }

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (i, val) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(val.len());
            }
        }
    }

    for w in &mut widths {
        *w = (*w).min(MAX_COLUMN_WIDTH);
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths.get(i).copied().unwrap_or(10)))
        .collect();
    writeln!(out, "{}", header_line.join(" | "))?;

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", sep.join("-+-"))?;

    for row in rows {
        let row_line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let width = widths.get(i).copied().unwrap_or(10);
                let truncated = if v.len() > width && width > 3 {
                    format!("{}...", &v[..width.saturating_sub(3)])
                } else {
                    v.clone()
                };
                format!("{truncated:width$}")
            })
            .collect();
        writeln!(out, "{}", row_line.join(" | "))?;
    }

    Ok(())
}
