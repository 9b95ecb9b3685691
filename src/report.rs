//! Plain-text tables for the report rows.

use std::collections::HashMap;
use std::hash::Hash;

/// A row of a report table with a fixed column schema.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    /// One formatted cell per column.
    fn cells(&self) -> Vec<String>;
}

/// Render rows as an aligned text table. The header is always printed,
/// so an empty report still shows its schema.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let body: Vec<Vec<String>> = rows.iter().map(|r| r.cells()).collect();

    let mut widths: Vec<usize> = R::COLUMNS.iter().map(|c| c.len()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = vec![format_line(R::COLUMNS.to_vec())];
    for row in &body {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Keep the first `n` rows of every group, preserving row order.
pub fn top_per_group<R, K, F>(rows: &[R], n: usize, key: F) -> Vec<R>
where
    R: Clone,
    K: Eq + Hash,
    F: Fn(&R) -> K,
{
    let mut seen: HashMap<K, usize> = HashMap::new();
    rows.iter()
        .filter(|row| {
            let count = seen.entry(key(*row)).or_insert(0);
            *count += 1;
            *count <= n
        })
        .cloned()
        .collect()
}

/// Format a float the way the reports print it; NaN stays visible.
pub(crate) fn fmt_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.4}", value)
    }
}
