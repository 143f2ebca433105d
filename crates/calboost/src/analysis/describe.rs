//! Summary statistics per column.

use std::fmt::Write as _;

use serde::Serialize;

use crate::data::Column;
use crate::utils::{mean_std, quantile_sorted};

/// Summary of one numeric column.
///
/// `std` is the sample deviation (ddof = 1); quantiles interpolate linearly.
/// Every statistic except `count` is NaN for a column with no values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarize one column, ignoring missing values.
    pub fn of(column: &Column) -> Self {
        let mut values: Vec<f64> = column.present().collect();
        values.sort_unstable_by(f64::total_cmp);

        let (mean, std) = mean_std(&values);
        Self {
            name: column.name.to_string(),
            count: values.len(),
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Statistics in row order of the rendered table.
    fn stats(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Summaries for every column, in input order.
pub fn describe(columns: &[Column]) -> Vec<ColumnSummary> {
    columns.iter().map(ColumnSummary::of).collect()
}

/// Render summaries as a table with one column per input column and one
/// row per statistic.
pub fn render_describe(summaries: &[ColumnSummary]) -> String {
    const LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    let cells: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| s.stats().iter().map(|v| format!("{v:.6}")).collect())
        .collect();
    let widths: Vec<usize> = summaries
        .iter()
        .zip(&cells)
        .map(|(s, col)| col.iter().map(String::len).chain([s.name.len()]).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<6}", "");
    for (s, w) in summaries.iter().zip(&widths) {
        let _ = write!(out, " {:>w$}", s.name, w = w);
    }
    out.push('\n');
    for (row, label) in LABELS.iter().enumerate() {
        let _ = write!(out, "{label:<6}");
        for (col, w) in cells.iter().zip(&widths) {
            let _ = write!(out, " {:>w$}", col[row], w = w);
        }
        out.push('\n');
    }
    out
}
