//! Regression evaluation metrics.
//!
//! All metrics accumulate in f64 and return NaN for empty input.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

// =============================================================================
// MetricFn
// =============================================================================

/// An evaluation metric over predictions and targets.
pub trait MetricFn: Send + Sync {
    fn compute(&self, predictions: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> f64;

    /// Whether higher values are better (R² yes, RMSE no).
    fn higher_is_better(&self) -> bool;

    fn name(&self) -> &'static str;

    /// Disabled metrics are never computed during training.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Zip predictions with targets, widened to f64.
fn paired<'a, 'b>(
    predictions: ArrayView1<'a, f32>,
    targets: ArrayView1<'b, f32>,
) -> impl Iterator<Item = (f64, f64)> + use<'a, 'b> {
    debug_assert_eq!(predictions.len(), targets.len());
    predictions
        .into_iter()
        .zip(targets)
        .map(|(&p, &y)| (p as f64, y as f64))
}

// =============================================================================
// Regression Metrics
// =============================================================================

/// Root mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return f64::NAN;
        }
        let sse: f64 = paired(predictions, targets).map(|(p, y)| (p - y) * (p - y)).sum();
        (sse / n as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

/// Mean absolute error: `mean(|y - ŷ|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return f64::NAN;
        }
        let sae: f64 = paired(predictions, targets).map(|(p, y)| (y - p).abs()).sum();
        sae / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

/// Coefficient of determination.
///
/// `1 - SS_res / SS_tot`. A constant target yields 1.0 for a perfect fit
/// and 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RSquared;

impl MetricFn for RSquared {
    fn compute(&self, predictions: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> f64 {
        let n = targets.len();
        if n == 0 {
            return f64::NAN;
        }
        let mean = targets.iter().map(|&y| y as f64).sum::<f64>() / n as f64;
        let (ss_res, ss_tot) = paired(predictions, targets).fold((0.0, 0.0), |(res, tot), (p, y)| {
            (res + (y - p) * (y - p), tot + (y - mean) * (y - mean))
        });
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

// =============================================================================
// Metric
// =============================================================================

/// Evaluation metric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// No evaluation during training.
    #[default]
    None,
    Rmse,
    Mae,
    R2,
}

impl Metric {
    pub fn none() -> Self {
        Metric::None
    }

    pub fn rmse() -> Self {
        Metric::Rmse
    }

    pub fn mae() -> Self {
        Metric::Mae
    }

    pub fn r2() -> Self {
        Metric::R2
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> f64 {
        match self {
            Metric::None => f64::NAN,
            Metric::Rmse => Rmse.compute(predictions, targets),
            Metric::Mae => Mae.compute(predictions, targets),
            Metric::R2 => RSquared.compute(predictions, targets),
        }
    }

    fn higher_is_better(&self) -> bool {
        matches!(self, Metric::R2)
    }

    fn name(&self) -> &'static str {
        match self {
            Metric::None => "none",
            Metric::Rmse => Rmse.name(),
            Metric::Mae => Mae.name(),
            Metric::R2 => RSquared.name(),
        }
    }

    fn is_enabled(&self) -> bool {
        !matches!(self, Metric::None)
    }
}
