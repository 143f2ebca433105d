//! Regression objective functions.
//!
//! Predictions and targets are 1-D views of length `n_samples`.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::GradsTuple;
use crate::utils::quantile_sorted;

// =============================================================================
// ObjectiveFn
// =============================================================================

/// A differentiable training loss.
pub trait ObjectiveFn: Send + Sync {
    /// Write per-sample gradients and hessians into `grad_hess`.
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<'_, f32>,
        targets: ArrayView1<'_, f32>,
        grad_hess: &mut [GradsTuple],
    );

    /// Constant initial prediction.
    fn compute_base_score(&self, targets: ArrayView1<'_, f32>) -> f32;

    fn name(&self) -> &'static str;
}

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2 loss) for regression.
///
/// - Loss: `0.5 * (pred - target)²`
/// - Gradient: `pred - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<'_, f32>,
        targets: ArrayView1<'_, f32>,
        grad_hess: &mut [GradsTuple],
    ) {
        for ((gh, &pred), &target) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            gh.grad = pred - target;
            gh.hess = 1.0;
        }
    }

    fn compute_base_score(&self, targets: ArrayView1<'_, f32>) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&y| y as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn name(&self) -> &'static str {
        "squared"
    }
}

// =============================================================================
// Pseudo-Huber Loss
// =============================================================================

/// A smooth approximation to Huber loss:
/// - Loss: `delta² * (sqrt(1 + (residual/delta)²) - 1)`
/// - Gradient: `residual / sqrt(1 + (residual/delta)²)`
/// - Hessian: `1 / (1 + (residual/delta)²)^1.5`
#[derive(Debug, Clone, Copy)]
pub struct PseudoHuberLoss {
    pub delta: f32,
}

impl PseudoHuberLoss {
    pub fn new(delta: f32) -> Self {
        debug_assert!(delta > 0.0);
        Self { delta }
    }
}

impl ObjectiveFn for PseudoHuberLoss {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<'_, f32>,
        targets: ArrayView1<'_, f32>,
        grad_hess: &mut [GradsTuple],
    ) {
        let inv_delta_sq = 1.0 / (self.delta * self.delta);
        for ((gh, &pred), &target) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            let residual = pred - target;
            let factor = 1.0 + residual * residual * inv_delta_sq;
            let sqrt_factor = factor.sqrt();
            gh.grad = residual / sqrt_factor;
            gh.hess = 1.0 / (factor * sqrt_factor);
        }
    }

    fn compute_base_score(&self, targets: ArrayView1<'_, f32>) -> f32 {
        // Median as robust base score
        let mut sorted: Vec<f64> = targets.iter().map(|&y| y as f64).collect();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(f64::total_cmp);
        quantile_sorted(&sorted, 0.5) as f32
    }

    fn name(&self) -> &'static str {
        "pseudo_huber"
    }
}

// =============================================================================
// Objective
// =============================================================================

/// Training objective selector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Squared error (`reg:squarederror`).
    #[default]
    Squared,
    /// Pseudo-Huber loss with slope parameter `delta`.
    PseudoHuber { delta: f32 },
}

impl Objective {
    pub fn squared() -> Self {
        Objective::Squared
    }

    pub fn pseudo_huber(delta: f32) -> Self {
        Objective::PseudoHuber { delta }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::Squared => write!(f, "squared"),
            Objective::PseudoHuber { delta } => write!(f, "pseudo_huber(delta={delta})"),
        }
    }
}

impl ObjectiveFn for Objective {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<'_, f32>,
        targets: ArrayView1<'_, f32>,
        grad_hess: &mut [GradsTuple],
    ) {
        match *self {
            Objective::Squared => SquaredLoss.compute_gradients_into(predictions, targets, grad_hess),
            Objective::PseudoHuber { delta } => {
                PseudoHuberLoss::new(delta).compute_gradients_into(predictions, targets, grad_hess)
            }
        }
    }

    fn compute_base_score(&self, targets: ArrayView1<'_, f32>) -> f32 {
        match *self {
            Objective::Squared => SquaredLoss.compute_base_score(targets),
            Objective::PseudoHuber { delta } => PseudoHuberLoss::new(delta).compute_base_score(targets),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Objective::Squared => SquaredLoss.name(),
            Objective::PseudoHuber { .. } => "pseudo_huber",
        }
    }
}
