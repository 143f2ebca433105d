//! Split gain, leaf weights, and best-split search over histograms.

use super::histogram::{FeatureHistogram, HistogramBin, NodeHistogram};
use crate::data::BinnedDataset;
use crate::utils::Parallelism;

/// Splits with gain at or below this are not worth making.
pub const MIN_SPLIT_GAIN: f32 = 1e-6;

// =============================================================================
// Gain Parameters
// =============================================================================

/// Parameters for split gain computation and leaf weight calculation.
#[derive(Clone, Debug)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f32,
    /// L1 regularization (alpha).
    pub reg_alpha: f32,
    /// Minimum split gain (gamma).
    pub min_gain: f32,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f32,
    /// Minimum samples per child.
    pub min_samples_leaf: u32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl GainParams {
    /// Soft-threshold a gradient sum by alpha.
    #[inline]
    fn threshold_l1(&self, grad: f64) -> f64 {
        let alpha = self.reg_alpha as f64;
        if grad > alpha {
            grad - alpha
        } else if grad < -alpha {
            grad + alpha
        } else {
            0.0
        }
    }

    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        let g = self.threshold_l1(grad);
        g * g / (hess + self.reg_lambda as f64)
    }

    /// Split gain, XGBoost formula:
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    ///
    /// With `alpha > 0` each `G` is soft-thresholded first.
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
        grad_parent: f64,
        hess_parent: f64,
    ) -> f32 {
        let gain = 0.5
            * (self.score(grad_left, hess_left) + self.score(grad_right, hess_right)
                - self.score(grad_parent, hess_parent))
            - self.min_gain as f64;
        gain as f32
    }

    /// Check if a split satisfies minimum child constraints.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64, count_left: u32, count_right: u32) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight
            && hess_right >= min_weight
            && count_left >= self.min_samples_leaf
            && count_right >= self.min_samples_leaf
    }

    /// Leaf weight with L1 and L2 regularization.
    ///
    /// ```text
    /// weight = -sign(G) × max(0, |G| - α) / (H + λ)
    /// ```
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-self.threshold_l1(grad_sum) / denom) as f32
    }
}

// =============================================================================
// SplitInfo
// =============================================================================

/// Gradient statistics of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub grad: f64,
    pub hess: f64,
    pub count: u32,
}

impl From<HistogramBin> for NodeStats {
    fn from(bin: HistogramBin) -> Self {
        Self {
            grad: bin.grad,
            hess: bin.hess,
            count: bin.count,
        }
    }
}

impl NodeStats {
    #[inline]
    fn minus(self, other: NodeStats) -> NodeStats {
        NodeStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count.saturating_sub(other.count),
        }
    }

    #[inline]
    fn plus(self, other: HistogramBin) -> NodeStats {
        NodeStats {
            grad: self.grad + other.grad,
            hess: self.hess + other.hess,
            count: self.count + other.count,
        }
    }
}

/// A numeric split: rows with `bin <= bin` go left, missing rows follow
/// `default_left`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    pub bin: u16,
    pub default_left: bool,
    pub gain: f32,
    pub left: NodeStats,
    pub right: NodeStats,
}

// =============================================================================
// Split Search
// =============================================================================

/// Best split of one feature, trying both directions for missing values.
fn best_feature_split(
    feature: usize,
    hist: &FeatureHistogram,
    parent: NodeStats,
    params: &GainParams,
) -> Option<SplitInfo> {
    let n_bins = hist.bins.len();
    let missing = hist.missing;
    let mut best: Option<SplitInfo> = None;

    let mut consider = |bin: usize, left: NodeStats, default_left: bool| {
        let right = parent.minus(left);
        if !params.is_valid_split(left.hess, right.hess, left.count, right.count) {
            return;
        }
        let gain = params.compute_gain(left.grad, left.hess, right.grad, right.hess, parent.grad, parent.hess);
        if gain > MIN_SPLIT_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
            best = Some(SplitInfo {
                feature: feature as u32,
                bin: bin as u16,
                default_left,
                gain,
                left,
                right,
            });
        }
    };

    let mut cum = NodeStats::default();
    for (bin, stats) in hist.bins.iter().enumerate() {
        cum = cum.plus(*stats);
        if bin + 1 < n_bins {
            // Missing right
            consider(bin, cum, false);
            if missing.count > 0 {
                consider(bin, cum.plus(missing), true);
            }
        } else if missing.count > 0 {
            // All present values left, missing right
            consider(bin, cum, false);
        }
    }

    best
}

/// Best split of a node over the candidate `features`.
///
/// Ties go to the lowest feature index, so the result does not depend on
/// parallel scheduling.
pub fn find_best_split(
    hist: &NodeHistogram,
    parent: NodeStats,
    features: &[usize],
    dataset: &BinnedDataset,
    params: &GainParams,
    parallelism: Parallelism,
) -> Option<SplitInfo> {
    let candidates = parallelism.maybe_par_map(features.to_vec(), |f| {
        if dataset.n_bins(f) <= 1 && !dataset.has_missing(f) {
            return None;
        }
        best_feature_split(f, hist.feature(f), parent, params)
    });

    candidates.into_iter().flatten().fold(None, |best: Option<SplitInfo>, s| match best {
        Some(b) if b.gain > s.gain || (b.gain == s.gain && b.feature <= s.feature) => Some(b),
        _ => Some(s),
    })
}
