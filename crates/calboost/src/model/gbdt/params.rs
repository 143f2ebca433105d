//! Nested parameter groups for GBDT configuration.
//!
//! - [`TreeParams`]: Tree structure (max_depth, max_leaves, growth strategy)
//! - [`RegularizationParams`]: L1/L2 regularization and split constraints
//! - [`SamplingParams`]: Row and column subsampling rates
//!
//! Each group has XGBoost-compatible defaults, a validation method, and
//! deserializes from a partial TOML table.

use serde::{Deserialize, Serialize};

use crate::training::GrowthStrategy;

// =============================================================================
// TreeParams
// =============================================================================

/// Tree structure parameters.
///
/// # Example
///
/// ```
/// use calboost::model::gbdt::TreeParams;
///
/// // Depth-limited trees (XGBoost style)
/// let params = TreeParams::depth_wise(8);
/// assert_eq!(params.max_depth(), Some(8));
///
/// // Leaf-limited trees (LightGBM style)
/// let params = TreeParams::leaf_wise(63);
/// assert_eq!(params.max_leaves(), Some(63));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Tree growth strategy (depth-wise or leaf-wise with size limits).
    pub growth_strategy: GrowthStrategy,
}

impl TreeParams {
    pub fn depth_wise(max_depth: u32) -> Self {
        Self {
            growth_strategy: GrowthStrategy::DepthWise { max_depth },
        }
    }

    pub fn leaf_wise(max_leaves: u32) -> Self {
        Self {
            growth_strategy: GrowthStrategy::LeafWise { max_leaves },
        }
    }

    /// Maximum depth, if using depth-wise growth.
    pub fn max_depth(&self) -> Option<u32> {
        match self.growth_strategy {
            GrowthStrategy::DepthWise { max_depth } => Some(max_depth),
            GrowthStrategy::LeafWise { .. } => None,
        }
    }

    /// Maximum leaves, if using leaf-wise growth.
    pub fn max_leaves(&self) -> Option<u32> {
        match self.growth_strategy {
            GrowthStrategy::DepthWise { .. } => None,
            GrowthStrategy::LeafWise { max_leaves } => Some(max_leaves),
        }
    }

    pub fn validate(&self) -> Result<(), ParamValidationError> {
        match self.growth_strategy {
            GrowthStrategy::LeafWise { max_leaves } if max_leaves < 1 => {
                Err(ParamValidationError::InvalidMaxLeaves(max_leaves))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// RegularizationParams
// =============================================================================

/// Regularization parameters.
///
/// Controls L1/L2 regularization and split constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularizationParams {
    /// L2 regularization term on leaf weights. Default: 1.0.
    pub lambda: f32,

    /// L1 regularization term on leaf weights. Default: 0.0.
    pub alpha: f32,

    /// Minimum sum of hessians required in a leaf. Default: 1.0.
    pub min_child_weight: f32,

    /// Minimum gain required to make a split (gamma). Default: 0.0.
    pub min_gain: f32,

    /// Minimum number of samples required in a leaf. Default: 1.
    pub min_samples_leaf: u32,
}

impl Default for RegularizationParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            alpha: 0.0,
            min_child_weight: 1.0,
            min_gain: 0.0,
            min_samples_leaf: 1,
        }
    }
}

impl RegularizationParams {
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if !non_negative(self.lambda) {
            return Err(ParamValidationError::InvalidLambda(self.lambda));
        }
        if !non_negative(self.alpha) {
            return Err(ParamValidationError::InvalidAlpha(self.alpha));
        }
        if !non_negative(self.min_child_weight) {
            return Err(ParamValidationError::InvalidMinChildWeight(self.min_child_weight));
        }
        if !non_negative(self.min_gain) {
            return Err(ParamValidationError::InvalidMinGain(self.min_gain));
        }
        Ok(())
    }
}

// =============================================================================
// SamplingParams
// =============================================================================

/// Row and column subsampling. A rate of 1.0 means no sampling.
///
/// ```
/// use calboost::model::gbdt::SamplingParams;
///
/// let params = SamplingParams { subsample: 0.8, colsample_bytree: 0.8 };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Row subsampling ratio per tree. Default: 1.0.
    pub subsample: f32,

    /// Column subsampling ratio per tree. Default: 1.0.
    pub colsample_bytree: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            subsample: 1.0,
            colsample_bytree: 1.0,
        }
    }
}

impl SamplingParams {
    /// Every rate must be in (0, 1].
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if !unit_rate(self.subsample) {
            return Err(ParamValidationError::InvalidSubsample(self.subsample));
        }
        if !unit_rate(self.colsample_bytree) {
            return Err(ParamValidationError::InvalidColsampleBytree(self.colsample_bytree));
        }
        Ok(())
    }

    pub fn has_row_sampling(&self) -> bool {
        self.subsample < 1.0
    }

    pub fn has_col_sampling(&self) -> bool {
        self.colsample_bytree < 1.0
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// NaN fails both checks.
fn non_negative(value: f32) -> bool {
    value >= 0.0
}

fn unit_rate(value: f32) -> bool {
    value > 0.0 && value <= 1.0
}

/// Parameter validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamValidationError {
    #[error("lambda must be >= 0, got {0}")]
    InvalidLambda(f32),

    #[error("alpha must be >= 0, got {0}")]
    InvalidAlpha(f32),

    #[error("min_child_weight must be >= 0, got {0}")]
    InvalidMinChildWeight(f32),

    #[error("min_gain must be >= 0, got {0}")]
    InvalidMinGain(f32),

    #[error("subsample must be in (0, 1], got {0}")]
    InvalidSubsample(f32),

    #[error("colsample_bytree must be in (0, 1], got {0}")]
    InvalidColsampleBytree(f32),

    #[error("max_leaves must be >= 1, got {0}")]
    InvalidMaxLeaves(u32),
}

// =============================================================================
// Tests
// =============================================================================
