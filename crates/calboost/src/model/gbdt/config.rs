//! High-level GBDT configuration with builder pattern.
//!
//! [`GBDTConfig`] composes nested parameter groups and uses the `bon` crate
//! for builder generation with validation at build time. Defaults match
//! XGBoost's regressor.
//!
//! # Example
//!
//! ```
//! use calboost::model::gbdt::{GBDTConfig, TreeParams, SamplingParams};
//! use calboost::training::Metric;
//!
//! // All defaults
//! let config = GBDTConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 100);
//!
//! // Customize hyperparameters
//! let config = GBDTConfig::builder()
//!     .metric(Metric::mae())
//!     .n_trees(200)
//!     .learning_rate(0.1)
//!     .tree(TreeParams::depth_wise(8))
//!     .sampling(SamplingParams { subsample: 0.8, ..Default::default() })
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use super::params::{ParamValidationError, RegularizationParams, SamplingParams, TreeParams};
use crate::data::binned::MAX_BINS_LIMIT;
use crate::training::gbdt::{GBDTParams, GainParams};
use crate::training::{Metric, Objective, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Learning rate must be positive.
    InvalidLearningRate(f32),
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Bin count must be in `[2, MAX_BINS_LIMIT]`.
    InvalidMaxBins(u32),
    /// Invalid sampling ratio (must be in (0, 1]).
    InvalidSamplingRatio { field: &'static str, value: f32 },
    /// Invalid regularization parameter.
    InvalidRegularization { field: &'static str, value: f32 },
    /// Invalid tree shape limit.
    InvalidTreeShape(ParamValidationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLearningRate(v) => {
                write!(f, "learning_rate must be positive, got {}", v)
            }
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxBins(v) => {
                write!(f, "max_bins must be in [2, {}], got {}", MAX_BINS_LIMIT, v)
            }
            Self::InvalidSamplingRatio { field, value } => {
                write!(f, "{} must be in (0, 1], got {}", field, value)
            }
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::InvalidTreeShape(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// GBDTConfig
// =============================================================================

/// High-level configuration for GBDT model training.
///
/// # Structure
///
/// - **Objective & Metric**: What to optimize and how to measure progress
/// - **Boosting**: `n_trees` and `learning_rate`
/// - **Tree**: Tree structure via [`TreeParams`]
/// - **Regularization**: Overfitting control via [`RegularizationParams`]
/// - **Sampling**: Data subsampling via [`SamplingParams`]
/// - **Early Stopping**: Automatic training termination
/// - **Resources**: Threading and binning
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct GBDTConfig {
    // === Objective & Metric ===
    /// Loss function for training. Default: squared error.
    #[builder(default)]
    pub objective: Objective,

    /// Evaluation metric. If `None`, no eval metrics are computed.
    pub metric: Option<Metric>,

    // === Boosting parameters ===
    /// Number of boosting rounds (trees to train). Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    // === Nested parameter groups ===
    #[builder(default)]
    pub tree: TreeParams,

    #[builder(default)]
    pub regularization: RegularizationParams,

    #[builder(default)]
    pub sampling: SamplingParams,

    // === Binning ===
    /// Maximum histogram bins per feature. Default: 256.
    #[builder(default = 256)]
    pub max_bins: u32,

    // === Early stopping ===
    /// Stop training if no improvement for this many rounds.
    /// `None` disables early stopping.
    pub early_stopping_rounds: Option<u32>,

    // === Resource control ===
    /// Thread count: 0 = all cores, 1 = sequential, n = exactly n. Default: 0.
    #[builder(default = 0)]
    pub n_threads: usize,

    // === Reproducibility ===
    /// Random seed for row and column sampling. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Logging ===
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: g_b_d_t_config_builder::IsComplete> GBDTConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `learning_rate <= 0`
    /// - `n_trees == 0`
    /// - `max_bins` outside `[2, 65534]`
    /// - Sampling ratios outside (0, 1]
    /// - Negative regularization parameters
    pub fn build(self) -> Result<GBDTConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GBDTConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_bins < 2 || self.max_bins > MAX_BINS_LIMIT {
            return Err(ConfigError::InvalidMaxBins(self.max_bins));
        }

        self.tree.validate().map_err(ConfigError::InvalidTreeShape)?;
        self.sampling.validate().map_err(Self::convert_param_error)?;
        self.regularization.validate().map_err(Self::convert_param_error)?;

        Ok(())
    }

    fn convert_param_error(e: ParamValidationError) -> ConfigError {
        match e {
            ParamValidationError::InvalidLambda(v) => ConfigError::InvalidRegularization {
                field: "lambda",
                value: v,
            },
            ParamValidationError::InvalidAlpha(v) => ConfigError::InvalidRegularization {
                field: "alpha",
                value: v,
            },
            ParamValidationError::InvalidMinChildWeight(v) => ConfigError::InvalidRegularization {
                field: "min_child_weight",
                value: v,
            },
            ParamValidationError::InvalidMinGain(v) => ConfigError::InvalidRegularization {
                field: "min_gain",
                value: v,
            },
            ParamValidationError::InvalidSubsample(v) => ConfigError::InvalidSamplingRatio {
                field: "subsample",
                value: v,
            },
            ParamValidationError::InvalidColsampleBytree(v) => ConfigError::InvalidSamplingRatio {
                field: "colsample_bytree",
                value: v,
            },
            e @ ParamValidationError::InvalidMaxLeaves(_) => ConfigError::InvalidTreeShape(e),
        }
    }

    /// Metric used during training; `Metric::None` when unset.
    pub fn training_metric(&self) -> Metric {
        self.metric.unwrap_or_default()
    }

    /// Convert to mid-level trainer parameters.
    pub fn to_trainer_params(&self) -> GBDTParams {
        let reg = &self.regularization;
        GBDTParams {
            n_trees: self.n_trees,
            learning_rate: self.learning_rate,
            growth_strategy: self.tree.growth_strategy,
            gain: GainParams {
                reg_lambda: reg.lambda,
                reg_alpha: reg.alpha,
                min_gain: reg.min_gain,
                min_child_weight: reg.min_child_weight,
                min_samples_leaf: reg.min_samples_leaf,
            },
            subsample: self.sampling.subsample,
            colsample_bytree: self.sampling.colsample_bytree,
            early_stopping_rounds: self.early_stopping_rounds.unwrap_or(0),
            verbosity: self.verbosity,
            seed: self.seed,
        }
    }
}

impl Default for GBDTConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::GrowthStrategy;

    #[test]
    fn test_default_config_matches_xgboost() {
        let config = GBDTConfig::builder().build().unwrap();
        assert_eq!(config.n_trees, 100);
        assert!((config.learning_rate - 0.3).abs() < 1e-6);
        assert_eq!(config.tree.max_depth(), Some(6));
        assert_eq!(config.regularization.lambda, 1.0);
        assert_eq!(config.max_bins, 256);
        assert_eq!(config.metric, None);
        assert_eq!(config.training_metric(), Metric::None);
    }

    #[test]
    fn test_invalid_learning_rate() {
        for lr in [0.0, -0.1, f32::NAN] {
            let result = GBDTConfig::builder().learning_rate(lr).build();
            assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
        }
        // > 1.0 is allowed (unusual but XGBoost permits it)
        assert!(GBDTConfig::builder().learning_rate(1.5).build().is_ok());
    }

    #[test]
    fn test_invalid_n_trees_zero() {
        let result = GBDTConfig::builder().n_trees(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidNTrees)));
    }

    #[test]
    fn test_invalid_max_bins() {
        assert_eq!(
            GBDTConfig::builder().max_bins(1).build().unwrap_err(),
            ConfigError::InvalidMaxBins(1)
        );
        assert!(GBDTConfig::builder().max_bins(MAX_BINS_LIMIT).build().is_ok());
    }

    #[test]
    fn test_invalid_subsample_zero() {
        let result = GBDTConfig::builder()
            .sampling(SamplingParams {
                subsample: 0.0,
                ..Default::default()
            })
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidSamplingRatio {
                field: "subsample",
                value: 0.0
            }
        );
    }

    #[test]
    fn test_invalid_regularization_message() {
        let err = GBDTConfig::builder()
            .regularization(RegularizationParams {
                alpha: -1.0,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "alpha must be non-negative, got -1");
    }

    #[test]
    fn test_to_trainer_params() {
        let config = GBDTConfig::builder()
            .n_trees(10)
            .learning_rate(0.1)
            .tree(TreeParams::leaf_wise(15))
            .early_stopping_rounds(5)
            .regularization(RegularizationParams {
                lambda: 2.0,
                ..Default::default()
            })
            .build()
            .unwrap();

        let params = config.to_trainer_params();
        assert_eq!(params.n_trees, 10);
        assert_eq!(params.growth_strategy, GrowthStrategy::LeafWise { max_leaves: 15 });
        assert_eq!(params.gain.reg_lambda, 2.0);
        assert_eq!(params.early_stopping_rounds, 5);
        assert_eq!(GBDTConfig::default().to_trainer_params().early_stopping_rounds, 0);
    }
}
