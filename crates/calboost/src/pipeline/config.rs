//! Run configuration, loadable from TOML.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! exercise_path = "data/exercise.csv"
//! calories_path = "data/calories.csv"
//! plot_dir = "figures"
//!
//! [model]
//! n_trees = 200
//! learning_rate = 0.1
//! metric = "mae"
//! early_stopping_rounds = 10
//!
//! [model.tree.growth_strategy]
//! type = "depth_wise"
//! max_depth = 4
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PipelineError;
use crate::model::gbdt::{ConfigError, GBDTConfig, RegularizationParams, SamplingParams, TreeParams};
use crate::training::{Metric, Objective, Verbosity};

// =============================================================================
// PipelineConfig
// =============================================================================

/// Inputs, split and output settings of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Exercise table (`User_ID, Gender, Age, ...`). Default: `exercise.csv`.
    pub exercise_path: PathBuf,
    /// Calories table (`User_ID, Calories`). Default: `calories.csv`.
    pub calories_path: PathBuf,
    /// Share of rows held out for testing. Default: 0.2.
    pub test_fraction: f64,
    /// Seed of the train/test shuffle. Default: 2.
    pub seed: u64,
    /// Where SVG figures are written. `None` keeps them in memory only.
    pub plot_dir: Option<PathBuf>,
    /// Rows shown by head and prediction previews. Default: 5.
    pub preview_rows: usize,
    /// Regressor hyperparameters.
    pub model: ModelSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            exercise_path: PathBuf::from("exercise.csv"),
            calories_path: PathBuf::from("calories.csv"),
            test_fraction: 0.2,
            seed: 2,
            plot_dir: None,
            preview_rows: 5,
            model: ModelSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

// =============================================================================
// ModelSettings
// =============================================================================

/// Serializable mirror of [`GBDTConfig`].
///
/// Defaults match an untuned XGBoost regressor. Monitoring is off unless a
/// metric is set; early stopping additionally needs `early_stopping_rounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettings {
    pub objective: Objective,
    pub metric: Option<Metric>,
    pub n_trees: u32,
    pub learning_rate: f32,
    pub tree: TreeParams,
    pub regularization: RegularizationParams,
    pub sampling: SamplingParams,
    pub max_bins: u32,
    pub early_stopping_rounds: Option<u32>,
    pub n_threads: usize,
    pub seed: u64,
    pub verbosity: Verbosity,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            metric: None,
            n_trees: 100,
            learning_rate: 0.3,
            tree: TreeParams::default(),
            regularization: RegularizationParams::default(),
            sampling: SamplingParams::default(),
            max_bins: 256,
            early_stopping_rounds: None,
            n_threads: 0,
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

impl ModelSettings {
    /// Build and validate the training config.
    pub fn to_gbdt_config(&self) -> Result<GBDTConfig, ConfigError> {
        GBDTConfig::builder()
            .objective(self.objective)
            .maybe_metric(self.metric)
            .n_trees(self.n_trees)
            .learning_rate(self.learning_rate)
            .tree(self.tree.clone())
            .regularization(self.regularization.clone())
            .sampling(self.sampling.clone())
            .max_bins(self.max_bins)
            .maybe_early_stopping_rounds(self.early_stopping_rounds)
            .n_threads(self.n_threads)
            .seed(self.seed)
            .verbosity(self.verbosity)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::GrowthStrategy;

    #[test]
    fn defaults_match_reference_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.exercise_path, PathBuf::from("exercise.csv"));
        assert_eq!(config.calories_path, PathBuf::from("calories.csv"));
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 2);
        assert_eq!(config.plot_dir, None);

        let gbdt = config.model.to_gbdt_config().unwrap();
        assert_eq!(gbdt.n_trees, 100);
        assert_eq!(gbdt.tree.max_depth(), Some(6));
        assert_eq!(gbdt.metric, None);
        assert_eq!(gbdt.early_stopping_rounds, None);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn parses_partial_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            exercise_path = "data/exercise.csv"
            plot_dir = "figures"

            [model]
            n_trees = 20
            metric = "mae"
            early_stopping_rounds = 5

            [model.tree.growth_strategy]
            type = "leaf_wise"
            max_leaves = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.exercise_path, PathBuf::from("data/exercise.csv"));
        assert_eq!(config.calories_path, PathBuf::from("calories.csv"));
        assert_eq!(config.plot_dir, Some(PathBuf::from("figures")));

        let gbdt = config.model.to_gbdt_config().unwrap();
        assert_eq!(gbdt.n_trees, 20);
        assert_eq!(gbdt.metric, Some(Metric::Mae));
        assert_eq!(gbdt.early_stopping_rounds, Some(5));
        assert_eq!(gbdt.tree.growth_strategy, GrowthStrategy::LeafWise { max_leaves: 15 });
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PipelineConfig::from_toml_str("test_size = 0.3").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn invalid_hyperparameters_fail_validation() {
        let config = PipelineConfig::from_toml_str("[model]\nlearning_rate = 0.0").unwrap();
        assert!(matches!(
            config.model.to_gbdt_config(),
            Err(ConfigError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "seed = 7").unwrap();
        assert_eq!(PipelineConfig::from_toml_file(&path).unwrap().seed, 7);

        let missing = PipelineConfig::from_toml_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, PipelineError::ReadConfig { .. }));
    }
}
