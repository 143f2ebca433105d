//! GBDT model implementation.
//!
//! High-level wrapper around [`Forest`] with training and prediction.
//! Access components via [`forest()`](GBDTModel::forest), [`meta()`](GBDTModel::meta),
//! and [`config()`](GBDTModel::config).

use ndarray::{Array1, ArrayView2};

use super::GBDTConfig;
use crate::data::{BinnedDataset, Dataset};
use crate::model::meta::ModelMeta;
use crate::repr::gbdt::Forest;
use crate::training::gbdt::{GBDTTrainer, TrainError};
use crate::training::{EvalSet, MetricValue};
use crate::utils::{Parallelism, run_with_threads};

/// Errors from model training or prediction.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    #[error("model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}

/// High-level GBDT regression model.
///
/// Access components via [`forest()`](Self::forest), [`meta()`](Self::meta),
/// and [`config()`](Self::config).
pub struct GBDTModel {
    /// The underlying forest.
    forest: Forest,
    /// Model metadata.
    meta: ModelMeta,
    /// Training configuration.
    config: GBDTConfig,
    /// Per-round metrics recorded while training (empty without a metric).
    history: Vec<Vec<MetricValue>>,
}

impl GBDTModel {
    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }

    /// Metrics per round: the training set first, then each eval set.
    pub fn history(&self) -> &[Vec<MetricValue>] {
        &self.history
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a new GBDT model.
    ///
    /// Features are binned with `config.max_bins`, then boosted for
    /// `config.n_trees` rounds (fewer with early stopping). Eval sets are
    /// only scored when `config.metric` is set.
    ///
    /// Runs on a thread pool sized by `config.n_threads`.
    pub fn train(
        dataset: &Dataset,
        eval_sets: &[EvalSet<'_>],
        config: GBDTConfig,
    ) -> Result<Self, ModelError> {
        run_with_threads(config.n_threads, |parallelism| {
            Self::train_inner(dataset, eval_sets, config, parallelism)
        })
    }

    /// Training without thread pool management.
    fn train_inner(
        dataset: &Dataset,
        eval_sets: &[EvalSet<'_>],
        config: GBDTConfig,
        parallelism: Parallelism,
    ) -> Result<Self, ModelError> {
        let binned = BinnedDataset::from_features(dataset.features(), config.max_bins, parallelism);
        tracing::debug!(
            n_samples = binned.n_samples(),
            n_features = binned.n_features(),
            max_bins = config.max_bins,
            "binned training features"
        );

        let trainer = GBDTTrainer::new(config.objective, config.training_metric(), config.to_trainer_params());
        let output = trainer.train(&binned, dataset.targets(), eval_sets, parallelism)?;

        let meta = ModelMeta {
            feature_names: Some(dataset.feature_names().to_vec()),
            n_features: dataset.n_features(),
            n_trees: output.forest.n_trees(),
            base_score: output.forest.base_score(),
            best_iteration: output.best_iteration,
        };

        Ok(Self {
            forest: output.forest,
            meta,
            config,
            history: output.history,
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict one value per row of a sample-major feature matrix.
    ///
    /// Missing values (NaN) follow each split's learned default direction.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Array1<f32>, ModelError> {
        if features.ncols() != self.meta.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.meta.n_features,
                got: features.ncols(),
            });
        }
        if features.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }
        Ok(run_with_threads(self.config.n_threads, |parallelism| {
            self.forest.predict(features, parallelism)
        }))
    }
}

impl std::fmt::Debug for GBDTModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GBDTModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.meta.n_features)
            .field("base_score", &self.meta.base_score)
            .field("best_iteration", &self.meta.best_iteration)
            .finish()
    }
}
