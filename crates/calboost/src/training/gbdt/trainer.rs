//! GBDT Trainer for gradient boosting.
//!
//! Runs the boosting loop: gradients from the objective, one tree per round,
//! incremental prediction updates for the training and eval sets, metric
//! logging and early stopping.
//!
//! # Example
//!
//! ```ignore
//! use calboost::training::{GBDTTrainer, GBDTParams, SquaredLoss, Rmse, GainParams};
//!
//! let params = GBDTParams {
//!     n_trees: 100,
//!     learning_rate: 0.1,
//!     gain: GainParams { reg_lambda: 1.0, ..Default::default() },
//!     ..Default::default()
//! };
//!
//! let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
//! let output = trainer.train(&binned, targets.view(), &[], Parallelism::Sequential)?;
//! ```

use ndarray::{Array1, ArrayView1};

use crate::data::BinnedDataset;
use crate::repr::gbdt::Forest;
use crate::training::Gradients;
use crate::training::callback::{EarlyStopAction, EarlyStopping};
use crate::training::eval::{EvalSet, Evaluator, MetricValue};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::metrics::MetricFn;
use crate::training::objectives::ObjectiveFn;
use crate::training::sampling::{ColSampler, RowSampler};
use crate::utils::Parallelism;

use super::expansion::GrowthStrategy;
use super::grower::{GrowerParams, TreeGrower};
use super::split::GainParams;

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
///
/// Use struct construction with `..Default::default()` for convenient configuration.
#[derive(Clone, Debug)]
pub struct GBDTParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (trees to train).
    pub n_trees: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,

    // --- Tree structure ---
    pub growth_strategy: GrowthStrategy,

    // --- Regularization ---
    pub gain: GainParams,

    // --- Sampling ---
    /// Fraction of rows used per tree.
    pub subsample: f32,
    /// Fraction of features used per tree.
    pub colsample_bytree: f32,

    // --- Early stopping ---
    /// Stop after this many rounds without improvement. 0 disables.
    pub early_stopping_rounds: u32,

    // --- Logging ---
    pub verbosity: Verbosity,

    // --- Reproducibility ---
    pub seed: u64,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.3,
            growth_strategy: GrowthStrategy::default(),
            gain: GainParams::default(),
            subsample: 1.0,
            colsample_bytree: 1.0,
            early_stopping_rounds: 0,
            verbosity: Verbosity::default(),
            seed: 42,
        }
    }
}

impl GBDTParams {
    fn to_grower_params(&self) -> GrowerParams {
        GrowerParams {
            gain: self.gain.clone(),
            learning_rate: self.learning_rate,
            growth_strategy: self.growth_strategy,
        }
    }
}

// =============================================================================
// Errors and output
// =============================================================================

/// Inputs the trainer cannot learn from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("expected {expected} targets, got {got}")]
    TargetLenMismatch { expected: usize, got: usize },

    #[error("training set is empty")]
    Empty,

    #[error("target at row {row} is not finite")]
    NonFiniteTarget { row: usize },

    #[error("eval set {name:?} has {got} features, training data has {expected}")]
    EvalFeatureMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// A trained forest plus what happened during training.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub forest: Forest,
    /// Round (0-based) with the best monitored metric, when early stopping ran.
    pub best_iteration: Option<usize>,
    /// Per-round metrics: train first, then each eval set.
    pub history: Vec<Vec<MetricValue>>,
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// GBDT Trainer.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Train a forest.
    ///
    /// Thread pool setup is the caller's job; `parallelism` only says whether
    /// rayon iterators may be used.
    pub fn train(
        &self,
        dataset: &BinnedDataset,
        targets: ArrayView1<'_, f32>,
        eval_sets: &[EvalSet<'_>],
        parallelism: Parallelism,
    ) -> Result<TrainOutput, TrainError> {
        let n_rows = dataset.n_samples();
        if targets.len() != n_rows {
            return Err(TrainError::TargetLenMismatch {
                expected: n_rows,
                got: targets.len(),
            });
        }
        if n_rows == 0 {
            return Err(TrainError::Empty);
        }
        if let Some(row) = targets.iter().position(|y| !y.is_finite()) {
            return Err(TrainError::NonFiniteTarget { row });
        }
        for set in eval_sets {
            if set.dataset.n_features() != dataset.n_features() {
                return Err(TrainError::EvalFeatureMismatch {
                    name: set.name.to_string(),
                    expected: dataset.n_features(),
                    got: set.dataset.n_features(),
                });
            }
        }

        let mut grower = TreeGrower::new(dataset, self.params.to_grower_params());
        let mut row_sampler = RowSampler::new(self.params.subsample, self.params.seed);
        let mut col_sampler = ColSampler::new(self.params.colsample_bytree, self.params.seed.wrapping_add(1));
        let mut gradients = Gradients::new(n_rows);

        let base_score = self.objective.compute_base_score(targets);
        let mut predictions = Array1::from_elem(n_rows, base_score);
        let mut forest = Forest::new(base_score);

        let mut eval_predictions: Vec<Vec<f32>> = eval_sets
            .iter()
            .map(|set| vec![base_score; set.dataset.n_samples()])
            .collect();

        let mut early_stopping =
            EarlyStopping::new(self.params.early_stopping_rounds as usize, self.metric.higher_is_better());
        let mut best_n_trees = 0usize;

        let evaluator = Evaluator::new(&self.metric);
        let mut history = Vec::new();

        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(self.params.n_trees as usize, n_rows, dataset.n_features());
        if early_stopping.is_enabled() && !evaluator.is_enabled() {
            logger.log_warning("early stopping requested without a metric; training all rounds");
        }

        for round in 0..self.params.n_trees as usize {
            self.objective
                .compute_gradients_into(predictions.view(), targets, gradients.pairs_mut());
            row_sampler.sample(gradients.pairs_mut());
            let features = col_sampler.sample(dataset.n_features());

            let tree = grower.grow(dataset, &gradients, &features, parallelism);
            logger.log_tree(round, tree.n_leaves(), tree.depth());

            if let Some(slice) = predictions.as_slice_mut() {
                grower.update_predictions_from_last_tree(slice);
            }
            for (set, preds) in eval_sets.iter().zip(eval_predictions.iter_mut()) {
                let contributions = parallelism.maybe_par_map(0..set.dataset.n_samples(), |row| {
                    tree.predict_row(&set.dataset.features().row(row))
                });
                for (p, c) in preds.iter_mut().zip(contributions) {
                    *p += c;
                }
            }
            forest.push_tree(tree);

            if !evaluator.is_enabled() {
                continue;
            }
            let round_metrics = evaluator.evaluate_round(predictions.view(), targets, eval_sets, &eval_predictions);
            logger.log_metrics(round, &round_metrics);
            let monitored = Evaluator::<M>::early_stop_value(&round_metrics);
            history.push(round_metrics);

            if early_stopping.is_enabled() {
                match early_stopping.update(monitored) {
                    EarlyStopAction::Improved => best_n_trees = forest.n_trees(),
                    EarlyStopAction::Stop => {
                        logger.log_early_stopping(round, early_stopping.best_round(), self.metric.name());
                        break;
                    }
                    EarlyStopAction::Continue => {}
                }
            }
        }

        let early_stopped = early_stopping.is_enabled() && early_stopping.best_value().is_some();
        if early_stopped && best_n_trees < forest.n_trees() {
            forest.truncate(best_n_trees);
        }
        logger.finish_training(forest.n_trees());

        Ok(TrainOutput {
            forest,
            best_iteration: early_stopped.then(|| early_stopping.best_round()),
            history,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::training::metrics::{Mae, Metric, Rmse};
    use crate::training::objectives::SquaredLoss;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    fn make_test_data() -> (Array2<f32>, Array1<f32>) {
        let features = array![
            [0.0f32, 1.0],
            [1.0, 2.0],
            [2.0, 0.0],
            [3.0, 1.0],
            [0.0, 2.0],
            [1.0, 0.0],
            [2.0, 1.0],
            [3.0, 2.0],
        ];
        let targets = array![1.0f32, 2.0, 3.0, 4.0, 1.5, 2.5, 3.5, 4.5];
        (features, targets)
    }

    fn binned(features: &Array2<f32>) -> BinnedDataset {
        BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential)
    }

    #[test]
    fn test_params_default() {
        let params = GBDTParams::default();

        assert_eq!(params.n_trees, 100);
        assert!((params.learning_rate - 0.3).abs() < 1e-6);
        assert_eq!(params.growth_strategy, GrowthStrategy::DepthWise { max_depth: 6 });
        assert!((params.gain.reg_lambda - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_train_single_tree() {
        let (features, targets) = make_test_data();
        let params = GBDTParams {
            n_trees: 1,
            ..Default::default()
        };

        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
        let output = trainer
            .train(&binned(&features), targets.view(), &[], Parallelism::Sequential)
            .unwrap();

        assert_eq!(output.forest.n_trees(), 1);
        assert_abs_diff_eq!(output.forest.base_score(), 2.75, epsilon = 1e-6);
        assert_eq!(output.history.len(), 1);
        assert_eq!(output.best_iteration, None);
    }

    #[test]
    fn test_training_reduces_error() {
        let (features, targets) = make_test_data();
        let params = GBDTParams {
            n_trees: 20,
            learning_rate: 0.3,
            gain: GainParams {
                min_child_weight: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let trainer = GBDTTrainer::new(SquaredLoss, Mae, params);
        let output = trainer
            .train(&binned(&features), targets.view(), &[], Parallelism::Sequential)
            .unwrap();

        let first = output.history.first().unwrap()[0].value;
        let last = output.history.last().unwrap()[0].value;
        assert!(last < first);
        assert!(last < 0.1);
    }

    #[test]
    fn incremental_eval_predictions_match_forest() {
        let (features, targets) = make_test_data();
        let eval = Dataset::unnamed(features.clone(), targets.clone()).unwrap();
        let params = GBDTParams {
            n_trees: 5,
            ..Default::default()
        };

        let trainer = GBDTTrainer::new(SquaredLoss, Mae, params);
        let output = trainer
            .train(
                &binned(&features),
                targets.view(),
                &[EvalSet::new("valid", &eval)],
                Parallelism::Parallel,
            )
            .unwrap();

        let preds = output.forest.predict(features.view(), Parallelism::Sequential);
        let expected = Mae.compute(preds.view(), targets.view());
        let last = output.history.last().unwrap();
        assert_eq!(last[1].name, "valid-mae");
        assert_abs_diff_eq!(last[1].value, expected, epsilon = 1e-5);
        // Train and eval sets hold the same rows
        assert_abs_diff_eq!(last[0].value, last[1].value, epsilon = 1e-5);
    }

    #[test]
    fn early_stopping_truncates_forest() {
        let (features, targets) = make_test_data();
        // Eval targets equal the base score, so every tree moves predictions away
        let eval = Dataset::unnamed(features.clone(), Array1::from_elem(8, 2.75)).unwrap();
        let params = GBDTParams {
            n_trees: 50,
            early_stopping_rounds: 3,
            ..Default::default()
        };

        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
        let output = trainer
            .train(
                &binned(&features),
                targets.view(),
                &[EvalSet::new("valid", &eval)],
                Parallelism::Sequential,
            )
            .unwrap();

        let best = output.best_iteration.unwrap();
        assert_eq!(output.forest.n_trees(), best + 1);
        assert!(output.forest.n_trees() < 50);
        assert_eq!(output.history.len(), best + 1 + 3);
    }

    #[test]
    fn disabled_metric_skips_evaluation() {
        let (features, targets) = make_test_data();
        let params = GBDTParams {
            n_trees: 3,
            early_stopping_rounds: 2,
            ..Default::default()
        };
        let trainer = GBDTTrainer::new(SquaredLoss, Metric::None, params);
        let output = trainer
            .train(&binned(&features), targets.view(), &[], Parallelism::Sequential)
            .unwrap();
        assert_eq!(output.forest.n_trees(), 3);
        assert!(output.history.is_empty());
        assert_eq!(output.best_iteration, None);
    }

    #[test]
    fn sampling_is_reproducible() {
        let features = Array2::from_shape_fn((64, 3), |(i, j)| ((i * (j + 2)) % 17) as f32);
        let targets = Array1::from_shape_fn(64, |i| (i % 9) as f32);
        let params = GBDTParams {
            n_trees: 5,
            subsample: 0.5,
            colsample_bytree: 0.67,
            seed: 11,
            ..Default::default()
        };
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
        let dataset = binned(&features);
        let a = trainer.train(&dataset, targets.view(), &[], Parallelism::Sequential).unwrap();
        let b = trainer.train(&dataset, targets.view(), &[], Parallelism::Parallel).unwrap();

        let pa = a.forest.predict(features.view(), Parallelism::Sequential);
        let pb = b.forest.predict(features.view(), Parallelism::Sequential);
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_train_invalid_targets() {
        let (features, _) = make_test_data();
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, GBDTParams::default());
        let dataset = binned(&features);

        let short = array![1.0f32, 2.0];
        assert_eq!(
            trainer.train(&dataset, short.view(), &[], Parallelism::Sequential).unwrap_err(),
            TrainError::TargetLenMismatch { expected: 8, got: 2 }
        );

        let mut bad = Array1::<f32>::zeros(8);
        bad[3] = f32::NAN;
        assert_eq!(
            trainer.train(&dataset, bad.view(), &[], Parallelism::Sequential).unwrap_err(),
            TrainError::NonFiniteTarget { row: 3 }
        );
    }
}
