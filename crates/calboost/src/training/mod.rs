//! Training infrastructure for gradient boosting.
//!
//! - [`Gradients`]: Per-sample gradient and hessian buffer
//! - [`ObjectiveFn`]: Trait for computing gradients from predictions and targets
//! - [`MetricFn`]: Trait for evaluating model quality
//! - [`EarlyStopping`]: Stops training when the monitored metric plateaus
//! - [`TrainingLogger`]: Structured logging with verbosity levels
//! - [`gbdt`]: Histogram-based tree growing and the boosting loop
//!
//! ## Objectives
//!
//! - [`SquaredLoss`]: Squared error for regression
//! - [`PseudoHuberLoss`]: Robust regression
//!
//! ## Metrics
//!
//! - [`Rmse`]: Root mean squared error
//! - [`Mae`]: Mean absolute error
//! - [`RSquared`]: Coefficient of determination

pub mod callback;
pub mod eval;
pub mod gbdt;
pub mod gradients;
pub mod logger;
pub mod metrics;
pub mod objectives;
pub mod sampling;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use eval::{EvalSet, Evaluator, MetricValue};
pub use gbdt::{GBDTParams, GBDTTrainer, GainParams, GrowthStrategy, TrainError, TrainOutput};
pub use gradients::{Gradients, GradsTuple};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{Mae, Metric, MetricFn, RSquared, Rmse};
pub use objectives::{Objective, ObjectiveFn, PseudoHuberLoss, SquaredLoss};
pub use sampling::{ColSampler, RowSampler};
