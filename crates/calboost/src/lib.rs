//! calboost: calories-burnt prediction with gradient boosted trees.
//!
//! Loads exercise and calories tables, explores them, and fits a
//! histogram-based gradient boosted regressor with XGBoost-style defaults.
//!
//! # Key Types
//!
//! - [`CaloriesTable`] - Combined exercise + calories table
//! - [`Dataset`] - Feature matrix and target vector
//! - [`GBDTModel`] / [`GBDTConfig`] - Model training and prediction
//! - [`Objective`] / [`Metric`] - Training objectives and evaluation metrics
//! - [`PipelineConfig`] / [`RunReport`] - The end-to-end run
//!
//! # Running the pipeline
//!
//! ```ignore
//! use calboost::pipeline::{self, PipelineConfig};
//!
//! let report = pipeline::run(&PipelineConfig::default())?;
//! println!("Mean Absolute Error =  {}", report.mae);
//! ```

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod analysis;
pub mod data;
pub mod model;
pub mod pipeline;
pub mod plot;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{GBDTModel, ModelMeta};

// Configuration types
pub use model::gbdt::GBDTConfig;

// Training types (objectives, metrics)
pub use training::{Metric, MetricFn, Objective, ObjectiveFn};

// Data types
pub use data::{CaloriesTable, DataError, Dataset, Gender};

// Pipeline
pub use pipeline::{PipelineConfig, PipelineError, RunReport};

// Shared utilities
pub use utils::{Parallelism, run_with_threads};
