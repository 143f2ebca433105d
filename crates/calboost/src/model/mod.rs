//! High-level model wrappers.
//!
//! - [`GBDTModel`]: Tree ensemble model (GBDT/GBRT)
//! - [`ModelMeta`]: Model metadata
//!
//! # Example
//!
//! ```ignore
//! use calboost::model::GBDTModel;
//! use calboost::model::gbdt::GBDTConfig;
//! use calboost::training::Metric;
//!
//! let config = GBDTConfig::builder()
//!     .metric(Metric::mae())
//!     .n_trees(50)
//!     .learning_rate(0.1)
//!     .build()?;
//! let model = GBDTModel::train(&train, &[], config)?;
//! let predictions = model.predict(test.features())?;
//! ```

mod meta;
pub mod gbdt;

pub use gbdt::{GBDTModel, ModelError};
pub use meta::ModelMeta;
