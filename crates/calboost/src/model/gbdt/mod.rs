//! GBDT model and configuration.
//!
//! Configuration is organized into semantic groups:
//! - [`TreeParams`]: Tree structure (growth strategy, max depth/leaves)
//! - [`RegularizationParams`]: L1/L2 regularization and split constraints
//! - [`SamplingParams`]: Row and column subsampling
//!
//! [`GBDTConfig`] composes them with the boosting parameters.

mod config;
mod model;
mod params;

pub use config::{ConfigError, GBDTConfig};
pub use model::{GBDTModel, ModelError};
pub use params::{ParamValidationError, RegularizationParams, SamplingParams, TreeParams};
