//! Gradient Boosted Decision Tree (GBDT) training module.
//!
//! - [`expansion`] - Growth strategies (depth-wise, leaf-wise)
//! - [`grower`] - Main tree growing orchestration
//! - [`histogram`] - Histogram data structures for gradient accumulation
//! - [`partition`] - Row index partitioning for tree nodes
//! - [`split`] - Gain computation and split finding
//! - [`trainer`] - GBDT training loop

pub mod expansion;
pub mod grower;
pub mod histogram;
pub mod partition;
pub mod split;
pub mod trainer;

// Re-export main types
pub use expansion::GrowthStrategy;
pub use grower::{GrowerParams, TreeGrower};
pub use histogram::{FeatureHistogram, HistogramBin, NodeHistogram};
pub use partition::{LeafId, RowPartitioner};
pub use split::{GainParams, NodeStats, SplitInfo, find_best_split};
pub use trainer::{GBDTParams, GBDTTrainer, TrainError, TrainOutput};
