//! Gradient-boosted decision tree (GBDT) canonical representations.

pub mod forest;
pub mod mutable_tree;
pub mod node;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use mutable_tree::MutableTree;
pub use node::{NodeId, SampleAccessor, next_up_f32};
pub use tree::{Tree, TreeValidationError};
