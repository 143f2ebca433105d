//! Growth strategies for tree building.
//!
//! - **Depth-wise** (XGBoost style): expand all nodes at each level before going deeper
//! - **Leaf-wise** (LightGBM style): always expand the leaf with highest gain

use serde::{Deserialize, Serialize};

/// Runtime-selectable growth strategy.
///
/// ```
/// use calboost::training::GrowthStrategy;
///
/// let strategy = GrowthStrategy::LeafWise { max_leaves: 31 };
/// assert_eq!(strategy.max_leaves(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrowthStrategy {
    /// Expand all nodes at each level.
    DepthWise {
        /// Maximum tree depth (root = depth 0).
        max_depth: u32,
    },
    /// Expand the best-gain leaf first.
    LeafWise {
        /// Maximum number of leaves.
        max_leaves: u32,
    },
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self::depth_wise()
    }
}

impl GrowthStrategy {
    /// Depth-wise with `max_depth = 6`.
    pub fn depth_wise() -> Self {
        Self::DepthWise { max_depth: 6 }
    }

    /// Leaf-wise with `max_leaves = 31`.
    pub fn leaf_wise() -> Self {
        Self::LeafWise { max_leaves: 31 }
    }

    /// Upper bound on the number of leaves a tree can have.
    pub fn max_leaves(&self) -> u32 {
        match *self {
            Self::DepthWise { max_depth } => 1u32.checked_shl(max_depth).unwrap_or(u32::MAX),
            Self::LeafWise { max_leaves } => max_leaves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_leaf_bounds() {
        assert_eq!(GrowthStrategy::default(), GrowthStrategy::DepthWise { max_depth: 6 });
        assert_eq!(GrowthStrategy::depth_wise().max_leaves(), 64);
        assert_eq!(GrowthStrategy::leaf_wise().max_leaves(), 31);
        assert_eq!(GrowthStrategy::DepthWise { max_depth: 40 }.max_leaves(), u32::MAX);
    }

    #[test]
    fn deserializes_from_toml() {
        let strategy: GrowthStrategy = toml::from_str("type = \"leaf_wise\"\nmax_leaves = 15").unwrap();
        assert_eq!(strategy, GrowthStrategy::LeafWise { max_leaves: 15 });
    }
}
