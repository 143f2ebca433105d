//! Tree grower for gradient boosting.
//!
//! Orchestrates tree training using histogram-based split finding, row partitioning,
//! and the subtraction trick to reduce computation.

use crate::data::BinnedDataset;
use crate::repr::gbdt::{MutableTree, NodeId, Tree};
use crate::training::Gradients;
use crate::utils::Parallelism;

use super::expansion::GrowthStrategy;
use super::histogram::NodeHistogram;
use super::partition::{LeafId, RowPartitioner};
use super::split::{GainParams, NodeStats, SplitInfo, find_best_split};

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    /// Gain computation and constraint parameters.
    pub gain: GainParams,
    /// Learning rate.
    pub learning_rate: f32,
    /// Tree growth strategy (includes depth/leaf limits).
    pub growth_strategy: GrowthStrategy,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.3,
            growth_strategy: GrowthStrategy::default(),
        }
    }
}

/// A node waiting to be expanded or finalized.
struct NodeCandidate {
    leaf: LeafId,
    tree_node: NodeId,
    depth: u32,
    stats: NodeStats,
    split: Option<SplitInfo>,
    histogram: NodeHistogram,
}

impl NodeCandidate {
    fn gain(&self) -> f32 {
        self.split.as_ref().map_or(f32::NEG_INFINITY, |s| s.gain)
    }
}

/// Grows one regression tree per call from a gradient vector.
pub struct TreeGrower {
    params: GrowerParams,
    partitioner: RowPartitioner,
    tree_builder: MutableTree,
    /// Leaf values (scaled by learning rate) of the last grown tree,
    /// indexed by partitioner leaf id.
    last_leaf_values: Vec<f32>,
}

impl TreeGrower {
    pub fn new(dataset: &BinnedDataset, params: GrowerParams) -> Self {
        Self {
            params,
            partitioner: RowPartitioner::new(dataset.n_samples()),
            tree_builder: MutableTree::new(),
            last_leaf_values: Vec::new(),
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow a tree over `features` (the candidate columns for this tree).
    pub fn grow(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[usize],
        parallelism: Parallelism,
    ) -> Tree {
        let n_samples = dataset.n_samples();
        debug_assert_eq!(gradients.n_samples(), n_samples);

        self.partitioner.reset(n_samples);
        self.last_leaf_values.clear();
        let root_node = self.tree_builder.init_root();

        let rows = self.partitioner.leaf_indices(0);
        let (grad, hess) = gradients.sum_rows(rows);
        let histogram = NodeHistogram::build(dataset, gradients, rows, parallelism);
        let root = self.candidate(
            0,
            root_node,
            0,
            NodeStats {
                grad,
                hess,
                count: n_samples as u32,
            },
            histogram,
            dataset,
            features,
            parallelism,
        );

        match self.params.growth_strategy {
            GrowthStrategy::DepthWise { .. } => {
                self.grow_depth_wise(root, dataset, gradients, features, parallelism)
            }
            GrowthStrategy::LeafWise { max_leaves } => {
                self.grow_leaf_wise(root, max_leaves, dataset, gradients, features, parallelism)
            }
        }

        self.tree_builder.scale_leaves(self.params.learning_rate);
        std::mem::take(&mut self.tree_builder).freeze()
    }

    /// Add the last grown tree's leaf values to `predictions`.
    ///
    /// Every row stays in the partition (unsampled rows only have zeroed
    /// gradients), so the final leaf ranges cover all rows.
    pub fn update_predictions_from_last_tree(&self, predictions: &mut [f32]) {
        for (leaf, &value) in self.last_leaf_values.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            for &row in self.partitioner.leaf_indices(leaf as LeafId) {
                predictions[row as usize] += value;
            }
        }
    }

    // =========================================================================
    // Expansion Loops
    // =========================================================================

    /// Level by level, expanding every node with a valid split.
    fn grow_depth_wise(
        &mut self,
        root: NodeCandidate,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[usize],
        parallelism: Parallelism,
    ) {
        let mut level = vec![root];
        while !level.is_empty() {
            let mut next_level = Vec::with_capacity(level.len() * 2);
            for mut candidate in level {
                match candidate.split.take() {
                    Some(split) => {
                        let (left, right) = self.expand(candidate, split, dataset, gradients, features, parallelism);
                        next_level.push(left);
                        next_level.push(right);
                    }
                    None => self.finalize_leaf(&candidate),
                }
            }
            level = next_level;
        }
    }

    /// Best gain first until `max_leaves` is reached. Ties go to the node
    /// created first.
    fn grow_leaf_wise(
        &mut self,
        root: NodeCandidate,
        max_leaves: u32,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[usize],
        parallelism: Parallelism,
    ) {
        let mut candidates = vec![root];
        let mut n_leaves = 1u32;

        while n_leaves < max_leaves {
            let best = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| c.split.is_some())
                .max_by(|(_, a), (_, b)| {
                    a.gain()
                        .total_cmp(&b.gain())
                        .then_with(|| b.tree_node.cmp(&a.tree_node))
                })
                .map(|(idx, _)| idx);
            let Some(idx) = best else { break };

            let mut candidate = candidates.swap_remove(idx);
            let Some(split) = candidate.split.take() else {
                candidates.push(candidate);
                break;
            };
            let (left, right) = self.expand(candidate, split, dataset, gradients, features, parallelism);
            candidates.push(left);
            candidates.push(right);
            n_leaves += 1;
        }

        for candidate in &candidates {
            self.finalize_leaf(candidate);
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Build a candidate, searching for its best split when depth allows.
    #[allow(clippy::too_many_arguments)]
    fn candidate(
        &self,
        leaf: LeafId,
        tree_node: NodeId,
        depth: u32,
        stats: NodeStats,
        histogram: NodeHistogram,
        dataset: &BinnedDataset,
        features: &[usize],
        parallelism: Parallelism,
    ) -> NodeCandidate {
        let can_split = match self.params.growth_strategy {
            GrowthStrategy::DepthWise { max_depth } => depth < max_depth,
            GrowthStrategy::LeafWise { max_leaves } => max_leaves > 1,
        };
        let split = if can_split {
            find_best_split(&histogram, stats, features, dataset, &self.params.gain, parallelism)
        } else {
            None
        };
        NodeCandidate {
            leaf,
            tree_node,
            depth,
            stats,
            split,
            histogram,
        }
    }

    /// Apply `split` to the candidate's node and return its two children.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        candidate: NodeCandidate,
        split: SplitInfo,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[usize],
        parallelism: Parallelism,
    ) -> (NodeCandidate, NodeCandidate) {
        let NodeCandidate {
            leaf,
            tree_node,
            depth,
            histogram: mut parent_hist,
            ..
        } = candidate;

        // Training sends `bin <= split.bin` left; inference sends `value < threshold` left
        let threshold = dataset.bin_mapper(split.feature as usize).split_threshold(split.bin as u32);
        let (left_node, right_node) =
            self.tree_builder
                .apply_numeric_split(tree_node, split.feature, threshold, split.default_left);

        let (right_leaf, left_count, right_count) = self.partitioner.split(leaf, &split, dataset);
        let left_leaf = leaf;

        // Subtraction trick: build the smaller child, derive the larger from the parent
        let small_is_left = left_count <= right_count;
        let small_leaf = if small_is_left { left_leaf } else { right_leaf };
        let small_hist =
            NodeHistogram::build(dataset, gradients, self.partitioner.leaf_indices(small_leaf), parallelism);
        parent_hist.subtract(&small_hist);
        let (left_hist, right_hist) = if small_is_left {
            (small_hist, parent_hist)
        } else {
            (parent_hist, small_hist)
        };

        let left = self.candidate(
            left_leaf,
            left_node,
            depth + 1,
            split.left,
            left_hist,
            dataset,
            features,
            parallelism,
        );
        let right = self.candidate(
            right_leaf,
            right_node,
            depth + 1,
            split.right,
            right_hist,
            dataset,
            features,
            parallelism,
        );
        (left, right)
    }

    fn finalize_leaf(&mut self, candidate: &NodeCandidate) {
        let weight = self
            .params
            .gain
            .compute_leaf_weight(candidate.stats.grad, candidate.stats.hess);
        self.tree_builder.make_leaf(candidate.tree_node, weight);

        let leaf = candidate.leaf as usize;
        if leaf >= self.last_leaf_values.len() {
            self.last_leaf_values.resize(leaf + 1, f32::NAN);
        }
        self.last_leaf_values[leaf] = weight * self.params.learning_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    fn gradients_from(residuals: &[f32]) -> Gradients {
        // Squared loss at prediction 0: grad = -target, hess = 1
        let mut grads = Gradients::new(residuals.len());
        for (i, &r) in residuals.iter().enumerate() {
            grads.set(i, -r, 1.0);
        }
        grads
    }

    fn step_dataset() -> (BinnedDataset, Gradients) {
        let features = array![[0.0f32], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let grads = gradients_from(&[1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0]);
        (dataset, grads)
    }

    fn params(growth_strategy: GrowthStrategy) -> GrowerParams {
        GrowerParams {
            gain: GainParams {
                reg_lambda: 0.0,
                min_child_weight: 0.0,
                ..Default::default()
            },
            learning_rate: 1.0,
            growth_strategy,
        }
    }

    #[test]
    fn stump_separates_step() {
        let (dataset, grads) = step_dataset();
        let mut grower = TreeGrower::new(&dataset, params(GrowthStrategy::DepthWise { max_depth: 1 }));
        let tree = grower.grow(&dataset, &grads, &[0], Parallelism::Sequential);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.n_leaves(), 2);
        // Value on the bin boundary stays left
        assert_abs_diff_eq!(tree.predict_row(&[3.0f32]), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(tree.predict_row(&[3.5f32]), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(tree.predict_row(&[4.0f32]), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn depth_limit_is_respected() {
        let features = Array2::from_shape_fn((32, 1), |(i, _)| i as f32);
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let residuals: Vec<f32> = (0..32).map(|i| (i * i) as f32).collect();
        let grads = gradients_from(&residuals);

        let mut grower = TreeGrower::new(&dataset, params(GrowthStrategy::DepthWise { max_depth: 3 }));
        let tree = grower.grow(&dataset, &grads, &[0], Parallelism::Sequential);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.n_leaves(), 8);
    }

    #[test]
    fn leaf_wise_respects_max_leaves() {
        let features = Array2::from_shape_fn((32, 1), |(i, _)| i as f32);
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let residuals: Vec<f32> = (0..32).map(|i| (i * i) as f32).collect();
        let grads = gradients_from(&residuals);

        let mut grower = TreeGrower::new(&dataset, params(GrowthStrategy::LeafWise { max_leaves: 5 }));
        let tree = grower.grow(&dataset, &grads, &[0], Parallelism::Sequential);
        assert!(tree.validate().is_ok());
        assert_eq!(tree.n_leaves(), 5);
    }

    #[test]
    fn constant_gradients_give_single_leaf() {
        let (dataset, _) = step_dataset();
        let grads = gradients_from(&[2.0; 8]);
        let mut grower = TreeGrower::new(&dataset, GrowerParams::default());
        let tree = grower.grow(&dataset, &grads, &[0], Parallelism::Sequential);

        assert_eq!(tree.n_nodes(), 1);
        // 0.3 * 16 / (8 + 1)
        assert_abs_diff_eq!(tree.leaf_value(0), 0.3 * 16.0 / 9.0, epsilon = 1e-6);
    }

    #[test]
    fn partition_update_matches_tree_prediction() {
        let features = array![
            [1.0f32, 10.0],
            [2.0, f32::NAN],
            [3.0, 30.0],
            [4.0, 10.0],
            [5.0, f32::NAN],
            [6.0, 30.0],
        ];
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let grads = gradients_from(&[1.0, 4.0, 2.0, 1.0, 4.0, 9.0]);
        let mut grower = TreeGrower::new(&dataset, params(GrowthStrategy::depth_wise()));
        let tree = grower.grow(&dataset, &grads, &[0, 1], Parallelism::Parallel);

        let mut predictions = vec![0.0f32; 6];
        grower.update_predictions_from_last_tree(&mut predictions);
        for (row, &pred) in predictions.iter().enumerate() {
            assert_abs_diff_eq!(pred, tree.predict_row(&features.row(row)), epsilon = 1e-6);
        }
    }

    #[test]
    fn sequential_and_parallel_trees_match() {
        let features = Array2::from_shape_fn((40, 3), |(i, j)| ((i * (j + 3)) % 11) as f32);
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let residuals: Vec<f32> = (0..40).map(|i| ((i * 7) % 13) as f32).collect();
        let grads = gradients_from(&residuals);

        let mut grower = TreeGrower::new(&dataset, GrowerParams::default());
        let seq = grower.grow(&dataset, &grads, &[0, 1, 2], Parallelism::Sequential);
        let par = grower.grow(&dataset, &grads, &[0, 1, 2], Parallelism::Parallel);
        for row in features.rows() {
            assert_eq!(seq.predict_row(&row), par.predict_row(&row));
        }
    }
}
