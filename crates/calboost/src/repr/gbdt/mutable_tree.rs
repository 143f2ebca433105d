//! Growable tree used while training.

use super::NodeId;
use super::tree::Tree;

/// A tree under construction.
///
/// Nodes are appended as splits are applied: a split on node `n` creates two
/// new children at the end of the arrays. Every node starts as a leaf.
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl MutableTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all nodes and allocate the root.
    pub fn init_root(&mut self) -> NodeId {
        self.split_indices.clear();
        self.split_thresholds.clear();
        self.left_children.clear();
        self.right_children.clear();
        self.default_left.clear();
        self.is_leaf.clear();
        self.leaf_values.clear();
        self.push_node()
    }

    fn push_node(&mut self) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(false);
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        id
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Turn `node` into a numeric split and return `(left, right)`.
    pub fn apply_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
    ) -> (NodeId, NodeId) {
        let left = self.push_node();
        let right = self.push_node();

        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
        self.default_left[idx] = default_left;
        self.is_leaf[idx] = false;

        (left, right)
    }

    /// Finalize `node` as a leaf with `value`.
    #[inline]
    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
    }

    /// Multiply every leaf value by `factor` (learning rate).
    pub fn scale_leaves(&mut self, factor: f32) {
        for (value, &leaf) in self.leaf_values.iter_mut().zip(&self.is_leaf) {
            if leaf {
                *value *= factor;
            }
        }
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Freeze into an immutable [`Tree`].
    pub fn freeze(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
        )
    }
}
