//! Canonical tree representation (SoA).
//!
//! For mutable tree construction during training, see
//! [`super::mutable_tree::MutableTree`].

use super::NodeId;
use super::node::SampleAccessor;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },
    #[error("node {node} reached by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("node {node} unreachable from the root")]
    UnreachableNode { node: NodeId },
    #[error("leaf {node} has non-finite value")]
    NonFiniteLeaf { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage for efficient traversal.
///
/// Child indices are local to this tree (0 = root). Numeric splits send a
/// sample left when `value < threshold`; NaN follows `default_left`.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    /// Create a tree from parallel arrays. All arrays must have one entry per node.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
        }
    }

    /// A tree with a single leaf.
    pub fn constant(value: f32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![false],
            vec![true],
            vec![value],
        )
    }

    // =========================================================================
    // Node Accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Number of leaf nodes.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    /// Maximum root-to-leaf depth (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(0, 0)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate basic structural invariants for this tree.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            let idx = node as usize;
            if visited[idx] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[idx] = true;

            if self.is_leaf(node) {
                if !self.leaf_value(node).is_finite() {
                    return Err(TreeValidationError::NonFiniteLeaf { node });
                }
                continue;
            }

            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(i) => Err(TreeValidationError::UnreachableNode { node: i as NodeId }),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Traverse the tree to the leaf reached by `sample`.
    #[inline]
    pub fn traverse_to_leaf<S: SampleAccessor + ?Sized>(&self, sample: &S) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = sample.feature(self.split_index(node) as usize);

            node = if fvalue.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else if fvalue < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }

        node
    }

    /// Leaf value reached by `sample`.
    #[inline]
    pub fn predict_row<S: SampleAccessor + ?Sized>(&self, sample: &S) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// `x[feature] < threshold ? left : right`, NaN goes to `default_left`.
    pub(crate) fn stump(feature: u32, threshold: f32, default_left: bool, left: f32, right: f32) -> Tree {
        Tree::new(
            vec![feature, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![default_left, false, false],
            vec![false, true, true],
            vec![0.0, left, right],
        )
    }

    #[test]
    fn traverse_numeric_split() {
        let tree = stump(0, 0.5, true, 1.0, 2.0);
        assert_eq!(tree.predict_row(&[0.3]), 1.0);
        assert_eq!(tree.predict_row(&[0.5]), 2.0);
        assert_eq!(tree.predict_row(&[0.7]), 2.0);
    }

    #[test]
    fn missing_follows_default_direction() {
        assert_eq!(stump(0, 0.5, true, 1.0, 2.0).predict_row(&[f32::NAN]), 1.0);
        assert_eq!(stump(0, 0.5, false, 1.0, 2.0).predict_row(&[f32::NAN]), 2.0);
    }

    #[test]
    fn shape_statistics() {
        let tree = stump(1, 0.0, true, -1.0, 1.0);
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(Tree::constant(3.0).depth(), 0);
    }

    #[test]
    fn validate_accepts_stump() {
        assert!(stump(0, 0.5, true, 1.0, 2.0).validate().is_ok());
        assert!(Tree::constant(1.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_structure() {
        let self_loop = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![0, 0],
            vec![1, 0],
            vec![true, false],
            vec![false, true],
            vec![0.0, 1.0],
        );
        assert_eq!(self_loop.validate(), Err(TreeValidationError::SelfLoop { node: 0 }));

        let unreachable = Tree::new(
            vec![0, 0],
            vec![0.0, 0.0],
            vec![0, 0],
            vec![0, 0],
            vec![false, false],
            vec![true, true],
            vec![1.0, 1.0],
        );
        assert_eq!(
            unreachable.validate(),
            Err(TreeValidationError::UnreachableNode { node: 1 })
        );

        assert_eq!(
            Tree::constant(f32::NAN).validate(),
            Err(TreeValidationError::NonFiniteLeaf { node: 0 })
        );
    }
}
