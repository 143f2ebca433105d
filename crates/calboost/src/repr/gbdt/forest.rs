//! Canonical forest representation (collection of trees).

use ndarray::{Array1, ArrayView2};

use super::tree::{Tree, TreeValidationError};
use super::node::SampleAccessor;
use crate::utils::Parallelism;

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score is not finite")]
    NonFiniteBaseScore,
    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Additive ensemble of regression trees.
///
/// A prediction is `base_score + Σ tree(x)`.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Forest {
    /// Empty forest predicting `base_score` everywhere.
    pub fn new(base_score: f32) -> Self {
        Self {
            trees: Vec::new(),
            base_score,
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Keep only the first `n_trees` trees.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    /// Validate the base score and every tree.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore);
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict a single sample.
    pub fn predict_row<S: SampleAccessor + ?Sized>(&self, sample: &S) -> f32 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.predict_row(sample))
    }

    /// Predict every row of a sample-major feature matrix.
    pub fn predict(&self, features: ArrayView2<'_, f32>, parallelism: Parallelism) -> Array1<f32> {
        let preds = parallelism.maybe_par_map(0..features.nrows(), |row| {
            self.predict_row(&features.row(row))
        });
        Array1::from(preds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::tree::tests::stump;
    use ndarray::array;

    #[test]
    fn forest_single_tree_regression() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, true, 1.0, 2.0));
        assert_eq!(forest.predict_row(&[0.3]), 1.0);
        assert_eq!(forest.predict_row(&[0.7]), 2.0);
    }

    #[test]
    fn forest_multiple_trees_sum_with_base_score() {
        let mut forest = Forest::new(0.5);
        forest.push_tree(stump(0, 0.5, true, 1.0, 2.0));
        forest.push_tree(stump(0, 0.5, true, 0.5, 1.5));
        assert_eq!(forest.predict_row(&[0.3]), 2.0);
        assert_eq!(forest.predict_row(&[0.7]), 4.0);
    }

    #[test]
    fn empty_forest_predicts_base_score() {
        let forest = Forest::new(42.0);
        let preds = forest.predict(array![[1.0f32], [2.0]].view(), Parallelism::Sequential);
        assert_eq!(preds.to_vec(), vec![42.0, 42.0]);
    }

    #[test]
    fn batch_matches_row_prediction() {
        let mut forest = Forest::new(0.1);
        forest.push_tree(stump(0, 0.5, true, 1.0, 2.0));
        forest.push_tree(stump(1, 3.0, false, -1.0, 1.0));

        let data = array![[0.3f32, 1.0], [0.7, f32::NAN], [0.5, 4.0]];
        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let preds = forest.predict(data.view(), parallelism);
            for (row, &p) in preds.iter().enumerate() {
                let expected = forest.predict_row(&data.row(row));
                assert!((p - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn truncate_and_validate() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, true, 1.0, 2.0));
        forest.push_tree(stump(0, 0.5, true, 1.0, 2.0));
        forest.truncate(1);
        assert_eq!(forest.n_trees(), 1);
        assert!(forest.validate().is_ok());
        assert_eq!(
            Forest::new(f32::NAN).validate(),
            Err(ForestValidationError::NonFiniteBaseScore)
        );
    }
}
