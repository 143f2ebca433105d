//! Row partitioning for tree training.
//!
//! Every leaf owns a contiguous range of one shared buffer of row indices.
//! Splitting a leaf partitions its range in place: the left rows stay in the
//! original leaf and the right rows move into a newly allocated one.
//!
//! ```text
//! Initial (all rows in leaf 0):
//!   indices: [0, 1, 2, 3, 4, 5, 6, 7]
//!   leaf_begin: [0], leaf_count: [8]
//!
//! After splitting leaf 0 (even rows left, odd rows right):
//!   indices: [0, 2, 4, 6, 1, 3, 5, 7]
//!   leaf_begin: [0, 4], leaf_count: [4, 4]
//! ```

use super::split::SplitInfo;
use crate::data::{BinnedDataset, MISSING_BIN};

/// Leaf identifier (index during training).
pub type LeafId = u32;

/// Row indices per leaf during tree training.
#[derive(Debug, Clone)]
pub struct RowPartitioner {
    indices: Box<[u32]>,
    leaf_begin: Vec<u32>,
    leaf_count: Vec<u32>,
}

impl RowPartitioner {
    /// Partitioner with every row in leaf 0.
    pub fn new(n_samples: usize) -> Self {
        let mut partitioner = Self {
            indices: Box::default(),
            leaf_begin: Vec::new(),
            leaf_count: Vec::new(),
        };
        partitioner.reset(n_samples);
        partitioner
    }

    /// Reset for a new tree: one leaf owning all rows in order.
    pub fn reset(&mut self, n_samples: usize) {
        if self.indices.len() != n_samples {
            self.indices = (0..n_samples as u32).collect();
        } else {
            for (i, idx) in self.indices.iter_mut().enumerate() {
                *idx = i as u32;
            }
        }
        self.leaf_begin.clear();
        self.leaf_count.clear();
        self.leaf_begin.push(0);
        self.leaf_count.push(n_samples as u32);
    }

    /// Row indices of a leaf.
    #[inline]
    pub fn leaf_indices(&self, leaf: LeafId) -> &[u32] {
        let begin = self.leaf_begin[leaf as usize] as usize;
        let count = self.leaf_count[leaf as usize] as usize;
        &self.indices[begin..begin + count]
    }

    #[inline]
    pub fn leaf_count(&self, leaf: LeafId) -> u32 {
        self.leaf_count[leaf as usize]
    }

    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.leaf_begin.len()
    }

    /// Split a leaf according to a split decision.
    ///
    /// Returns `(right_leaf, left_count, right_count)`. The original leaf keeps
    /// the left-going rows.
    pub fn split(&mut self, leaf: LeafId, split: &SplitInfo, dataset: &BinnedDataset) -> (LeafId, u32, u32) {
        let begin = self.leaf_begin[leaf as usize] as usize;
        let end = begin + self.leaf_count[leaf as usize] as usize;
        let bins = dataset.feature_bins(split.feature as usize);

        // Left rows move to the front
        let mut left_end = begin;
        for i in begin..end {
            if goes_left(bins[self.indices[i] as usize], split) {
                self.indices.swap(i, left_end);
                left_end += 1;
            }
        }

        let left_count = (left_end - begin) as u32;
        let right_count = (end - left_end) as u32;
        self.leaf_count[leaf as usize] = left_count;

        let right_leaf = self.leaf_begin.len() as LeafId;
        self.leaf_begin.push(left_end as u32);
        self.leaf_count.push(right_count);

        (right_leaf, left_count, right_count)
    }
}

#[inline]
fn goes_left(bin: u16, split: &SplitInfo) -> bool {
    match bin {
        MISSING_BIN => split.default_left,
        bin => bin <= split.bin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::gbdt::split::NodeStats;
    use crate::utils::Parallelism;
    use ndarray::array;

    fn make_test_dataset() -> BinnedDataset {
        // Feature 0 alternates, feature 1 is split in halves, feature 2 has gaps
        let features = array![
            [0.0f32, 0.0, 1.0],
            [1.0, 0.0, f32::NAN],
            [0.0, 0.0, 2.0],
            [1.0, 0.0, f32::NAN],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 2.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 2.0],
        ];
        BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential)
    }

    fn numerical(feature: u32, bin: u16, default_left: bool) -> SplitInfo {
        SplitInfo {
            feature,
            bin,
            default_left,
            gain: 1.0,
            left: NodeStats::default(),
            right: NodeStats::default(),
        }
    }

    #[test]
    fn test_partitioner_init() {
        let partitioner = RowPartitioner::new(100);
        assert_eq!(partitioner.leaf_count(0), 100);
        assert_eq!(partitioner.n_leaves(), 1);
        let expected: Vec<u32> = (0..100).collect();
        assert_eq!(partitioner.leaf_indices(0), expected.as_slice());
    }

    #[test]
    fn test_split_numerical() {
        let dataset = make_test_dataset();
        let mut partitioner = RowPartitioner::new(8);

        let (right_leaf, left_count, right_count) = partitioner.split(0, &numerical(1, 0, false), &dataset);

        assert_eq!((left_count, right_count), (4, 4));
        assert_eq!(right_leaf, 1);
        assert!(partitioner.leaf_indices(0).iter().all(|&r| r < 4));
        assert!(partitioner.leaf_indices(right_leaf).iter().all(|&r| r >= 4));
    }

    #[test]
    fn test_multiple_splits() {
        let dataset = make_test_dataset();
        let mut partitioner = RowPartitioner::new(8);

        let (leaf1, _, _) = partitioner.split(0, &numerical(1, 0, false), &dataset);
        let (leaf2, left_count, right_count) = partitioner.split(0, &numerical(0, 0, false), &dataset);

        assert_eq!((left_count, right_count), (2, 2));
        assert!(partitioner.leaf_indices(0).iter().all(|&r| r < 4 && r % 2 == 0));
        assert!(partitioner.leaf_indices(leaf2).iter().all(|&r| r < 4 && r % 2 == 1));
        assert_eq!(partitioner.leaf_indices(leaf1).len(), 4);
        assert_eq!(partitioner.n_leaves(), 3);
    }

    #[test]
    fn missing_rows_follow_default_direction() {
        let dataset = make_test_dataset();

        let mut partitioner = RowPartitioner::new(8);
        let (right, left_count, _) = partitioner.split(0, &numerical(2, 0, true), &dataset);
        assert_eq!(left_count, 5);
        let mut left: Vec<u32> = partitioner.leaf_indices(0).to_vec();
        left.sort_unstable();
        assert_eq!(left, vec![0, 1, 3, 4, 6]);
        assert_eq!(partitioner.leaf_count(right), 3);

        partitioner.reset(8);
        let (_, left_count, right_count) = partitioner.split(0, &numerical(2, 0, false), &dataset);
        assert_eq!((left_count, right_count), (3, 5));
    }
}
