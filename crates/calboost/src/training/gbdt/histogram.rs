//! Gradient histograms.
//!
//! One [`FeatureHistogram`] per feature holds gradient/hessian sums and row
//! counts per bin, plus a separate bucket for missing values. A
//! [`NodeHistogram`] covers every feature for one tree node.
//!
//! The subtraction trick (sibling = parent - child) lets the grower build only
//! the smaller child of each split.

use rayon::prelude::*;

use crate::data::{BinnedDataset, MISSING_BIN};
use crate::training::Gradients;
use crate::utils::Parallelism;

/// Accumulated statistics of one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistogramBin {
    pub grad: f64,
    pub hess: f64,
    pub count: u32,
}

impl HistogramBin {
    #[inline]
    pub fn add(&mut self, grad: f32, hess: f32) {
        self.grad += grad as f64;
        self.hess += hess as f64;
        self.count += 1;
    }

    #[inline]
    pub fn merge(&mut self, other: &HistogramBin) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    #[inline]
    pub fn subtract(&mut self, other: &HistogramBin) {
        self.grad -= other.grad;
        self.hess -= other.hess;
        self.count -= other.count;
    }
}

// =============================================================================
// FeatureHistogram
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureHistogram {
    pub bins: Vec<HistogramBin>,
    pub missing: HistogramBin,
}

impl FeatureHistogram {
    pub fn new(n_bins: usize) -> Self {
        Self {
            bins: vec![HistogramBin::default(); n_bins],
            missing: HistogramBin::default(),
        }
    }

    fn clear(&mut self) {
        self.bins.fill(HistogramBin::default());
        self.missing = HistogramBin::default();
    }

    /// Accumulate `rows` of one feature column.
    fn build(&mut self, bins: &[u16], gradients: &Gradients, rows: &[u32]) {
        let pairs = gradients.pairs();
        for &row in rows {
            let row = row as usize;
            let gh = pairs[row];
            match bins[row] {
                MISSING_BIN => self.missing.add(gh.grad, gh.hess),
                bin => self.bins[bin as usize].add(gh.grad, gh.hess),
            }
        }
    }

    /// Sum over all bins including missing.
    pub fn total(&self) -> HistogramBin {
        let mut total = self.missing;
        for bin in &self.bins {
            total.merge(bin);
        }
        total
    }
}

// =============================================================================
// NodeHistogram
// =============================================================================

/// Histograms of every feature for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHistogram {
    features: Vec<FeatureHistogram>,
}

impl NodeHistogram {
    /// Zeroed histogram shaped for `dataset`.
    pub fn for_dataset(dataset: &BinnedDataset) -> Self {
        Self {
            features: (0..dataset.n_features())
                .map(|f| FeatureHistogram::new(dataset.n_bins(f) as usize))
                .collect(),
        }
    }

    /// Build from scratch over `rows`.
    pub fn build(
        dataset: &BinnedDataset,
        gradients: &Gradients,
        rows: &[u32],
        parallelism: Parallelism,
    ) -> Self {
        let mut hist = Self::for_dataset(dataset);
        hist.rebuild(dataset, gradients, rows, parallelism);
        hist
    }

    /// Clear and rebuild over `rows`. Features are independent, so they are
    /// built in parallel when allowed.
    pub fn rebuild(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        rows: &[u32],
        parallelism: Parallelism,
    ) {
        let build_one = |(f, hist): (usize, &mut FeatureHistogram)| {
            hist.clear();
            hist.build(dataset.feature_bins(f), gradients, rows);
        };
        if parallelism.is_parallel() {
            self.features.par_iter_mut().enumerate().for_each(build_one);
        } else {
            self.features.iter_mut().enumerate().for_each(build_one);
        }
    }

    /// Turn this parent histogram into the sibling of `child`.
    pub fn subtract(&mut self, child: &NodeHistogram) {
        debug_assert_eq!(self.features.len(), child.features.len());
        for (dst, src) in self.features.iter_mut().zip(&child.features) {
            for (d, s) in dst.bins.iter_mut().zip(&src.bins) {
                d.subtract(s);
            }
            dst.missing.subtract(&src.missing);
        }
    }

    #[inline]
    pub fn feature(&self, feature: usize) -> &FeatureHistogram {
        &self.features[feature]
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn fixture() -> (BinnedDataset, Gradients) {
        let features = array![[1.0f32, 5.0], [2.0, f32::NAN], [1.0, 6.0], [3.0, 5.0]];
        let dataset = BinnedDataset::from_features(features.view(), 256, Parallelism::Sequential);
        let mut grads = Gradients::new(4);
        for (i, g) in [1.0, -2.0, 3.0, 0.5].into_iter().enumerate() {
            grads.set(i, g, 1.0);
        }
        (dataset, grads)
    }

    #[test]
    fn build_accumulates_bins_and_missing() {
        let (dataset, grads) = fixture();
        let hist = NodeHistogram::build(&dataset, &grads, &[0, 1, 2, 3], Parallelism::Sequential);

        let f0 = hist.feature(0);
        assert_eq!(f0.bins.len(), 3);
        assert_abs_diff_eq!(f0.bins[0].grad, 4.0);
        assert_eq!(f0.bins[0].count, 2);
        assert_eq!(f0.missing.count, 0);

        let f1 = hist.feature(1);
        assert_eq!(f1.missing.count, 1);
        assert_abs_diff_eq!(f1.missing.grad, -2.0);
        assert_eq!(f1.total().count, 4);
        assert_abs_diff_eq!(f1.total().grad, 2.5);
    }

    #[test]
    fn subtraction_matches_direct_build() {
        let (dataset, grads) = fixture();
        let mut parent = NodeHistogram::build(&dataset, &grads, &[0, 1, 2, 3], Parallelism::Sequential);
        let left = NodeHistogram::build(&dataset, &grads, &[0, 2], Parallelism::Sequential);
        let right = NodeHistogram::build(&dataset, &grads, &[1, 3], Parallelism::Parallel);

        parent.subtract(&left);
        assert_eq!(parent, right);
    }
}
