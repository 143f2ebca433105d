//! Row and column subsampling.
//!
//! Both samplers draw from a seeded [`StdRng`], so a fixed seed reproduces
//! the same sequence of samples across runs.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::GradsTuple;

// =============================================================================
// RowSampler
// =============================================================================

/// Uniform row subsampling per tree.
///
/// Unsampled rows keep their place in the partition but have their gradient
/// and hessian zeroed, so they contribute nothing to histograms or leaf
/// weights.
pub struct RowSampler {
    subsample: f32,
    rng: StdRng,
}

impl RowSampler {
    pub fn new(subsample: f32, seed: u64) -> Self {
        Self {
            subsample,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subsample < 1.0
    }

    /// Zero out unsampled rows. Returns the number of rows kept.
    pub fn sample(&mut self, grad_hess: &mut [GradsTuple]) -> usize {
        if !self.is_enabled() {
            return grad_hess.len();
        }
        let mut kept = 0;
        for gh in grad_hess.iter_mut() {
            if self.rng.r#gen::<f32>() < self.subsample {
                kept += 1;
            } else {
                *gh = GradsTuple::default();
            }
        }
        kept
    }
}

// =============================================================================
// ColSampler
// =============================================================================

/// Feature subsampling per tree (`colsample_bytree`).
pub struct ColSampler {
    colsample_bytree: f32,
    rng: StdRng,
}

impl ColSampler {
    pub fn new(colsample_bytree: f32, seed: u64) -> Self {
        Self {
            colsample_bytree,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sorted feature indices available to the next tree.
    ///
    /// Always keeps at least one feature.
    pub fn sample(&mut self, n_features: usize) -> Vec<usize> {
        if self.colsample_bytree >= 1.0 || n_features == 0 {
            return (0..n_features).collect();
        }
        let k = ((n_features as f32 * self.colsample_bytree).round() as usize).clamp(1, n_features);
        let mut features = index::sample(&mut self.rng, n_features, k).into_vec();
        features.sort_unstable();
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_row_sampling_is_noop() {
        let mut grads = vec![GradsTuple { grad: 1.0, hess: 1.0 }; 10];
        let mut sampler = RowSampler::new(1.0, 0);
        assert_eq!(sampler.sample(&mut grads), 10);
        assert!(grads.iter().all(|g| g.hess == 1.0));
    }

    #[test]
    fn row_sampling_zeroes_some_rows() {
        let mut grads = vec![GradsTuple { grad: 1.0, hess: 1.0 }; 1000];
        let mut sampler = RowSampler::new(0.5, 7);
        let kept = sampler.sample(&mut grads);
        let nonzero = grads.iter().filter(|g| g.hess > 0.0).count();
        assert_eq!(kept, nonzero);
        assert!(kept > 350 && kept < 650);
    }

    #[test]
    fn col_sampling_is_sorted_and_reproducible() {
        let a = ColSampler::new(0.5, 3).sample(10);
        let b = ColSampler::new(0.5, 3).sample(10);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn col_sampling_keeps_one_feature() {
        assert_eq!(ColSampler::new(0.01, 0).sample(3).len(), 1);
        assert_eq!(ColSampler::new(1.0, 0).sample(3), vec![0, 1, 2]);
    }
}
