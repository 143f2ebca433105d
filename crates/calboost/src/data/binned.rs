//! Quantile binning for histogram-based training.
//!
//! Each feature gets a [`BinMapper`] holding sorted bin upper bounds. A value
//! maps to the first bin whose upper bound is `>=` the value. The last bound
//! is `f64::MAX` so every finite value lands in some bin. NaN maps to the
//! dedicated [`MISSING_BIN`].

use ndarray::ArrayView2;

use crate::repr::gbdt::next_up_f32;
use crate::utils::Parallelism;

/// Bin index reserved for missing (NaN) values.
pub const MISSING_BIN: u16 = u16::MAX;

/// Largest bin count a feature may use (one index is reserved for missing).
pub const MAX_BINS_LIMIT: u32 = MISSING_BIN as u32;

// ============================================================================
// BinMapper
// ============================================================================

/// Mapping from continuous values to bin indices.
#[derive(Clone, Debug, PartialEq)]
pub struct BinMapper {
    /// Value v maps to the first bin where `v <= bound[bin]`.
    bin_upper_bounds: Box<[f64]>,
    min_val: f64,
    max_val: f64,
}

impl BinMapper {
    /// Build a mapper from raw feature values.
    ///
    /// When the feature has at most `max_bins` distinct values every distinct
    /// value gets its own bin. Otherwise bounds are exact quantile cuts of the
    /// sorted values, deduplicated. All-missing and constant features get a
    /// single bin.
    pub fn from_values(values: &[f32], max_bins: u32) -> Self {
        let max_bins = max_bins.clamp(1, MAX_BINS_LIMIT);

        let mut finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::single_bin(0.0, 0.0);
        }
        finite.sort_by(f32::total_cmp);

        let min_val = finite[0] as f64;
        let max_val = finite[finite.len() - 1] as f64;
        if min_val >= max_val {
            return Self::single_bin(min_val, max_val);
        }

        let mut distinct = finite.clone();
        distinct.dedup();

        let mut bounds: Vec<f64> = if distinct.len() <= max_bins as usize {
            distinct[..distinct.len() - 1].iter().map(|&v| v as f64).collect()
        } else {
            let n = finite.len();
            let mut bounds = Vec::with_capacity(max_bins as usize);
            for i in 1..max_bins {
                let q = i as f64 / max_bins as f64;
                let idx = ((q * (n - 1) as f64).round() as usize).min(n - 1);
                let bound = finite[idx] as f64;
                if bound >= max_val {
                    break;
                }
                if bounds.last().is_none_or(|&last| bound > last) {
                    bounds.push(bound);
                }
            }
            bounds
        };
        bounds.push(f64::MAX);

        Self {
            bin_upper_bounds: bounds.into_boxed_slice(),
            min_val,
            max_val,
        }
    }

    fn single_bin(min_val: f64, max_val: f64) -> Self {
        Self {
            bin_upper_bounds: vec![f64::MAX].into_boxed_slice(),
            min_val,
            max_val,
        }
    }

    /// Number of bins (excluding the missing bin).
    #[inline]
    pub fn n_bins(&self) -> u32 {
        self.bin_upper_bounds.len() as u32
    }

    /// True when no split is possible on this feature.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.n_bins() <= 1
    }

    /// Map a value to its bin index.
    #[inline]
    pub fn value_to_bin(&self, value: f32) -> u16 {
        if value.is_nan() {
            return MISSING_BIN;
        }
        let v = value as f64;
        let bin = self.bin_upper_bounds.partition_point(|&b| b < v);
        bin.min(self.bin_upper_bounds.len() - 1) as u16
    }

    /// Upper bound of a bin.
    #[inline]
    pub fn bin_to_value(&self, bin: u32) -> f64 {
        self.bin_upper_bounds[bin as usize]
    }

    /// Inference threshold for a split after `bin`.
    ///
    /// Training sends `bin <= split_bin` left; inference sends
    /// `value < threshold` left. Taking the next float above the bin's upper
    /// bound makes the two agree.
    #[inline]
    pub fn split_threshold(&self, bin: u32) -> f32 {
        next_up_f32(self.bin_to_value(bin) as f32)
    }

    #[inline]
    pub fn min_val(&self) -> f64 {
        self.min_val
    }

    #[inline]
    pub fn max_val(&self) -> f64 {
        self.max_val
    }
}

// ============================================================================
// BinnedDataset
// ============================================================================

/// Binned feature matrix, stored feature-major.
#[derive(Clone, Debug)]
pub struct BinnedDataset {
    n_samples: usize,
    bins: Vec<Box<[u16]>>,
    mappers: Vec<BinMapper>,
    has_missing: Vec<bool>,
}

impl BinnedDataset {
    /// Bin a sample-major feature matrix.
    pub fn from_features(features: ArrayView2<'_, f32>, max_bins: u32, parallelism: Parallelism) -> Self {
        let n_samples = features.nrows();
        let columns: Vec<Vec<f32>> = features.columns().into_iter().map(|c| c.to_vec()).collect();

        let binned: Vec<(Box<[u16]>, BinMapper, bool)> = parallelism.maybe_par_map(columns, |values| {
            let mapper = BinMapper::from_values(&values, max_bins);
            let bins: Box<[u16]> = values.iter().map(|&v| mapper.value_to_bin(v)).collect();
            let has_missing = bins.contains(&MISSING_BIN);
            (bins, mapper, has_missing)
        });

        let mut bins = Vec::with_capacity(binned.len());
        let mut mappers = Vec::with_capacity(binned.len());
        let mut has_missing = Vec::with_capacity(binned.len());
        for (b, m, miss) in binned {
            bins.push(b);
            mappers.push(m);
            has_missing.push(miss);
        }

        tracing::debug!(
            n_samples,
            n_features = mappers.len(),
            total_bins = mappers.iter().map(|m| m.n_bins() as usize).sum::<usize>(),
            "binned features"
        );

        Self {
            n_samples,
            bins,
            mappers,
            has_missing,
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mappers.len()
    }

    /// Bin column of one feature.
    #[inline]
    pub fn feature_bins(&self, feature: usize) -> &[u16] {
        &self.bins[feature]
    }

    #[inline]
    pub fn bin_mapper(&self, feature: usize) -> &BinMapper {
        &self.mappers[feature]
    }

    #[inline]
    pub fn n_bins(&self, feature: usize) -> u32 {
        self.mappers[feature].n_bins()
    }

    /// Whether any sample has a missing value for this feature.
    #[inline]
    pub fn has_missing(&self, feature: usize) -> bool {
        self.has_missing[feature]
    }

    /// Bin of one cell.
    #[inline]
    pub fn bin(&self, row: usize, feature: usize) -> u16 {
        self.bins[feature][row]
    }
}
