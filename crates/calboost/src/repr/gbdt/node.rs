//! Node identifiers and per-sample feature access.

use ndarray::ArrayView1;

/// Canonical node identifier.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

/// Smallest `f32` strictly greater than `x` (mirrors `f32::next_up`).
#[inline]
pub fn next_up_f32(x: f32) -> f32 {
    if x.is_nan() || x == f32::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f32::from_bits(1);
    }
    let bits = x.to_bits();
    if x.is_sign_positive() {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

// ============================================================================
// SampleAccessor
// ============================================================================

/// Feature values of a single sample.
pub trait SampleAccessor {
    /// Feature value at `index`; `f32::NAN` for missing values.
    fn feature(&self, index: usize) -> f32;

    fn n_features(&self) -> usize;
}

impl SampleAccessor for [f32] {
    #[inline]
    fn feature(&self, index: usize) -> f32 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> SampleAccessor for [f32; N] {
    #[inline]
    fn feature(&self, index: usize) -> f32 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        N
    }
}

impl SampleAccessor for ArrayView1<'_, f32> {
    #[inline]
    fn feature(&self, index: usize) -> f32 {
        self[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}
