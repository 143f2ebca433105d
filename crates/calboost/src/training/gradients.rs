//! Per-sample gradient storage.

/// Gradient and hessian of the loss for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

/// Gradient buffer for a single-output model.
///
/// # Example
///
/// ```
/// use calboost::training::Gradients;
///
/// let mut buffer = Gradients::new(100);
/// buffer.set(0, -0.5, 1.0);
/// assert_eq!(buffer.get(0), (-0.5, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Gradients {
    pairs: Vec<GradsTuple>,
}

impl Gradients {
    /// Zeroed buffer for `n_samples` samples.
    pub fn new(n_samples: usize) -> Self {
        Self {
            pairs: vec![GradsTuple::default(); n_samples],
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn get(&self, sample: usize) -> (f32, f32) {
        let p = self.pairs[sample];
        (p.grad, p.hess)
    }

    #[inline]
    pub fn set(&mut self, sample: usize, grad: f32, hess: f32) {
        self.pairs[sample] = GradsTuple { grad, hess };
    }

    #[inline]
    pub fn pairs(&self) -> &[GradsTuple] {
        &self.pairs
    }

    #[inline]
    pub fn pairs_mut(&mut self) -> &mut [GradsTuple] {
        &mut self.pairs
    }

    /// Gradient and hessian sums over `rows`, accumulated in f64.
    pub fn sum_rows(&self, rows: &[u32]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            let p = self.pairs[r as usize];
            (g + p.grad as f64, h + p.hess as f64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_rows_accumulates_subset() {
        let mut g = Gradients::new(4);
        g.set(0, 1.0, 1.0);
        g.set(1, -2.0, 1.0);
        g.set(2, 3.0, 0.5);
        g.set(3, 4.0, 2.0);
        assert_eq!(g.sum_rows(&[0, 2]), (4.0, 1.5));
        assert_eq!(g.sum_rows(&[]), (0.0, 0.0));
    }
}
