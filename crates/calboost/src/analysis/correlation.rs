//! Pearson correlation between numeric columns.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::Column;
use crate::utils::Parallelism;

/// Square, symmetric correlation matrix with named rows and columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major `[n, n]` coefficients. NaN where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.len() + col]
    }

    /// Coefficient between two columns looked up by name.
    pub fn by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.get(i, j))
    }
}

/// Pearson correlation over the rows where both values are present.
///
/// NaN when fewer than two complete pairs remain or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Correlation of every column with every other column.
///
/// The upper triangle is computed (in parallel when allowed) and mirrored.
/// A column's correlation with itself is 1 unless it is constant.
pub fn correlation_matrix(columns: &[Column], parallelism: Parallelism) -> CorrelationMatrix {
    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

    let coefficients: Vec<f64> = if parallelism.is_parallel() {
        pairs
            .par_iter()
            .map(|&(i, j)| pearson(&columns[i].values, &columns[j].values))
            .collect()
    } else {
        pairs
            .iter()
            .map(|&(i, j)| pearson(&columns[i].values, &columns[j].values))
            .collect()
    };

    let mut values = vec![f64::NAN; n * n];
    for (&(i, j), r) in pairs.iter().zip(coefficients) {
        values[i * n + j] = r;
        values[j * n + i] = r;
    }

    CorrelationMatrix {
        names: columns.iter().map(|c| c.name.to_string()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn col(name: &'static str, values: &[f64]) -> Column {
        Column {
            name,
            values: values.to_vec(),
        }
    }

    #[test]
    fn perfect_linear_relations() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn known_coefficient() {
        // numpy.corrcoef([1, 2, 3, 4, 5], [2, 1, 4, 3, 5])[0, 1] == 0.8
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]);
        assert_abs_diff_eq!(r, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn uses_pairwise_complete_rows() {
        let r = pearson(&[1.0, 2.0, f64::NAN, 3.0], &[1.0, 2.0, 100.0, 3.0]);
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_column_is_undefined() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let columns = [
            col("a", &[1.0, 2.0, 3.0, 4.0]),
            col("b", &[1.0, 3.0, 2.0, 5.0]),
            col("c", &[4.0, 1.0, 0.0, 2.0]),
        ];
        let m = correlation_matrix(&columns, Parallelism::Sequential);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_abs_diff_eq!(m.get(i, i), 1.0, epsilon = 1e-12);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.by_name("a", "b"), Some(m.get(0, 1)));
        assert_eq!(m.by_name("a", "zzz"), None);
    }

    #[test]
    fn parallel_matches_sequential() {
        let columns = [
            col("a", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            col("b", &[5.0, 3.0, 2.0, 2.0, 1.0]),
        ];
        assert_eq!(
            correlation_matrix(&columns, Parallelism::Sequential),
            correlation_matrix(&columns, Parallelism::Parallel)
        );
    }
}
