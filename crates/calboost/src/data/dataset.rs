//! Feature matrix plus regression target.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::DataError;

/// A numeric dataset ready for training.
///
/// Features are sample-major (`[n_samples, n_features]`); missing values
/// are NaN. Targets are single-output.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f32>,
    targets: Array1<f32>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Create a dataset, validating that all dimensions agree.
    pub fn new(
        features: Array2<f32>,
        targets: Array1<f32>,
        feature_names: Vec<String>,
    ) -> Result<Self, DataError> {
        if features.nrows() != targets.len() {
            return Err(DataError::ShapeMismatch {
                expected: format!("{} targets", features.nrows()),
                got: format!("{} targets", targets.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(DataError::ShapeMismatch {
                expected: format!("{} feature names", features.ncols()),
                got: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Self {
            features,
            targets,
            feature_names,
        })
    }

    /// Dataset with generic feature names `f0..fN`.
    pub fn unnamed(features: Array2<f32>, targets: Array1<f32>) -> Result<Self, DataError> {
        let names = (0..features.ncols()).map(|i| format!("f{i}")).collect();
        Self::new(features, targets, names)
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// `(n_samples, n_features)`.
    pub fn shape(&self) -> (usize, usize) {
        self.features.dim()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f32> {
        self.targets.view()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Single feature column.
    pub fn feature(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.features.column(idx)
    }

    /// Copy of the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_target_length_mismatch() {
        let err = Dataset::unnamed(array![[1.0, 2.0], [3.0, 4.0]], array![1.0]).unwrap_err();
        assert!(matches!(err, DataError::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_name_count_mismatch() {
        let err = Dataset::new(array![[1.0, 2.0]], array![1.0], vec!["a".into()]).unwrap_err();
        assert!(matches!(err, DataError::ShapeMismatch { .. }));
    }

    #[test]
    fn select_rows_keeps_order() {
        let ds = Dataset::unnamed(array![[1.0], [2.0], [3.0]], array![10.0, 20.0, 30.0]).unwrap();
        let sub = ds.select_rows(&[2, 0]);
        assert_eq!(sub.shape(), (2, 1));
        assert_eq!(sub.targets().to_vec(), vec![30.0, 10.0]);
        assert_eq!(sub.features()[[0, 0]], 3.0);
        assert_eq!(sub.feature_names(), &["f0".to_string()]);
    }
}
