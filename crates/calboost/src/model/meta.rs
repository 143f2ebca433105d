//! Model metadata.

use serde::{Deserialize, Serialize};

/// Introspection data about a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature names, in column order.
    pub feature_names: Option<Vec<String>>,
    /// Number of features.
    pub n_features: usize,
    /// Number of trees kept in the forest.
    pub n_trees: usize,
    /// Constant initial prediction.
    pub base_score: f32,
    /// Best iteration (from early stopping).
    pub best_iteration: Option<usize>,
}

impl ModelMeta {
    /// Metadata for a regression model over `n_features` columns.
    pub fn for_regression(n_features: usize) -> Self {
        Self {
            n_features,
            ..Default::default()
        }
    }

    /// Name of feature `idx`, falling back to `f{idx}`.
    pub fn feature_name(&self, idx: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(idx).cloned())
            .unwrap_or_else(|| format!("f{idx}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_name_fallback() {
        let mut meta = ModelMeta::for_regression(2);
        assert_eq!(meta.feature_name(1), "f1");
        meta.feature_names = Some(vec!["Age".into(), "Height".into()]);
        assert_eq!(meta.feature_name(0), "Age");
        assert_eq!(meta.feature_name(5), "f5");
    }

    #[test]
    fn serializes_to_json() {
        let meta = ModelMeta {
            n_trees: 3,
            base_score: 1.5,
            ..ModelMeta::for_regression(7)
        };
        let json = serde_json::to_string(&meta).unwrap();
        let back: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
