//! Evaluation utilities for training.
//!
//! Provides the [`Evaluator`] component for computing metrics during training,
//! and [`MetricValue`] for wrapping computed metrics with metadata.

use ndarray::ArrayView1;

use super::metrics::MetricFn;
use crate::data::Dataset;

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricValue {
    /// Name of the metric (e.g. "train-rmse", "valid-mae").
    pub name: String,
    pub value: f64,
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.is_better_than_value(other.value)
    }

    /// Returns true if this value is better than a raw value.
    pub fn is_better_than_value(&self, other_value: f64) -> bool {
        if self.higher_is_better {
            self.value > other_value
        } else {
            self.value < other_value
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// EvalSet
// =============================================================================

/// Named evaluation dataset.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub dataset: &'a Dataset,
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, dataset: &'a Dataset) -> Self {
        Self { name, dataset }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes one metric for the training set and each eval set per round.
pub struct Evaluator<'a, M: MetricFn> {
    metric: &'a M,
}

impl<'a, M: MetricFn> Evaluator<'a, M> {
    pub fn new(metric: &'a M) -> Self {
        Self { metric }
    }

    pub fn is_enabled(&self) -> bool {
        self.metric.is_enabled()
    }

    /// Evaluate one named prediction set.
    pub fn evaluate(
        &self,
        set_name: &str,
        predictions: ArrayView1<'_, f32>,
        targets: ArrayView1<'_, f32>,
    ) -> MetricValue {
        MetricValue::new(
            format!("{}-{}", set_name, self.metric.name()),
            self.metric.compute(predictions, targets),
            self.metric.higher_is_better(),
        )
    }

    /// Metrics for the training predictions followed by each eval set.
    pub fn evaluate_round(
        &self,
        train_predictions: ArrayView1<'_, f32>,
        train_targets: ArrayView1<'_, f32>,
        eval_sets: &[EvalSet<'_>],
        eval_predictions: &[Vec<f32>],
    ) -> Vec<MetricValue> {
        let mut values = Vec::with_capacity(1 + eval_sets.len());
        values.push(self.evaluate("train", train_predictions, train_targets));
        for (set, preds) in eval_sets.iter().zip(eval_predictions) {
            values.push(self.evaluate(
                set.name,
                ArrayView1::from(preds.as_slice()),
                set.dataset.targets(),
            ));
        }
        values
    }

    /// Value monitored for early stopping: the first eval set if any,
    /// otherwise the training metric.
    pub fn early_stop_value(metrics: &[MetricValue]) -> f64 {
        metrics
            .get(1)
            .or_else(|| metrics.first())
            .map_or(f64::NAN, |m| m.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::{Mae, Rmse};
    use ndarray::array;

    #[test]
    fn metric_value_direction() {
        let low = MetricValue::new("rmse", 1.0, false);
        let high = MetricValue::new("rmse", 2.0, false);
        assert!(low.is_better_than(&high));
        assert!(!high.is_better_than(&low));

        let r2 = MetricValue::new("r2", 0.9, true);
        assert!(r2.is_better_than_value(0.5));
    }

    #[test]
    fn evaluate_round_names_sets() {
        let eval = Dataset::unnamed(array![[0.0f32], [1.0]], array![1.0f32, 3.0]).unwrap();
        let evaluator = Evaluator::new(&Mae);
        let values = evaluator.evaluate_round(
            array![1.0f32, 2.0].view(),
            array![1.0f32, 2.0].view(),
            &[EvalSet::new("valid", &eval)],
            &[vec![2.0, 2.0]],
        );

        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "train-mae");
        assert_eq!(values[0].value, 0.0);
        assert_eq!(values[1].name, "valid-mae");
        assert_eq!(values[1].value, 1.0);
        assert_eq!(Evaluator::<Rmse>::early_stop_value(&values), 1.0);
        assert_eq!(Evaluator::<Rmse>::early_stop_value(&values[..1]), 0.0);
    }
}
