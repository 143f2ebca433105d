//! Training progress logging.
//!
//! Events go through `tracing`; the subscriber decides where they end up.
//! [`Verbosity`] gates which events the trainer emits at all.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::eval::MetricValue;

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Nothing at all.
    Silent,
    /// Only problems.
    #[default]
    Warning,
    /// Start/finish and per-round metrics.
    Info,
    /// Per-tree structure details.
    Debug,
}

/// Structured training logger.
pub struct TrainingLogger {
    verbosity: Verbosity,
    n_rounds: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            n_rounds: 0,
            started: None,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize, n_samples: usize, n_features: usize) {
        self.n_rounds = n_rounds;
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_rounds, n_samples, n_features, "training started");
        }
    }

    pub fn log_metrics(&self, round: usize, metrics: &[MetricValue]) {
        if self.verbosity < Verbosity::Info || metrics.is_empty() {
            return;
        }
        let summary = metrics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("  ");
        tracing::info!(round, total = self.n_rounds, "[{round}] {summary}");
    }

    pub fn log_tree(&self, round: usize, n_leaves: usize, depth: usize) {
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(round, n_leaves, depth, "tree grown");
        }
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric: &str) {
        if self.verbosity >= Verbosity::Info {
            tracing::info!(round, best_round, metric, "early stopping");
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            tracing::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self.started.map_or(0, |s| s.elapsed().as_millis());
            tracing::info!(n_trees, elapsed_ms, "training finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_is_ordered() {
        assert!(Verbosity::Silent < Verbosity::Warning);
        assert!(Verbosity::Warning < Verbosity::Info);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert_eq!(Verbosity::default(), Verbosity::Warning);
    }

    #[test]
    fn silent_logger_accepts_all_calls() {
        let mut logger = TrainingLogger::new(Verbosity::Silent);
        logger.start_training(10, 100, 7);
        logger.log_metrics(0, &[MetricValue::new("train-rmse", 1.0, false)]);
        logger.log_tree(0, 4, 2);
        logger.log_early_stopping(3, 1, "rmse");
        logger.finish_training(4);
        assert_eq!(logger.verbosity(), Verbosity::Silent);
    }
}
