//! Early stopping callback for training.
//!
//! Monitors a validation metric and stops training when no improvement is seen
//! for a specified number of rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// The value is the best seen so far.
    Improved,
    /// Patience exhausted; training should stop.
    Stop,
    /// No improvement, but still within patience.
    Continue,
}

/// Early stopping configuration and state.
///
/// A patience of 0 disables early stopping.
///
/// # Example
///
/// ```
/// use calboost::training::{EarlyStopping, EarlyStopAction};
///
/// let mut early_stop = EarlyStopping::new(2, false);
/// assert_eq!(early_stop.update(1.0), EarlyStopAction::Improved);
/// assert_eq!(early_stop.update(1.5), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(1.6), EarlyStopAction::Stop);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
    higher_is_better: bool,
}

impl EarlyStopping {
    /// Create a new early stopping callback.
    ///
    /// * `patience` - Rounds without improvement before stopping
    /// * `higher_is_better` - Whether higher metric values indicate improvement
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record the metric value for the current round.
    ///
    /// NaN never counts as an improvement.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let is_improvement = !value.is_nan()
            && match self.best_value {
                None => true,
                Some(best) if self.higher_is_better => value > best,
                Some(best) => value < best,
            };

        let round = self.current_round;
        self.current_round += 1;

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = round;
            EarlyStopAction::Improved
        } else if self.current_round - self.best_round > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Round (0-based) at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn reset(&mut self) {
        self.best_value = None;
        self.best_round = 0;
        self.current_round = 0;
    }
}
