//! Data loading and preparation.
//!
//! # Overview
//!
//! - [`records`]: Typed CSV records for the exercise and calories tables
//! - [`table`]: [`CaloriesTable`], the positional merge of both tables
//! - [`dataset`]: [`Dataset`], the feature matrix and target vector
//! - [`split`]: Deterministic train/test splitting
//! - [`binned`]: Quantile binning for histogram-based training
//!
//! # Layout
//!
//! Feature matrices are **sample-major**: `[n_samples, n_features]`.
//! The binned training matrix is stored **feature-major** so histogram
//! building reads one contiguous column per feature.

use std::path::PathBuf;

pub mod binned;
pub mod dataset;
pub mod records;
pub mod split;
pub mod table;

pub use binned::{BinMapper, BinnedDataset, MISSING_BIN};
pub use dataset::Dataset;
pub use records::{
    CaloriesRecord, ColumnDtypes, CsvTable, Dtype, ExerciseRecord, Gender, load_calories, load_calories_table,
    load_exercise, load_exercise_table,
};
pub use split::{TrainTestSplit, split_indices, train_test_split};
pub use table::{CaloriesTable, Column, ColumnInfo, Observation};

/// Errors raised while loading or shaping data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// An input file could not be opened.
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A CSV row could not be parsed.
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// A gender cell held something other than `male` or `female`.
    #[error("unknown gender {value:?} on line {line}")]
    UnknownGender { line: u64, value: String },

    /// A calories row had no target value.
    #[error("missing calories value on line {line}")]
    MissingTarget { line: u64 },

    /// The two tables cannot be joined by row position.
    #[error("row count mismatch: exercise table has {exercise} rows, calories table has {calories}")]
    RowCountMismatch { exercise: usize, calories: usize },

    /// An input table had no data rows.
    #[error("{what} has no rows")]
    Empty { what: &'static str },

    /// Array dimensions disagree.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// The test fraction is outside `[0, 1)`.
    #[error("test fraction must be in [0, 1), got {0}")]
    InvalidTestFraction(f64),
}
