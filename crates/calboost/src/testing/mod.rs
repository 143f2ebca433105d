//! Test and benchmark support.
//!
//! Deterministic synthetic exercise/calories data, so tests and benches do
//! not depend on the real input files.

pub mod data;

pub use data::{random_features, synthetic_records, synthetic_table, write_csv_pair};
