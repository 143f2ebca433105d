//! Exploratory statistics over the combined table.
//!
//! - [`describe`]: count, mean, std and quantiles per numeric column
//! - [`correlation_matrix`]: pairwise Pearson correlation
//! - [`value_counts`]: frequency of each distinct value
//!
//! All functions take [`Column`](crate::data::Column)s with missing values
//! encoded as NaN and skip the missing entries.

mod correlation;
mod counts;
mod describe;

pub use correlation::{CorrelationMatrix, correlation_matrix, pearson};
pub use counts::value_counts;
pub use describe::{ColumnSummary, describe, render_describe};
