//! The end-to-end calories run.
//!
//! [`run`] loads both tables, explores them, renders figures, trains a
//! regressor on 80% of the rows and scores it on the rest. Each stage is
//! also public so callers can stop early or reuse pieces.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

mod config;

pub use config::{ModelSettings, PipelineConfig};

use crate::analysis::{self, ColumnSummary, CorrelationMatrix};
use crate::data::{self, CaloriesTable, ColumnInfo, DataError, Dataset, Gender};
use crate::model::gbdt::ConfigError;
use crate::model::{GBDTModel, ModelError};
use crate::plot::{self, Figure, PlotError};
use crate::training::{EvalSet, Mae, MetricFn, MetricValue, RSquared, Rmse};
use crate::utils::{Parallelism, run_with_threads};

/// Columns shown as distribution plots.
const DISTRIBUTION_COLUMNS: [&str; 3] = ["Age", "Height", "Weight"];

// =============================================================================
// Errors
// =============================================================================

/// Anything that stops a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid model parameters: {0}")]
    Params(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    /// One side of the split has no rows.
    #[error("split left {train} training rows and {test} test rows; both must be non-empty")]
    DegenerateSplit { train: usize, test: usize },

    #[error("failed to write report {path}: {source}")]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Exploration
// =============================================================================

/// Descriptive view of the combined table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploration {
    /// `(rows, columns)`.
    pub shape: (usize, usize),
    pub info: Vec<ColumnInfo>,
    pub null_counts: Vec<(&'static str, usize)>,
    /// Numeric columns as loaded (gender excluded).
    pub summary: Vec<ColumnSummary>,
    /// Gender counts in order of first appearance.
    pub gender_counts: Vec<(Gender, usize)>,
    /// Pearson correlation of every column after the gender recode.
    pub correlation: CorrelationMatrix,
}

/// Load and join both input tables.
pub fn load_table(config: &PipelineConfig) -> Result<CaloriesTable, PipelineError> {
    let calories = data::load_calories_table(&config.calories_path)?;
    tracing::info!(path = %config.calories_path.display(), rows = calories.len(), "loaded calories table");
    tracing::info!("calories head:\n{}", calories.render_head(config.preview_rows));

    let exercise = data::load_exercise_table(&config.exercise_path)?;
    tracing::info!(path = %config.exercise_path.display(), rows = exercise.len(), "loaded exercise table");
    tracing::info!("exercise head:\n{}", exercise.render_head(config.preview_rows));

    Ok(CaloriesTable::combine_tables(exercise, calories)?)
}

/// Compute every exploratory statistic.
pub fn explore(table: &CaloriesTable, parallelism: Parallelism) -> Exploration {
    let columns = table.numeric_columns();
    let described: Vec<_> = columns.iter().filter(|c| c.name != "Gender").cloned().collect();

    Exploration {
        shape: table.shape(),
        info: table.column_info(),
        null_counts: table.null_counts(),
        summary: analysis::describe(&described),
        gender_counts: table.gender_counts(),
        correlation: analysis::correlation_matrix(&columns, parallelism),
    }
}

/// Log the exploration the way a notebook would display it.
pub fn log_exploration(table: &CaloriesTable, exploration: &Exploration, preview_rows: usize) {
    tracing::info!("combined table head:\n{}", table.render_head(preview_rows));
    tracing::info!(rows = exploration.shape.0, columns = exploration.shape.1, "combined table shape");
    tracing::info!("column info:\n{}", render_info(&exploration.info));

    let mut nulls = String::new();
    for (name, count) in &exploration.null_counts {
        let _ = writeln!(nulls, "{name:<12} {count}");
    }
    tracing::info!("missing values per column:\n{nulls}");
    tracing::info!("summary statistics:\n{}", analysis::render_describe(&exploration.summary));

    let counts: Vec<String> = analysis::value_counts(table.rows().iter().filter_map(|r| r.gender))
        .into_iter()
        .map(|(g, c)| format!("{g}={c}"))
        .collect();
    tracing::info!(counts = %counts.join(", "), "gender value counts");
}

fn render_info(info: &[ColumnInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " #  {:<12} {:>14}  Dtype", "Column", "Non-Null Count");
    for (i, column) in info.iter().enumerate() {
        let _ = writeln!(
            out,
            "{i:>2}  {:<12} {:>5} non-null  {}",
            column.name, column.non_null, column.dtype
        );
    }
    out
}

/// Gender count plot, age/height/weight distributions and the correlation heatmap.
pub fn render_figures(table: &CaloriesTable, exploration: &Exploration, parallelism: Parallelism) -> Vec<Figure> {
    let counts: Vec<(String, usize)> = exploration
        .gender_counts
        .iter()
        .map(|(g, c)| (g.to_string(), *c))
        .collect();

    let mut figures = vec![plot::count_plot("gender_count", "Gender", &counts)];
    for name in DISTRIBUTION_COLUMNS {
        if let Some(column) = table.numeric_column(name) {
            let stem = format!("{}_distribution", name.to_lowercase());
            figures.push(plot::dist_plot(&stem, &column, parallelism));
        }
    }
    figures.push(plot::heatmap("correlation_heatmap", &exploration.correlation));
    figures
}

// =============================================================================
// RunReport
// =============================================================================

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub exploration: Exploration,
    pub feature_names: Vec<String>,
    /// Shapes of `X`, `X_train` and `X_test`.
    pub x_shape: (usize, usize),
    pub x_train_shape: (usize, usize),
    pub x_test_shape: (usize, usize),
    pub n_trees: usize,
    pub best_iteration: Option<usize>,
    /// First test-set predictions.
    pub predictions_preview: Vec<f32>,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    /// Per-round metrics, when monitoring was enabled.
    pub history: Vec<Vec<MetricValue>>,
    /// Figures written to disk.
    pub figures: Vec<PathBuf>,
}

impl RunReport {
    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PipelineError::WriteReport {
            path: path.to_path_buf(),
            source,
        })
    }
}

// =============================================================================
// Run
// =============================================================================

/// Test-set error metrics: `(mae, rmse, r2)`.
pub fn score(predictions: &ndarray::Array1<f32>, test: &Dataset) -> (f64, f64, f64) {
    let (p, y) = (predictions.view(), test.targets());
    (Mae.compute(p, y), Rmse.compute(p, y), RSquared.compute(p, y))
}

/// Run every stage and return the report.
pub fn run(config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    let gbdt_config = config.model.to_gbdt_config()?;

    let table = load_table(config)?;
    let (exploration, figures) = run_with_threads(gbdt_config.n_threads, |parallelism| {
        let exploration = explore(&table, parallelism);
        let figures = render_figures(&table, &exploration, parallelism);
        (exploration, figures)
    });
    log_exploration(&table, &exploration, config.preview_rows);

    let mut written = Vec::new();
    if let Some(dir) = &config.plot_dir {
        for figure in &figures {
            written.push(figure.save(dir)?);
        }
        tracing::info!(dir = %dir.display(), count = written.len(), "wrote figures");
    }

    let dataset = table.to_dataset()?;
    let (train, test) = data::train_test_split(&dataset, config.test_fraction, config.seed)?;
    if train.n_samples() == 0 || test.n_samples() == 0 {
        return Err(PipelineError::DegenerateSplit {
            train: train.n_samples(),
            test: test.n_samples(),
        });
    }
    tracing::info!(
        x = ?dataset.shape(),
        x_train = ?train.shape(),
        x_test = ?test.shape(),
        "split features"
    );

    let eval_sets = if gbdt_config.metric.is_some() {
        vec![EvalSet::new("test", &test)]
    } else {
        Vec::new()
    };
    let model = GBDTModel::train(&train, &eval_sets, gbdt_config)?;
    tracing::info!(model = ?model, "trained regressor");

    let predictions = model.predict(test.features())?;
    let preview: Vec<f32> = predictions.iter().take(config.preview_rows).copied().collect();
    tracing::info!(?preview, "test predictions");

    let (mae, rmse, r2) = score(&predictions, &test);
    tracing::info!(mae, rmse, r2, "test metrics");

    Ok(RunReport {
        exploration,
        feature_names: dataset.feature_names().to_vec(),
        x_shape: dataset.shape(),
        x_train_shape: train.shape(),
        x_test_shape: test.shape(),
        n_trees: model.meta().n_trees,
        best_iteration: model.meta().best_iteration,
        predictions_preview: preview,
        mae,
        rmse,
        r2,
        history: model.history().to_vec(),
        figures: written,
    })
}
