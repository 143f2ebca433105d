//! The combined exercise + calories table.
//!
//! [`CaloriesTable::combine`] joins the two tables **by row position**, the
//! way a column-wise concatenation does. Row counts must agree; identifier
//! disagreements are logged but do not stop the join.

use ndarray::{Array1, Array2};

use super::records::{
    CaloriesRecord, ColumnDtypes, CsvTable, Dtype, ExerciseRecord, Gender, format_cell, render_aligned,
};
use super::{DataError, Dataset};

/// Identifier column, never a feature.
pub const ID_COLUMN: &str = "User_ID";
/// Target column, never a feature.
pub const TARGET_COLUMN: &str = "Calories";

/// All columns of the combined table, in order.
pub const COLUMNS: [&str; 9] = [
    ID_COLUMN,
    "Gender",
    "Age",
    "Height",
    "Weight",
    "Duration",
    "Heart_Rate",
    "Body_Temp",
    TARGET_COLUMN,
];

/// Predictor columns: every column except the identifier and the target.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "Duration",
    "Heart_Rate",
    "Body_Temp",
];

// =============================================================================
// Observation
// =============================================================================

/// One row of the combined table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub user_id: u64,
    pub gender: Option<Gender>,
    pub age: Option<f32>,
    pub height: Option<f32>,
    pub weight: Option<f32>,
    pub duration: Option<f32>,
    pub heart_rate: Option<f32>,
    pub body_temp: Option<f32>,
    pub calories: f32,
}

impl Observation {
    /// Feature values in [`FEATURE_COLUMNS`] order, gender recoded, missing as NaN.
    pub fn features(&self) -> [f32; 7] {
        let v = |x: Option<f32>| x.unwrap_or(f32::NAN);
        [
            self.gender.map_or(f32::NAN, Gender::code),
            v(self.age),
            v(self.height),
            v(self.weight),
            v(self.duration),
            v(self.heart_rate),
            v(self.body_temp),
        ]
    }
}

// =============================================================================
// Column summaries
// =============================================================================

/// A named numeric column (missing values are NaN).
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub values: Vec<f64>,
}

impl Column {
    /// Non-missing values only.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }
}

/// Per-column type and completeness information.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub non_null: usize,
    pub dtype: &'static str,
}

// =============================================================================
// CaloriesTable
// =============================================================================

/// Exercise records with their calories target attached.
#[derive(Debug, Clone, Default)]
pub struct CaloriesTable {
    rows: Vec<Observation>,
    /// Dtypes read from the source files; empty for in-memory tables.
    dtypes: ColumnDtypes,
}

impl CaloriesTable {
    /// Join both tables by row position.
    ///
    /// # Errors
    ///
    /// - [`DataError::Empty`] if either table has no rows
    /// - [`DataError::RowCountMismatch`] if the row counts differ
    pub fn combine(
        exercise: Vec<ExerciseRecord>,
        calories: Vec<CaloriesRecord>,
    ) -> Result<Self, DataError> {
        if exercise.is_empty() {
            return Err(DataError::Empty { what: "exercise table" });
        }
        if calories.is_empty() {
            return Err(DataError::Empty { what: "calories table" });
        }
        if exercise.len() != calories.len() {
            return Err(DataError::RowCountMismatch {
                exercise: exercise.len(),
                calories: calories.len(),
            });
        }

        let mismatched: Vec<usize> = exercise
            .iter()
            .zip(&calories)
            .enumerate()
            .filter(|(_, (e, c))| e.user_id != c.user_id)
            .map(|(i, _)| i)
            .collect();
        if let Some(&first) = mismatched.first() {
            tracing::warn!(
                count = mismatched.len(),
                first_row = first,
                "User_ID differs between tables at the same row position; joining by position anyway"
            );
        }

        let rows = exercise
            .into_iter()
            .zip(calories)
            .map(|(e, c)| Observation {
                user_id: e.user_id,
                gender: e.gender,
                age: e.age,
                height: e.height,
                weight: e.weight,
                duration: e.duration,
                heart_rate: e.heart_rate,
                body_temp: e.body_temp,
                calories: c.calories,
            })
            .collect();

        Ok(Self {
            rows,
            dtypes: ColumnDtypes::default(),
        })
    }

    /// [`combine`](Self::combine) two loaded files, keeping their column dtypes.
    pub fn combine_tables(
        exercise: CsvTable<ExerciseRecord>,
        calories: CsvTable<CaloriesRecord>,
    ) -> Result<Self, DataError> {
        let mut dtypes = exercise.dtypes;
        dtypes.merge(calories.dtypes);
        let mut table = Self::combine(exercise.records, calories.records)?;
        table.dtypes = dtypes;
        Ok(table)
    }

    /// Build a table directly from observations.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self {
            rows,
            dtypes: ColumnDtypes::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), COLUMNS.len())
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[Observation] {
        &self.rows[..n.min(self.rows.len())]
    }

    // =========================================================================
    // Exploration
    // =========================================================================

    /// Missing-value count per column.
    pub fn null_counts(&self) -> Vec<(&'static str, usize)> {
        self.column_info()
            .into_iter()
            .map(|info| (info.name, self.rows.len() - info.non_null))
            .collect()
    }

    /// Column names, non-null counts and dtypes.
    ///
    /// Dtypes come from the source text when the table was loaded from files.
    /// Otherwise a numeric column is `int64` when every value is present and
    /// integral, `float64` if not, and gender is `object`.
    pub fn column_info(&self) -> Vec<ColumnInfo> {
        let n = self.rows.len();
        let mut info = Vec::with_capacity(COLUMNS.len());
        let dtype_of = |name: &str, inferred: &'static str| self.dtypes.get(name).map_or(inferred, Dtype::as_str);

        info.push(ColumnInfo {
            name: ID_COLUMN,
            non_null: n,
            dtype: dtype_of(ID_COLUMN, "int64"),
        });
        info.push(ColumnInfo {
            name: "Gender",
            non_null: self.rows.iter().filter(|r| r.gender.is_some()).count(),
            dtype: dtype_of("Gender", "object"),
        });

        let numeric: [(&'static str, fn(&Observation) -> Option<f32>); 7] = [
            ("Age", |r| r.age),
            ("Height", |r| r.height),
            ("Weight", |r| r.weight),
            ("Duration", |r| r.duration),
            ("Heart_Rate", |r| r.heart_rate),
            ("Body_Temp", |r| r.body_temp),
            (TARGET_COLUMN, |r| Some(r.calories)),
        ];
        for (name, get) in numeric {
            let non_null = self.rows.iter().filter(|r| get(r).is_some()).count();
            let integral = self
                .rows
                .iter()
                .filter_map(get)
                .all(|v| v.fract() == 0.0);
            let inferred = if non_null == n && integral { "int64" } else { "float64" };
            info.push(ColumnInfo {
                name,
                non_null,
                dtype: dtype_of(name, inferred),
            });
        }

        info
    }

    /// Gender value counts in order of first appearance (missing excluded).
    pub fn gender_counts(&self) -> Vec<(Gender, usize)> {
        let mut counts: Vec<(Gender, usize)> = Vec::with_capacity(2);
        for gender in self.rows.iter().filter_map(|r| r.gender) {
            match counts.iter_mut().find(|(g, _)| *g == gender) {
                Some((_, c)) => *c += 1,
                None => counts.push((gender, 1)),
            }
        }
        counts
    }

    /// All columns as numbers, with gender recoded (male → 0, female → 1).
    pub fn numeric_columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = COLUMNS
            .iter()
            .map(|&name| Column {
                name,
                values: Vec::with_capacity(self.rows.len()),
            })
            .collect();

        for row in &self.rows {
            columns[0].values.push(row.user_id as f64);
            for (col, value) in columns[1..8].iter_mut().zip(row.features()) {
                col.values.push(value as f64);
            }
            columns[8].values.push(row.calories as f64);
        }

        columns
    }

    /// Numeric column by name.
    pub fn numeric_column(&self, name: &str) -> Option<Column> {
        self.numeric_columns().into_iter().find(|c| c.name == name)
    }

    // =========================================================================
    // Features and target
    // =========================================================================

    /// Split into a feature matrix (identifier and target dropped) and the
    /// calories target vector.
    pub fn to_dataset(&self) -> Result<Dataset, DataError> {
        let n_rows = self.rows.len();
        let n_features = FEATURE_COLUMNS.len();

        let flat: Vec<f32> = self.rows.iter().flat_map(|r| r.features()).collect();
        let features = Array2::from_shape_vec((n_rows, n_features), flat).map_err(|e| {
            DataError::ShapeMismatch {
                expected: format!("[{n_rows}, {n_features}]"),
                got: e.to_string(),
            }
        })?;
        let targets: Array1<f32> = self.rows.iter().map(|r| r.calories).collect();

        Dataset::new(
            features,
            targets,
            FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Render the first `n` rows as an aligned text table.
    pub fn render_head(&self, n: usize) -> String {
        let rows: Vec<Vec<String>> = self
            .head(n)
            .iter()
            .map(|r| {
                vec![
                    r.user_id.to_string(),
                    r.gender.map_or_else(|| "NaN".to_string(), |g| g.to_string()),
                    format_cell(r.age),
                    format_cell(r.height),
                    format_cell(r.weight),
                    format_cell(r.duration),
                    format_cell(r.heart_rate),
                    format_cell(r.body_temp),
                    format_cell(Some(r.calories)),
                ]
            })
            .collect();
        render_aligned(&COLUMNS, &rows)
    }
}
