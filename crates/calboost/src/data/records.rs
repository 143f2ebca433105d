//! Typed records for the exercise and calories CSV tables.
//!
//! Both files carry a header row. Empty cells in feature columns are read as
//! missing values; an empty `Calories` cell is an error.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use super::DataError;

// =============================================================================
// Gender
// =============================================================================

/// Binary gender category of an exercise record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a raw cell. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("male") {
            Some(Gender::Male)
        } else if raw.eq_ignore_ascii_case("female") {
            Some(Gender::Female)
        } else {
            None
        }
    }

    /// Numeric code used in the feature matrix: male → 0, female → 1.
    #[inline]
    pub fn code(self) -> f32 {
        match self {
            Gender::Male => 0.0,
            Gender::Female => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// One row of the exercise table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRecord {
    #[serde(rename = "User_ID")]
    pub user_id: u64,
    #[serde(rename = "Gender")]
    pub gender: Option<Gender>,
    #[serde(rename = "Age")]
    pub age: Option<f32>,
    #[serde(rename = "Height")]
    pub height: Option<f32>,
    #[serde(rename = "Weight")]
    pub weight: Option<f32>,
    #[serde(rename = "Duration")]
    pub duration: Option<f32>,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: Option<f32>,
    #[serde(rename = "Body_Temp")]
    pub body_temp: Option<f32>,
}

/// One row of the calories table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaloriesRecord {
    #[serde(rename = "User_ID")]
    pub user_id: u64,
    #[serde(rename = "Calories")]
    pub calories: f32,
}

/// Exercise row as it appears on disk, before gender validation.
#[derive(Debug, Deserialize)]
struct RawExerciseRecord {
    #[serde(rename = "User_ID")]
    user_id: u64,
    #[serde(rename = "Gender")]
    gender: Option<String>,
    #[serde(rename = "Age")]
    age: Option<f32>,
    #[serde(rename = "Height")]
    height: Option<f32>,
    #[serde(rename = "Weight")]
    weight: Option<f32>,
    #[serde(rename = "Duration")]
    duration: Option<f32>,
    #[serde(rename = "Heart_Rate")]
    heart_rate: Option<f32>,
    #[serde(rename = "Body_Temp")]
    body_temp: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawCaloriesRecord {
    #[serde(rename = "User_ID")]
    user_id: u64,
    #[serde(rename = "Calories")]
    calories: Option<f32>,
}

// =============================================================================
// Dtypes
// =============================================================================

/// Column type as a dataframe reader infers it from the raw cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Int64,
    Float64,
    Object,
}

impl Dtype {
    /// Type of one non-empty cell.
    fn of_cell(cell: &str) -> Self {
        if cell.parse::<i64>().is_ok() {
            Dtype::Int64
        } else if cell.parse::<f64>().is_ok() {
            Dtype::Float64
        } else {
            Dtype::Object
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
            Dtype::Object => "object",
        }
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dtype of every column of one CSV file, in header order.
///
/// A non-numeric cell makes a column `object`. Otherwise a decimal point or
/// exponent in any cell, or any empty cell, makes it `float64`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDtypes {
    columns: Vec<(String, Dtype)>,
}

impl ColumnDtypes {
    pub fn get(&self, name: &str) -> Option<Dtype> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, d)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Dtype)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), *d))
    }

    /// Add the columns of `other` that are not already known.
    pub fn merge(&mut self, other: ColumnDtypes) {
        for (name, dtype) in other.columns {
            if self.get(&name).is_none() {
                self.columns.push((name, dtype));
            }
        }
    }
}

/// Widest cell type and missing-cell flag per column, updated row by row.
struct DtypeScan {
    widest: Vec<Option<Dtype>>,
    has_empty: Vec<bool>,
}

impl DtypeScan {
    fn new(n_columns: usize) -> Self {
        Self {
            widest: vec![None; n_columns],
            has_empty: vec![false; n_columns],
        }
    }

    fn observe(&mut self, record: &StringRecord) {
        for (i, cell) in record.iter().enumerate().take(self.widest.len()) {
            if cell.is_empty() {
                self.has_empty[i] = true;
            } else {
                let dtype = Dtype::of_cell(cell);
                self.widest[i] = Some(self.widest[i].map_or(dtype, |w| w.max(dtype)));
            }
        }
    }

    fn finish(self, headers: &StringRecord) -> ColumnDtypes {
        let columns = headers
            .iter()
            .zip(self.widest.into_iter().zip(self.has_empty))
            .map(|(name, (widest, has_empty))| {
                let dtype = match (widest, has_empty) {
                    (None, _) | (Some(Dtype::Int64), true) => Dtype::Float64,
                    (Some(dtype), _) => dtype,
                };
                (name.to_string(), dtype)
            })
            .collect();
        ColumnDtypes { columns }
    }
}

// =============================================================================
// CsvTable
// =============================================================================

/// Records of one CSV file with the dtypes of its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable<T> {
    pub records: Vec<T>,
    pub dtypes: ColumnDtypes,
}

impl<T> CsvTable<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records.
    pub fn head(&self, n: usize) -> &[T] {
        &self.records[..n.min(self.records.len())]
    }
}

impl CsvTable<ExerciseRecord> {
    /// Render the first `n` records as an aligned text table.
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
                ]
            })
            .collect();
        render_aligned(&EXERCISE_COLUMNS, &rows)
    }
}

impl CsvTable<CaloriesRecord> {
    /// Render the first `n` records as an aligned text table.
    pub fn render_head(&self, n: usize) -> String {
        let rows: Vec<Vec<String>> = self
            .head(n)
            .iter()
            .map(|r| vec![r.user_id.to_string(), format_cell(Some(r.calories))])
            .collect();
        render_aligned(&CALORIES_COLUMNS, &rows)
    }
}

const EXERCISE_COLUMNS: [&str; 8] = [
    "User_ID",
    "Gender",
    "Age",
    "Height",
    "Weight",
    "Duration",
    "Heart_Rate",
    "Body_Temp",
];
const CALORIES_COLUMNS: [&str; 2] = ["User_ID", "Calories"];

/// One decimal, `NaN` when missing.
pub(crate) fn format_cell(value: Option<f32>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.1}"))
}

/// Right-aligned columns, each as wide as its widest cell or header.
pub(crate) fn render_aligned<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let widths: Vec<usize> = (0..headers.len())
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c).map(|cell| cell.as_ref().len()))
                .chain(std::iter::once(headers[c].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (name, width) in headers.iter().zip(widths.iter().copied()) {
        let _ = write!(out, "{name:>width$} ");
    }
    out.push('\n');
    for row in rows {
        for (cell, width) in row.iter().zip(widths.iter().copied()) {
            let _ = write!(out, "{:>width$} ", cell.as_ref());
        }
        out.push('\n');
    }
    out
}

// =============================================================================
// Loading
// =============================================================================

/// Load the exercise table from a CSV file.
pub fn load_exercise<P: AsRef<Path>>(path: P) -> Result<Vec<ExerciseRecord>, DataError> {
    Ok(load_exercise_table(path)?.records)
}

/// Load the exercise table and its column dtypes.
pub fn load_exercise_table<P: AsRef<Path>>(path: P) -> Result<CsvTable<ExerciseRecord>, DataError> {
    read_exercise_table(open(path.as_ref())?)
}

/// Load the calories table from a CSV file.
pub fn load_calories<P: AsRef<Path>>(path: P) -> Result<Vec<CaloriesRecord>, DataError> {
    Ok(load_calories_table(path)?.records)
}

/// Load the calories table and its column dtypes.
pub fn load_calories_table<P: AsRef<Path>>(path: P) -> Result<CsvTable<CaloriesRecord>, DataError> {
    read_calories_table(open(path.as_ref())?)
}

/// Read the exercise table from any reader.
pub fn read_exercise<R: Read>(reader: R) -> Result<Vec<ExerciseRecord>, DataError> {
    Ok(read_exercise_table(reader)?.records)
}

/// Read the exercise table and its column dtypes from any reader.
pub fn read_exercise_table<R: Read>(reader: R) -> Result<CsvTable<ExerciseRecord>, DataError> {
    read_rows(reader, |raw: RawExerciseRecord, line| {
        let gender = match raw.gender {
            None => None,
            Some(value) => Some(
                Gender::parse(&value).ok_or(DataError::UnknownGender { line, value })?,
            ),
        };
        Ok(ExerciseRecord {
            user_id: raw.user_id,
            gender,
            age: raw.age,
            height: raw.height,
            weight: raw.weight,
            duration: raw.duration,
            heart_rate: raw.heart_rate,
            body_temp: raw.body_temp,
        })
    })
}

/// Read the calories table from any reader.
pub fn read_calories<R: Read>(reader: R) -> Result<Vec<CaloriesRecord>, DataError> {
    Ok(read_calories_table(reader)?.records)
}

/// Read the calories table and its column dtypes from any reader.
pub fn read_calories_table<R: Read>(reader: R) -> Result<CsvTable<CaloriesRecord>, DataError> {
    read_rows(reader, |raw: RawCaloriesRecord, line| {
        let calories = raw.calories.ok_or(DataError::MissingTarget { line })?;
        Ok(CaloriesRecord {
            user_id: raw.user_id,
            calories,
        })
    })
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize every row and convert it, tracking the source line for errors
/// and the dtype of each column.
fn read_rows<R, Raw, T, F>(reader: R, mut convert: F) -> Result<CsvTable<T>, DataError>
where
    R: Read,
    Raw: for<'de> Deserialize<'de>,
    F: FnMut(Raw, u64) -> Result<T, DataError>,
{
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers: StringRecord = reader.headers()?.clone();
    let mut scan = DtypeScan::new(headers.len());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        scan.observe(&record);
        let raw: Raw = record.deserialize(Some(&headers))?;
        records.push(convert(raw, line)?);
    }
    Ok(CsvTable {
        records,
        dtypes: scan.finish(&headers),
    })
}
