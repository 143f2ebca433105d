use std::path::{Path, PathBuf};

use ndarray::Array2;
use rand::prelude::*;

use crate::data::{CaloriesRecord, CaloriesTable, DataError, ExerciseRecord, Gender};

/// Round to one decimal, the precision of the real tables.
fn tenth(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

/// Generate `rows` exercise records and their calories targets.
///
/// Ranges follow the real data (ages 20-79, 2-30 minute sessions, body
/// temperature 37-41.5 °C). Calories grow with duration, heart rate and
/// weight plus a little uniform noise, so a tree model can fit them well.
/// User IDs are unique and identical at each row position in both tables.
pub fn synthetic_records(rows: usize, seed: u64) -> (Vec<ExerciseRecord>, Vec<CaloriesRecord>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut exercise = Vec::with_capacity(rows);
    let mut calories = Vec::with_capacity(rows);

    for i in 0..rows {
        let user_id = 10_000_000 + i as u64 * 7 + rng.gen_range(0..7);
        let gender = if rng.r#gen::<bool>() { Gender::Male } else { Gender::Female };
        let age = rng.gen_range(20..80) as f32;
        let height = match gender {
            Gender::Male => rng.gen_range(160.0..200.0f32),
            Gender::Female => rng.gen_range(150.0..185.0f32),
        }
        .round();
        let weight = (height - 100.0 + rng.gen_range(-12.0..12.0f32)).round();
        let duration = rng.gen_range(2..31) as f32;
        let heart_rate = (75.0 + duration * 1.2 + rng.gen_range(0.0..12.0f32)).round();
        let body_temp = tenth((37.0 + duration * 0.13 + rng.gen_range(0.0..0.6f32)).min(41.5));

        let burn = duration * (heart_rate - 60.0) * 0.11 + weight * 0.1 + rng.gen_range(-2.0..2.0f32);
        let burn = tenth(burn.max(1.0));

        exercise.push(ExerciseRecord {
            user_id,
            gender: Some(gender),
            age: Some(age),
            height: Some(height),
            weight: Some(weight),
            duration: Some(duration),
            heart_rate: Some(heart_rate),
            body_temp: Some(body_temp),
        });
        calories.push(CaloriesRecord {
            user_id,
            calories: burn,
        });
    }

    (exercise, calories)
}

/// Synthetic records already combined into a table.
pub fn synthetic_table(rows: usize, seed: u64) -> CaloriesTable {
    let (exercise, calories) = synthetic_records(rows, seed);
    CaloriesTable::from_rows(
        exercise
            .into_iter()
            .zip(calories)
            .map(|(e, c)| crate::data::Observation {
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
            .collect(),
    )
}

/// Write `exercise.csv` and `calories.csv` into `dir`.
///
/// Returns `(exercise_path, calories_path)`.
pub fn write_csv_pair(dir: &Path, rows: usize, seed: u64) -> Result<(PathBuf, PathBuf), DataError> {
    let (exercise, calories) = synthetic_records(rows, seed);
    let exercise_path = dir.join("exercise.csv");
    let calories_path = dir.join("calories.csv");
    write_csv(&exercise_path, &exercise)?;
    write_csv(&calories_path, &calories)?;
    Ok((exercise_path, calories_path))
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Random dense features in `[min, max)`, sample-major.
pub fn random_features(rows: usize, cols: usize, seed: u64, min: f32, max: f32) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    Array2::from_shape_fn((rows, cols), |_| min + rng.r#gen::<f32>() * width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_calories, load_exercise};

    #[test]
    fn records_are_deterministic() {
        assert_eq!(synthetic_records(20, 1), synthetic_records(20, 1));
        assert_ne!(synthetic_records(20, 1).0, synthetic_records(20, 2).0);
    }

    #[test]
    fn records_stay_in_range() {
        let (exercise, calories) = synthetic_records(500, 3);
        for (e, c) in exercise.iter().zip(&calories) {
            assert_eq!(e.user_id, c.user_id);
            let age = e.age.unwrap();
            assert!((20.0..80.0).contains(&age));
            assert!(e.body_temp.unwrap() <= 41.5);
            assert!(c.calories >= 1.0);
        }
    }

    #[test]
    fn csv_pair_round_trips_through_loaders() {
        let dir = tempfile::tempdir().unwrap();
        let (exercise_path, calories_path) = write_csv_pair(dir.path(), 25, 9).unwrap();
        let (exercise, calories) = synthetic_records(25, 9);
        assert_eq!(load_exercise(exercise_path).unwrap(), exercise);
        assert_eq!(load_calories(calories_path).unwrap(), calories);
    }

    #[test]
    fn synthetic_table_matches_combine() {
        let (exercise, calories) = synthetic_records(10, 4);
        let combined = CaloriesTable::combine(exercise, calories).unwrap();
        assert_eq!(synthetic_table(10, 4).rows(), combined.rows());
    }
}
