//! End-to-end runs over CSV fixtures.

use std::fs;
use std::path::Path;

use calboost::data::{DataError, split_indices};
use calboost::pipeline::{self, PipelineConfig, PipelineError};
use calboost::testing::write_csv_pair;
use rstest::rstest;

fn quick_config(dir: &Path, rows: usize, seed: u64) -> PipelineConfig {
    let (exercise_path, calories_path) = write_csv_pair(dir, rows, seed).unwrap();
    let mut config = PipelineConfig {
        exercise_path,
        calories_path,
        ..Default::default()
    };
    config.model.n_trees = 20;
    config.model.n_threads = 1;
    config
}

#[rstest]
#[case(50)]
#[case(123)]
#[case(400)]
fn split_sizes_follow_test_fraction(#[case] rows: usize) {
    let dir = tempfile::tempdir().unwrap();
    let report = pipeline::run(&quick_config(dir.path(), rows, 1)).unwrap();

    let test_rows = (rows as f64 * 0.2).round() as usize;
    assert_eq!(report.x_shape, (rows, 7));
    assert_eq!(report.x_test_shape, (test_rows, 7));
    assert_eq!(report.x_train_shape, (rows - test_rows, 7));
    assert!(report.mae.is_finite() && report.mae >= 0.0);
}

#[test]
fn features_exclude_identifier_and_target() {
    let dir = tempfile::tempdir().unwrap();
    let report = pipeline::run(&quick_config(dir.path(), 60, 2)).unwrap();
    assert_eq!(
        report.feature_names,
        ["Gender", "Age", "Height", "Weight", "Duration", "Heart_Rate", "Body_Temp"]
    );
}

#[test]
fn runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path(), 150, 3);
    let first = pipeline::run(&config).unwrap();
    let second = pipeline::run(&config).unwrap();
    assert_eq!(first.mae, second.mae);
    assert_eq!(first.predictions_preview, second.predictions_preview);
    assert_eq!(split_indices(150, 0.2, 2).unwrap(), split_indices(150, 0.2, 2).unwrap());
}

#[test]
fn default_model_fits_synthetic_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = quick_config(dir.path(), 1000, 4);
    config.model.n_trees = 100;
    let report = pipeline::run(&config).unwrap();

    // Synthetic targets carry ±2 uniform noise.
    assert!(report.mae < 6.0, "mae = {}", report.mae);
    assert!(report.r2 > 0.95, "r2 = {}", report.r2);
    assert!(report.rmse >= report.mae);
    assert_eq!(report.n_trees, 100);
    assert_eq!(report.predictions_preview.len(), 5);
    assert!(report.history.is_empty());
}

#[test]
fn monitoring_records_test_metric() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.toml");
    let (exercise_path, calories_path) = write_csv_pair(dir.path(), 200, 5).unwrap();
    fs::write(
        &config_path,
        format!(
            "exercise_path = {:?}\ncalories_path = {:?}\n\n[model]\nn_trees = 15\nn_threads = 1\nmetric = \"mae\"\n",
            exercise_path, calories_path
        ),
    )
    .unwrap();

    let config = PipelineConfig::from_toml_file(&config_path).unwrap();
    let report = pipeline::run(&config).unwrap();
    assert_eq!(report.history.len(), 15);
    assert_eq!(report.history[14][1].name, "test-mae");
    assert!((report.history[14][1].value - report.mae).abs() < 1e-3);
}

#[test]
fn json_report_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let report = pipeline::run(&quick_config(dir.path(), 80, 6)).unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["x_test_shape"][0], 16);
    assert!(json["mae"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["exploration"]["shape"][1], 9);
    assert_eq!(json["exploration"]["correlation"]["names"][0], "User_ID");
}

#[test]
fn missing_cells_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path(), 60, 7);

    // Blank the Duration of the first data row and the Gender of the second.
    let text = fs::read_to_string(&config.exercise_path).unwrap();
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let mut first: Vec<&str> = lines[1].split(',').collect();
    first[5] = "";
    lines[1] = first.join(",");
    let mut second: Vec<&str> = lines[2].split(',').collect();
    second[1] = "";
    lines[2] = second.join(",");
    fs::write(&config.exercise_path, lines.join("\n")).unwrap();

    let report = pipeline::run(&config).unwrap();
    let nulls = &report.exploration.null_counts;
    assert!(nulls.contains(&("Duration", 1)));
    assert!(nulls.contains(&("Gender", 1)));
    assert!(report.mae.is_finite());
}

#[test]
fn row_count_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path(), 30, 8);
    let text = fs::read_to_string(&config.calories_path).unwrap();
    let truncated: Vec<&str> = text.lines().take(20).collect();
    fs::write(&config.calories_path, truncated.join("\n")).unwrap();

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Data(DataError::RowCountMismatch {
            exercise: 30,
            calories: 19
        })
    ));
}

#[test]
fn unknown_gender_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(dir.path(), 10, 9);
    let text = fs::read_to_string(&config.exercise_path).unwrap();
    let replaced = text.replacen("female", "unknown", 1).replacen("male", "unknown", 1);
    fs::write(&config.exercise_path, replaced).unwrap();

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Data(DataError::UnknownGender { .. })));
}

#[test]
fn missing_input_file_names_the_path() {
    let config = PipelineConfig {
        exercise_path: "/no/such/exercise.csv".into(),
        calories_path: "/no/such/calories.csv".into(),
        ..Default::default()
    };
    let err = pipeline::run(&config).unwrap_err();
    assert!(err.to_string().contains("/no/such/calories.csv"));
}
