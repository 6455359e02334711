use std::fs::File;
use std::path::PathBuf;

use mpt_fit::app::pipeline::run_fit;
use mpt_fit::data::{SampleConfig, generate_sample};
use mpt_fit::io::write_observations_csv;
use mpt_fit::report::{format_fit_json, format_fit_summary};
use mpt_fit::{FitOptions, FitResult, ModelKind};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mptfit-{}-{name}", std::process::id()))
}

#[test]
fn sample_csv_fits_back_to_its_parameters() {
    let sample = generate_sample(&SampleConfig {
        model: ModelKind::PowerLaw,
        params: vec![0.2, 0.6],
        points: 25,
        x_min: 0.05,
        x_max: 5.0,
        noise: 0.02,
        seed: 5,
    })
    .unwrap();

    let csv_path = temp_path("input.csv");
    write_observations_csv(File::create(&csv_path).unwrap(), &sample.observations).unwrap();
    let run = run_fit(&csv_path, ModelKind::PowerLaw, &FitOptions::default());
    std::fs::remove_file(&csv_path).ok();
    let run = run.unwrap();

    assert_eq!(run.ingest.rows_used, 25);
    assert!(run.ingest.row_errors.is_empty());
    let p = run.result.optimized_parameters();
    assert!((p[0] - 0.2).abs() < 0.02, "a = {}", p[0]);
    assert!((p[1] - 0.6).abs() < 0.02, "b = {}", p[1]);
    assert_eq!(run.result.original_data().x, sample.observations.x());
    assert!(format_fit_summary(&run.result).contains("power law"));
}

#[test]
fn kelvin_fit_from_csv_with_bad_rows() {
    let csv_path = temp_path("kelvin.csv");
    let mut text = String::from("lag,msd,weight\n");
    for i in 1..=20 {
        let x = 0.25 * i as f64;
        let y = 1.5 * (1.0 - (-0.8 * x).exp());
        text.push_str(&format!("{x},{y},1\n"));
    }
    text.push_str("oops,1,1\n");
    std::fs::write(&csv_path, text).unwrap();

    let run = run_fit(&csv_path, ModelKind::Kelvin { terms: 1 }, &FitOptions::default());
    std::fs::remove_file(&csv_path).ok();
    let run = run.unwrap();

    assert_eq!(run.ingest.rows_read, 21);
    assert_eq!(run.ingest.row_errors.len(), 1);
    assert_eq!(run.ingest.row_errors[0].line, 22);
    let p = run.result.optimized_parameters();
    assert!((p[0] - 1.5).abs() < 1e-6);
    assert!((p[1] - 0.8).abs() < 1e-6);
}

#[test]
fn json_output_decodes_to_the_same_result_shape() {
    let csv_path = temp_path("two-points.csv");
    std::fs::write(&csv_path, "x,y\n1,3\n2,12\n").unwrap();
    let run = run_fit(&csv_path, ModelKind::PowerLaw, &FitOptions::default());
    std::fs::remove_file(&csv_path).ok();
    let run = run.unwrap();

    let json = format_fit_json(&run.result).unwrap();
    assert!(json.contains("null"));
    let back: FitResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.model(), ModelKind::PowerLaw);
    assert_eq!(back.cov_matrix().shape(), (2, 2));
    assert!(back.cov_matrix().iter().all(|v| v.is_infinite()));
    assert!(back.summary().reduced_chi_square.is_infinite());
}

#[test]
fn missing_input_file_is_a_usage_error() {
    let err = run_fit(&temp_path("does-not-exist.csv"), ModelKind::PowerLaw, &FitOptions::default()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
