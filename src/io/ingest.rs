//! CSV ingest and normalization.
//!
//! Turns a tracking-analysis CSV into a clean `Observations` set that is safe
//! to fit.
//!
//! - required columns: `x` and `y` (aliases below), optional `weight`
//! - header matching is case-insensitive and ignores a UTF-8 BOM
//! - bad rows are skipped and reported, never silently dropped

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Observations;
use crate::error::AppError;

const X_COLUMNS: [&str; 5] = ["x", "lag", "tau", "t", "lag_time"];
const Y_COLUMNS: [&str; 2] = ["y", "msd"];
const WEIGHT_COLUMNS: [&str; 2] = ["weight", "w"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: observations plus bookkeeping about skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Observations,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load observations from a CSV file.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_observations(file)?;
    log::debug!(
        "read {} rows from {} ({} used, {} skipped)",
        data.rows_read,
        path.display(),
        data.rows_used,
        data.row_errors.len()
    );
    Ok(data)
}

/// Parse observations from any CSV source.
pub fn read_observations<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = find_column(&header_map, &X_COLUMNS)
        .ok_or_else(|| AppError::new(2, "Missing required column: `x` (or `lag`, `tau`, `t`, `lag_time`)"))?;
    let y_idx = find_column(&header_map, &Y_COLUMNS)
        .ok_or_else(|| AppError::new(2, "Missing required column: `y` (or `msd`)"))?;
    let w_idx = find_column(&header_map, &WEIGHT_COLUMNS);

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut weight = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, x_idx, y_idx, w_idx) {
            Ok((xi, yi, wi)) => {
                x.push(xi);
                y.push(yi);
                weight.push(wi);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = x.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }

    let observations = Observations::new(x, y, Some(weight))?;
    Ok(IngestedData {
        observations,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| header_map.get(*name).copied())
}

fn parse_row(
    record: &StringRecord,
    x_idx: usize,
    y_idx: usize,
    w_idx: Option<usize>,
) -> Result<(f64, f64, f64), String> {
    let x = parse_required(record, x_idx, "x")?;
    let y = parse_required(record, y_idx, "y")?;
    let w = match w_idx.and_then(|idx| record.get(idx)).filter(|s| !s.is_empty()) {
        Some(s) => parse_finite(s, "weight")?,
        None => 1.0,
    };
    Ok((x, y, w))
}

fn parse_required(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let s = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))?;
    parse_finite(s, name)
}

fn parse_finite(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("Non-finite `{name}` value '{s}'")),
        Err(_) => Err(format!("Invalid `{name}` value '{s}'")),
    }
}
