//! Formatted terminal output for a fit: summary text, per-point table, JSON.
//!
//! Formatting code lives in one place so the fitting code stays clean and
//! output changes stay localized.

use crate::domain::FitResult;
use crate::error::AppError;

/// Format the full fit summary: dataset ranges, solver outcome, diagnostics
/// and a parameter table with standard errors.
pub fn format_fit_summary(result: &FitResult) -> String {
    let summary = result.summary();
    let data = result.original_data();
    let mut out = String::new();

    out.push_str(&format!("=== mptfit - {} fit ===\n", result.model().display_name()));
    if let (Some((x_min, x_max)), Some((y_min, y_max))) = (min_max(&data.x), min_max(&data.y)) {
        out.push_str(&format!(
            "Points: n={} | x=[{}, {}] | y=[{}, {}]\n",
            summary.n_points,
            fmt_num(x_min),
            fmt_num(x_max),
            fmt_num(y_min),
            fmt_num(y_max),
        ));
    }
    out.push_str(&format!(
        "Solver: {} after {} evaluations{}\n",
        summary.termination,
        summary.evaluations,
        if summary.converged { "" } else { " (NOT converged)" },
    ));

    out.push_str("\nDiagnostics:\n");
    out.push_str(&format!("- weighted SSE      : {}\n", fmt_num(summary.weighted_sse)));
    out.push_str(&format!("- RMSE              : {}\n", fmt_num(summary.rmse)));
    out.push_str(&format!("- reduced chi-square: {}\n", fmt_num(summary.reduced_chi_square)));

    out.push_str("\nParameters:\n");
    out.push_str(&format!("{:<6} {:>14} {:>14}\n", "name", "value", "std_err"));
    out.push_str(&format!("{:-<6} {:-<14} {:-<14}\n", "", "", ""));
    let names = result.model().param_names();
    for (i, value) in result.optimized_parameters().iter().enumerate() {
        let name = names.get(i).map(String::as_str).unwrap_or("?");
        let se = summary.std_errors.get(i).copied().unwrap_or(f64::INFINITY);
        out.push_str(&format!("{:<6} {:>14} {:>14}\n", name, fmt_num(*value), fmt_num(se)));
    }

    out
}

/// Per-point table: `x`, observed `y`, fitted value, residual and weight.
pub fn format_fitted_table(result: &FitResult) -> String {
    let data = result.original_data();
    let mut out = String::new();
    out.push_str(&format!(
        "{:>14} {:>14} {:>14} {:>14} {:>10}\n",
        "x", "y", "fitted", "residual", "weight"
    ));
    out.push_str(&format!("{:-<14} {:-<14} {:-<14} {:-<14} {:-<10}\n", "", "", "", "", ""));
    for (((x, y), fitted), w) in data.x.iter().zip(&data.y).zip(result.fitted_data()).zip(result.weights()) {
        out.push_str(&format!(
            "{:>14} {:>14} {:>14} {:>14} {:>10}\n",
            fmt_num(*x),
            fmt_num(*y),
            fmt_num(*fitted),
            fmt_num(y - fitted),
            fmt_num(*w)
        ));
    }
    out
}

/// Machine-readable form of a fit result.
///
/// Non-finite covariance entries and chi-square values appear as `null`.
pub fn format_fit_json(result: &FitResult) -> Result<String, AppError> {
    serde_json::to_string_pretty(result).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let mag = v.abs();
    if mag != 0.0 && !(1e-3..1e5).contains(&mag) {
        format!("{v:.4e}")
    } else {
        format!("{v:.6}")
    }
}
