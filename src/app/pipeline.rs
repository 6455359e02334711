//! Shared "fit pipeline" logic.
//!
//! Keeps the core workflow in one place:
//! CSV ingest -> options -> fit
//!
//! so the command handlers can focus on presentation and exports.

use std::path::Path;

use crate::domain::{FitOptions, FitResult, ModelKind};
use crate::error::AppError;
use crate::fit::fit_observations;
use crate::io::ingest::{IngestedData, load_observations};

/// All computed outputs of a single `mptfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub result: FitResult,
}

/// Load `input` and fit `model` to it.
pub fn run_fit(input: &Path, model: ModelKind, options: &FitOptions) -> Result<RunOutput, AppError> {
    let ingest = load_observations(input)?;
    for err in &ingest.row_errors {
        log::warn!("{}: skipped line {}: {}", input.display(), err.line, err.message);
    }

    let result = fit_observations(&ingest.observations, model, options)?;
    if !result.summary().converged {
        log::warn!("{} fit did not converge: {}", model.display_name(), result.summary().termination);
    }

    Ok(RunOutput { ingest, result })
}
