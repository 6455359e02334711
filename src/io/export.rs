//! Write observation sets as CSV.
//!
//! The layout (`x,y,weight`) is the one `ingest` reads back.

use std::io::Write;

use crate::domain::Observations;
use crate::error::AppError;

/// Write observations as `x,y,weight` CSV to any sink.
pub fn write_observations_csv<W: Write>(sink: W, observations: &Observations) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write observations CSV: {e}"));
    writer.write_record(["x", "y", "weight"]).map_err(write_err)?;
    for ((x, y), w) in observations.x().iter().zip(observations.y()).zip(observations.weight()) {
        writer
            .write_record([x.to_string(), y.to_string(), w.to_string()])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush observations CSV: {e}")))?;
    Ok(())
}
