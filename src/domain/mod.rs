//! Domain types used throughout the library.
//!
//! This module defines:
//!
//! - model selection (`ModelKind`, `ModelSpec`)
//! - observation sets (`Observations`)
//! - solver configuration (`FitOptions`)
//! - fit outputs (`FitResult`, `OriginalData`, `FitSummary`)

pub mod types;

pub use types::*;
