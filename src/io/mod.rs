//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - observation CSV writer for generated samples (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
