//! Error types.
//!
//! - [`FitError`] is what the numerical library returns (models, residuals, fits).
//! - [`AppError`] is what the `mptfit` binary reports: a message plus a process exit code.
//!
//! Exit codes used by the binary:
//! - `2`: usage / input problems (bad CSV, mismatched lengths, invalid arguments)
//! - `3`: no usable data after ingest
//! - `4`: numerical problems (solver failure, non-finite predictions)

/// Errors raised by model evaluation, residual computation and fitting.
///
/// The input checks (everything except `Solver` and a `NonFinite` raised for
/// fitted values) run before any numerical work. `Solver` reports a failed
/// optimizer run, and `NonFinite("fitted values")` is raised after a solve
/// whose parameters overflow the model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Two sequences that must be paired have different lengths.
    #[error("Mismatch in parameters length: {left} has {left_len} values but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// The log-exponent model was evaluated at a non-positive `x`.
    #[error("Domain error: x must be > 0 for the log-exponent model (got {value})")]
    Domain { value: f64 },

    /// A residual bundle lacks a required field.
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Zero-length observation arrays.
    #[error("Empty input: at least one observation is required")]
    EmptyInput,

    /// Parameter vector of the wrong length for the model.
    #[error("Wrong number of parameters for {model}: expected {expected}, got {got}")]
    Arity {
        model: &'static str,
        expected: String,
        got: usize,
    },

    /// Negative Kelvin amplitude or rate.
    #[error("Negative values not allowed for {name} (got {value})")]
    NegativeParameter { name: &'static str, value: f64 },

    /// Fewer observations than free parameters.
    #[error("Not enough data: {needed} parameters need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A non-finite input value or model prediction.
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    /// Solver options out of range.
    #[error("Invalid fit option: {0}")]
    InvalidOption(String),

    /// The optimizer could not produce a usable solution.
    #[error("Solver failed: {0}")]
    Solver(String),
}

impl FitError {
    pub(crate) fn mismatch(left: &'static str, left_len: usize, right: &'static str, right_len: usize) -> Self {
        FitError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        }
    }

    /// Exit code the binary uses when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::NonFinite(_) | FitError::Solver(_) => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let usage: AppError = FitError::EmptyInput.into();
        assert_eq!(usage.exit_code(), 2);

        let numeric: AppError = FitError::Solver("diverged".to_string()).into();
        assert_eq!(numeric.exit_code(), 4);
        assert_eq!(numeric.to_string(), "Solver failed: diverged");
    }

    #[test]
    fn mismatch_message_names_both_sides() {
        let err = FitError::mismatch("a", 1, "b", 2);
        let msg = err.to_string();
        assert!(msg.contains("Mismatch in parameters length"));
        assert!(msg.contains("a has 1"));
        assert!(msg.contains("b has 2"));
    }
}
