//! Error types.
//!
//! `DataError` is the domain taxonomy returned by ingest and the forecast
//! engine. `AppError` is what the binary reports: a message plus a process
//! exit code.

use thiserror::Error;

/// Dataset-level failures.
///
/// Row-level problems (bad dates, missing cells) never surface here; they are
/// filtered during `prepare` and only counted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Could not load dataset: {reason}")]
    LoadFailure { reason: String },

    #[error("No usable rows remain after cleaning ({rows_read} row(s) read).")]
    EmptyAfterCleaning { rows_read: usize },

    #[error("Insufficient observations for a trend fit: found {found}, need at least {required}.")]
    InsufficientObservations { found: usize, required: usize },

    #[error("Trend fit produced non-finite coefficients: {message}")]
    DegenerateFit { message: String },
}

impl DataError {
    pub fn load_failure(reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            reason: reason.into(),
        }
    }

    pub fn degenerate_fit(message: impl Into<String>) -> Self {
        Self::DegenerateFit {
            message: message.into(),
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

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        let exit_code = match err {
            DataError::LoadFailure { .. } => 2,
            DataError::EmptyAfterCleaning { .. } => 3,
            DataError::InsufficientObservations { .. } | DataError::DegenerateFit { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
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
