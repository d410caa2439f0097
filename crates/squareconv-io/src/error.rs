use squareconv_core::ConvError;
use thiserror::Error;

/// Failures while reading or writing matrices, jobs and reports.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cell {value:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, value: String },

    #[error(transparent)]
    Conv(#[from] ConvError),
}

pub type IoResult<T> = Result<T, IoError>;
