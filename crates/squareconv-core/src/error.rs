use thiserror::Error;

/// Core error type for all matrix and convolution operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvError {
    #[error("Shape mismatch in {op}: expected size {expected}, got {got}")]
    ShapeMismatch {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Empty matrix sequence passed to {op}")]
    EmptySequence { op: &'static str },

    #[error("Matrix is not square: {rows} rows, but row {row} has {cols} columns")]
    NotSquare { rows: usize, row: usize, cols: usize },

    #[error(
        "No feasible stride for input {input_size}, filter {filter_size}, output {output_size} \
         (strides {max_stride}..=0, padding {min_padding}..={max_padding})"
    )]
    NoFeasibleStride {
        input_size: usize,
        filter_size: usize,
        output_size: usize,
        max_stride: usize,
        min_padding: usize,
        max_padding: usize,
    },

    #[error("Window of size {window} at ({row}, {col}) exceeds matrix of size {size}")]
    WindowOutOfBounds {
        row: usize,
        col: usize,
        window: usize,
        size: usize,
    },

    #[error("Padded input has size {got}, but the solved geometry needs {expected}")]
    PaddedSizeMismatch { expected: usize, got: usize },

    #[error("Index out of bounds: ({row}, {col}) for matrix of size {size}")]
    IndexOutOfBounds { row: usize, col: usize, size: usize },
}

/// The three failure classes a caller needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Mismatched matrix sizes at an add/dot/sum/pad/bias boundary.
    Shape,
    /// The solver's bounded search found no (stride, padding) pair.
    NoFeasibleStride,
    /// Solved parameters disagree with the actual matrix dimensions.
    Bounds,
}

impl ConvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvError::ShapeMismatch { .. }
            | ConvError::EmptySequence { .. }
            | ConvError::NotSquare { .. } => ErrorKind::Shape,
            ConvError::NoFeasibleStride { .. } => ErrorKind::NoFeasibleStride,
            ConvError::WindowOutOfBounds { .. }
            | ConvError::PaddedSizeMismatch { .. }
            | ConvError::IndexOutOfBounds { .. } => ErrorKind::Bounds,
        }
    }
}

pub type ConvResult<T> = Result<T, ConvError>;
