//! # squareconv
//!
//! Single-layer, multi-channel 2-D convolution over square integer matrices.
//!
//! ## Modules
//!
//! - **core** — `SquareMatrix`: element-wise add, dot, sum, zero padding, windows
//! - **engine** — stride/padding solver and the four-phase convolution engine
//! - **io** — CSV matrices, JSON job files and result reports
//! - **datasets** — built-in demonstration job, seeded random jobs

/// Square matrices and their primitive operations.
pub use squareconv_core as core;

/// Solver and convolution engine.
pub use squareconv_engine as engine;

/// I/O utilities.
pub use squareconv_io as io;

/// Built-in jobs.
pub use squareconv_datasets as datasets;

pub use squareconv_core::{ConvError, ConvResult, ErrorKind, SquareMatrix};
pub use squareconv_engine::{Channel, ConvolutionEngine, ConvolutionParameters, EngineConfig};
