pub mod params;
pub mod solver;
pub mod engine;

pub use params::ConvolutionParameters;
pub use solver::{SolverConfig, StridePaddingSolver};
pub use engine::{Channel, Convolution, ConvolutionEngine, EngineConfig};
