pub mod dtype;
pub mod error;
pub mod matrix;
pub mod ops;
pub mod pad;

pub use dtype::Element;
pub use error::{ConvError, ConvResult, ErrorKind};
pub use matrix::SquareMatrix;
