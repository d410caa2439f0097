pub mod csv_io;
pub mod error;
pub mod job;

pub use csv_io::{read_matrix_csv, read_matrix_from, write_matrix_csv};
pub use error::{IoError, IoResult};
pub use job::{load_job, save_job, save_report, ConvolutionJob, ConvolutionReport};
