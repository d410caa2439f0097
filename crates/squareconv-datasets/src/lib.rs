pub mod builtin;

pub use builtin::{load_demo, make_random_job};
