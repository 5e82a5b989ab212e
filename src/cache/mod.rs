pub mod matrix_cache;

pub use matrix_cache::{LoadedMatrix, MatrixCache};
