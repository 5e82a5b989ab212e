pub mod cache;
pub mod config;
pub mod error;
pub mod eval;
pub mod io;
pub mod matrix;
pub mod report;
pub mod stats;

pub use config::Config;
pub use error::{BenchError, Result};
pub use eval::{Benchmark, Comparison, EvaluationSettings, EvaluationStatistics};
pub use matrix::SquareMatrix;

/// Initialize env_logger; `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", default_level),
    )
    .try_init();
}
