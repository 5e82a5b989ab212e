//! Evaluation framework: metadata constraints, rank metrics, the benchmark
//! session and per-rank aggregation.

pub mod aggregate;
pub mod benchmark;
pub mod constraint;
pub mod metrics;

pub use aggregate::{compute_mean_precision_per_rank, mean_metric_per_rank, MeanRankCurves, Metric};
pub use benchmark::{
    Benchmark, EvaluationSettings, EvaluationStatistics, Method, ProteinEvaluation, ProteinInfo,
    ProteinOutcome, SkipReason, SkippedProtein,
};
pub use constraint::{Comparison, Constraint};
pub use metrics::{rank_cutoffs, rank_fractions, RankCurves};
