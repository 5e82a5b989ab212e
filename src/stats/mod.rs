//! Descriptive and correlation statistics used by the supplementary reports.

pub mod correlation;
pub mod descriptive;

pub use correlation::{
    average_ranks, compare_scores, defined_pairs, kendall_tau_b, ks_statistic, linear_regression,
    pearson, qq_points, spearman, LinearFit, ScoreComparison,
};
pub use descriptive::{mean, quantile, BoxSummary};
