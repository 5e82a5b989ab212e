//! Per-rank averages of evaluation curves across proteins.

use crate::error::{BenchError, Result};
use crate::eval::benchmark::EvaluationStatistics;
use crate::eval::metrics::RankCurves;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which curve of [`RankCurves`] to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Precision,
    Recall,
    MeanError,
}

impl Metric {
    pub fn values(self, curves: &RankCurves) -> &[f64] {
        match self {
            Metric::Precision => &curves.precision,
            Metric::Recall => &curves.recall,
            Metric::MeanError => &curves.mean_error,
        }
    }

    /// Axis label for plots.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Precision => "Mean Precision over Proteins",
            Metric::Recall => "Mean Recall over Proteins",
            Metric::MeanError => "Mean Error [Å] over Proteins",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::MeanError => "mean_error",
        };
        f.write_str(name)
    }
}

/// Mean curve per method, aligned to the rank fractions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRankCurves {
    pub metric: Metric,
    pub ranks: Vec<f64>,
    /// (method name, mean value per rank) in registration order
    pub methods: Vec<(String, Vec<f64>)>,
    pub protein_count: usize,
}

impl MeanRankCurves {
    pub fn curve(&self, method: &str) -> Option<&[f64]> {
        self.methods
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.protein_count == 0
    }

    /// Pointwise `a - b` between two method curves.
    pub fn difference(&self, a: &str, b: &str) -> Result<Vec<f64>> {
        let lookup = |name: &str| {
            self.curve(name).ok_or_else(|| {
                BenchError::InvalidInput(format!("no curve for method '{}'", name))
            })
        };
        let (ca, cb) = (lookup(a)?, lookup(b)?);
        Ok(ca.iter().zip(cb).map(|(x, y)| x - y).collect())
    }
}

/// Average `metric` over all evaluated proteins at each rank position.
///
/// Positions beyond a protein's cutoffs and `NaN` values are ignored; a
/// position without any contribution is `NaN`.
pub fn mean_metric_per_rank(stats: &EvaluationStatistics, metric: Metric) -> MeanRankCurves {
    let points = stats.ranks.len();
    let methods = stats
        .methods
        .iter()
        .map(|name| {
            let mut sums = vec![0.0; points];
            let mut counts = vec![0usize; points];
            for evaluation in stats.proteins.values() {
                let Some(curves) = evaluation.methods.get(name) else {
                    continue;
                };
                for (pos, &value) in metric.values(curves).iter().take(points).enumerate() {
                    if value.is_nan() {
                        continue;
                    }
                    sums[pos] += value;
                    counts[pos] += 1;
                }
            }
            let means = sums
                .into_iter()
                .zip(counts)
                .map(|(sum, n)| if n == 0 { f64::NAN } else { sum / n as f64 })
                .collect();
            (name.clone(), means)
        })
        .collect();

    MeanRankCurves {
        metric,
        ranks: stats.ranks.clone(),
        methods,
        protein_count: stats.proteins.len(),
    }
}

/// Mean precision per rank for every method.
pub fn compute_mean_precision_per_rank(stats: &EvaluationStatistics) -> MeanRankCurves {
    mean_metric_per_rank(stats, Metric::Precision)
}
