use crate::error::{BenchError, Result};
use serde::Serialize;

/// Arithmetic mean. Errors on empty input.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(BenchError::InvalidInput("mean: data must not be empty".into()));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Quantile `q` in [0, 1] with linear interpolation between order statistics.
pub fn quantile(data: &[f64], q: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(BenchError::InvalidInput("quantile: data must not be empty".into()));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(BenchError::InvalidInput("quantile: q must be in [0, 1]".into()));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, q))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Five-number summary plus count and mean, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl BoxSummary {
    /// Summarize the non-NaN values of `data`.
    pub fn from_values(data: &[f64]) -> Result<Self> {
        let mut sorted: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Err(BenchError::InvalidInput(
                "box summary: no finite values".into(),
            ));
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted)?,
        })
    }
}
