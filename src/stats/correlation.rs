//! Correlation between two methods' contact scores.
//!
//! Pearson and Spearman (average ranks), Kendall tau-b in O(n log n) after
//! Knight, a least-squares line and the two-sample Kolmogorov-Smirnov
//! statistic.

use crate::error::{BenchError, Result};
use serde::Serialize;
use std::cmp::Ordering;

fn validate_paired(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(BenchError::InvalidInput(format!(
            "correlation: x and y must have the same length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(BenchError::InvalidInput(
            "correlation: need at least 2 observations".into(),
        ));
    }
    Ok(())
}

/// Pearson product-moment correlation. Returns 0.0 if either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y)?;

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / denom)
}

/// 1-based ranks; tied values share the average of their positions.
pub fn average_ranks(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; data.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && data[order[end]] == data[order[start]] {
            end += 1;
        }
        // positions start+1 ..= end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        start = end;
    }
    ranks
}

/// Spearman rank correlation: Pearson on average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y)?;
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Pairs `t * (t - 1) / 2` summed over runs of equal consecutive elements.
fn tied_pairs<T: PartialEq>(sorted: &[T]) -> u64 {
    let mut total = 0u64;
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && sorted[end] == sorted[start] {
            end += 1;
        }
        let t = (end - start) as u64;
        total += t * (t - 1) / 2;
        start = end;
    }
    total
}

/// Merge sort returning the number of strictly inverted pairs.
fn sort_counting_swaps(values: &mut [f64]) -> u64 {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let mid = n / 2;
    let mut swaps = sort_counting_swaps(&mut values[..mid]);
    swaps += sort_counting_swaps(&mut values[mid..]);

    let mut merged = Vec::with_capacity(n);
    let (mut i, mut j) = (0, mid);
    while i < mid && j < n {
        if values[j] < values[i] {
            merged.push(values[j]);
            swaps += (mid - i) as u64;
            j += 1;
        } else {
            merged.push(values[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&values[i..mid]);
    merged.extend_from_slice(&values[j..]);
    values.copy_from_slice(&merged);
    swaps
}

/// Kendall tau-b, accounting for ties in either series.
///
/// Returns 0.0 when one series is entirely tied.
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y)?;
    let n = x.len() as u64;

    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| match x[a].total_cmp(&x[b]) {
        Ordering::Equal => y[a].total_cmp(&y[b]),
        other => other,
    });

    let xs: Vec<f64> = order.iter().map(|&i| x[i]).collect();
    let joint: Vec<(f64, f64)> = order.iter().map(|&i| (x[i], y[i])).collect();
    let mut ys: Vec<f64> = order.iter().map(|&i| y[i]).collect();

    let total = n * (n - 1) / 2;
    let x_ties = tied_pairs(&xs);
    let joint_ties = tied_pairs(&joint);
    let swaps = sort_counting_swaps(&mut ys);
    let y_ties = tied_pairs(&ys);

    let denom = ((total - x_ties) as f64 * (total - y_ties) as f64).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    let numer = total as f64 - x_ties as f64 - y_ties as f64 + joint_ties as f64 - 2.0 * swaps as f64;
    Ok(numer / denom)
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    validate_paired(x, y)?;
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        sxy += (xi - mean_x) * (yi - mean_y);
        sxx += (xi - mean_x) * (xi - mean_x);
    }
    if sxx == 0.0 {
        return Err(BenchError::InvalidInput(
            "linear regression: x has zero variance".into(),
        ));
    }
    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Two-sample Kolmogorov-Smirnov statistic: the largest gap between the
/// empirical distribution functions of `a` and `b`.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(BenchError::InvalidInput("ks: samples must not be empty".into()));
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let v = a[i].min(b[j]);
        while i < a.len() && a[i] <= v {
            i += 1;
        }
        while j < b.len() && b[j] <= v {
            j += 1;
        }
        d = d.max((i as f64 / na - j as f64 / nb).abs());
    }
    Ok(d)
}

/// Agreement between two score vectors over the same residue pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComparison {
    /// Pairs where both scores are defined
    pub n: usize,
    pub pearson: f64,
    pub spearman: f64,
    pub kendall_tau: f64,
    /// Fit of `a` on `b`
    pub fit: LinearFit,
    pub ks_statistic: f64,
}

/// `(b, a)` points for the pairs where both scores are defined, so that
/// method B runs along x and method A along y.
pub fn defined_pairs(a: &[f64], b: &[f64]) -> Vec<(f64, f64)> {
    a.iter()
        .zip(b)
        .filter(|(ya, xb)| !ya.is_nan() && !xb.is_nan())
        .map(|(ya, xb)| (*xb, *ya))
        .collect()
}

/// Quantile-quantile points: x and y sorted independently and paired by position.
pub fn qq_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let mut ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    ys.sort_by(|a, b| a.total_cmp(b));
    xs.into_iter().zip(ys).collect()
}

/// Compare method A's scores `a` with method B's scores `b`, pair by pair.
/// Pairs where either score is NaN are dropped.
pub fn compare_scores(a: &[f64], b: &[f64]) -> Result<ScoreComparison> {
    validate_paired(a, b)?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = defined_pairs(a, b).into_iter().unzip();

    Ok(ScoreComparison {
        n: xs.len(),
        pearson: pearson(&xs, &ys)?,
        spearman: spearman(&xs, &ys)?,
        kendall_tau: kendall_tau_b(&xs, &ys)?,
        fit: linear_regression(&xs, &ys)?,
        ks_statistic: ks_statistic(&ys, &xs)?,
    })
}
