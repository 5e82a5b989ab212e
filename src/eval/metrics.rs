//! Evaluation metrics: rank fractions, rank cutoffs and cumulative
//! precision / recall / mean error over ranked residue pairs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of points on the rank axis.
pub const DEFAULT_RANK_POINTS: usize = 50;

/// A residue pair that survived filtering, with its ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedPair {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
    pub contact: bool,
}

/// Precision, recall and mean error at each rank position.
///
/// All three vectors have the same length; position `r` belongs to the `r`-th
/// rank fraction. `recall` is `NaN` for proteins without any true contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankCurves {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub mean_error: Vec<f64>,
}

impl RankCurves {
    pub fn len(&self) -> usize {
        self.precision.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precision.is_empty()
    }
}

/// Rank fractions `linspace(1, 0, points, endpoint=false)` in increasing order.
///
/// Uses numpy's arithmetic (`start + i * step`) so values match bit for bit:
/// for 50 points this is 0.02, 0.04, ..., 1.0.
pub fn rank_fractions(points: usize) -> Vec<f64> {
    if points == 0 {
        return Vec::new();
    }
    let step = (0.0 - 1.0) / points as f64;
    let mut fractions: Vec<f64> = (0..points).map(|i| i as f64 * step + 1.0).collect();
    fractions.reverse();
    fractions
}

/// Number of top-ranked pairs to evaluate for each fraction of the protein
/// length. Cutoffs that reach `pair_count` are dropped, so short proteins
/// only cover a prefix of the fractions.
pub fn rank_cutoffs(length: usize, fractions: &[f64], pair_count: usize) -> Vec<usize> {
    fractions
        .iter()
        .map(|f| (length as f64 * f).round_ties_even() as usize)
        .filter(|&cutoff| cutoff < pair_count)
        .collect()
}

/// Pair indices ordered by descending score.
///
/// Equal scores keep their input order (stable sort); `NaN` scores go last.
pub fn ranking_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (scores[a], scores[b]);
        match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        }
    });
    order
}

/// Prediction error of a pair: 0 inside the contact threshold, else the
/// distance beyond it.
pub fn pair_error(distance: f64, contact_threshold: f64) -> f64 {
    (distance - contact_threshold).max(0.0)
}

/// Cumulative metrics over every prefix of a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeCurves {
    /// `precision[k-1]` = true contacts among the top `k` / `k`
    pub precision: Vec<f64>,
    /// `recall[k-1]` = true contacts among the top `k` / all true contacts
    pub recall: Vec<f64>,
    /// `mean_error[k-1]` = mean pair error over the top `k`
    pub mean_error: Vec<f64>,
}

/// Rank `pairs` by `scores` and accumulate precision, recall and mean error.
pub fn cumulative_curves(
    pairs: &[EvaluatedPair],
    scores: &[f64],
    contact_threshold: f64,
) -> CumulativeCurves {
    let n = pairs.len();
    let total_contacts = pairs.iter().filter(|p| p.contact).count();

    let mut precision = Vec::with_capacity(n);
    let mut recall = Vec::with_capacity(n);
    let mut mean_error = Vec::with_capacity(n);

    let mut true_positives = 0usize;
    let mut error_sum = 0.0;
    for (rank, idx) in ranking_order(scores).into_iter().enumerate() {
        let pair = &pairs[idx];
        let k = (rank + 1) as f64;
        if pair.contact {
            true_positives += 1;
        }
        error_sum += pair_error(pair.distance, contact_threshold);

        precision.push(true_positives as f64 / k);
        // 0/0 stays NaN; aggregation ignores it
        recall.push(true_positives as f64 / total_contacts as f64);
        mean_error.push(error_sum / k);
    }

    CumulativeCurves {
        precision,
        recall,
        mean_error,
    }
}

impl CumulativeCurves {
    /// Values at each cutoff. A cutoff `c` reads the top `max(c, 1)` pairs.
    pub fn at_cutoffs(&self, cutoffs: &[usize]) -> RankCurves {
        let mut curves = RankCurves::default();
        for &cutoff in cutoffs {
            let idx = cutoff.max(1) - 1;
            if idx >= self.precision.len() {
                break;
            }
            curves.precision.push(self.precision[idx]);
            curves.recall.push(self.recall[idx]);
            curves.mean_error.push(self.mean_error[idx]);
        }
        curves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(i: usize, j: usize, distance: f64) -> EvaluatedPair {
        EvaluatedPair {
            i,
            j,
            distance,
            contact: distance <= 8.0,
        }
    }

    /// Fraction of contacts among the top `k` ranked labels.
    fn precision_at_k(ranked_contacts: &[bool], k: usize) -> f64 {
        let hits = ranked_contacts.iter().take(k).filter(|c| **c).count();
        hits as f64 / k as f64
    }

    /// Fraction of all contacts found in the top `k`; NaN without contacts.
    fn recall_at_k(ranked_contacts: &[bool], k: usize) -> f64 {
        let total = ranked_contacts.iter().filter(|c| **c).count();
        if total == 0 {
            return f64::NAN;
        }
        let hits = ranked_contacts.iter().take(k).filter(|c| **c).count();
        hits as f64 / total as f64
    }

    #[test]
    fn test_rank_fractions_match_numpy() {
        let f = rank_fractions(50);
        assert_eq!(f.len(), 50);
        assert!((f[0] - 0.02).abs() < 1e-12);
        assert_eq!(f[49], 1.0);
        assert!(f.windows(2).all(|w| w[0] < w[1]));
        assert!(f.iter().all(|&x| x > 0.0 && x <= 1.0));
        // numpy: 1.0 + 1 * -0.02
        assert_eq!(f[48], 1.0 + 1.0 * (-1.0 / 50.0));
    }

    #[test]
    fn test_rank_cutoffs_round_half_even_and_drop() {
        // 0.5 -> 0, 1.5 -> 2, 2.5 -> 2
        assert_eq!(rank_cutoffs(25, &[0.02, 0.06, 0.1], 1000), vec![0, 2, 2]);

        let f = rank_fractions(50);
        let cutoffs = rank_cutoffs(25, &f, 1000);
        assert_eq!(cutoffs.len(), 50);
        assert_eq!(*cutoffs.last().unwrap(), 25);

        let limited = rank_cutoffs(100, &f, 10);
        assert!(limited.iter().all(|&c| c < 10));
        assert_eq!(limited, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_ranking_order_stable_with_nan_last() {
        let scores = [0.5, f64::NAN, 0.9, 0.5, 0.1];
        assert_eq!(ranking_order(&scores), vec![2, 0, 3, 4, 1]);
    }

    #[test]
    fn test_cumulative_curves_by_hand() {
        let pairs = [pair(0, 5, 4.0), pair(0, 6, 12.0), pair(1, 7, 6.0), pair(2, 9, 20.0)];
        let scores = [0.9, 0.8, 0.3, 0.1];
        let c = cumulative_curves(&pairs, &scores, 8.0);

        assert_eq!(c.precision, vec![1.0, 0.5, 2.0 / 3.0, 0.5]);
        assert_eq!(c.recall, vec![0.5, 0.5, 1.0, 1.0]);
        assert_eq!(c.mean_error, vec![0.0, 2.0, 4.0 / 3.0, (4.0 + 12.0) / 4.0]);
    }

    #[test]
    fn test_recall_nan_without_contacts() {
        let pairs = [pair(0, 5, 10.0), pair(0, 6, 12.0)];
        let c = cumulative_curves(&pairs, &[0.2, 0.1], 8.0);
        assert!(c.recall.iter().all(|r| r.is_nan()));
        assert_eq!(c.precision, vec![0.0, 0.0]);
    }

    #[test]
    fn test_at_cutoffs_reads_top_k() {
        let pairs = [pair(0, 5, 4.0), pair(0, 6, 12.0), pair(1, 7, 6.0)];
        let c = cumulative_curves(&pairs, &[0.9, 0.8, 0.3], 8.0);
        let r = c.at_cutoffs(&[0, 1, 2]);
        assert_eq!(r.precision, vec![1.0, 1.0, 0.5]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_cumulative_matches_top_k_definitions() {
        let pairs: Vec<EvaluatedPair> = (0..20)
            .map(|n| pair(n, n + 6, if n % 3 == 0 { 5.0 } else { 9.0 + n as f64 }))
            .collect();
        let scores: Vec<f64> = (0..20).map(|n| ((n * 7) % 11) as f64).collect();
        let c = cumulative_curves(&pairs, &scores, 8.0);
        let ranked: Vec<bool> = ranking_order(&scores).iter().map(|&i| pairs[i].contact).collect();
        for k in 1..=20 {
            assert!((c.precision[k - 1] - precision_at_k(&ranked, k)).abs() < 1e-12);
            assert!((c.recall[k - 1] - recall_at_k(&ranked, k)).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&c.precision[k - 1]));
        }
    }
}
