//! Dense square matrices indexed by residue pair.

use crate::error::{BenchError, Result};

/// Row-major `size × size` matrix of reals.
///
/// Used both for contact scores and for residue distances; unresolved
/// entries are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SquareMatrix {
    /// Matrix of the given size with every entry set to `value`.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            size,
            values: vec![value; size * size],
        }
    }

    /// Build a matrix from parsed rows. Every row must have `rows.len()` entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(BenchError::Parse(format!(
                    "matrix is not square: row {} has {} columns, expected {}",
                    idx,
                    row.len(),
                    size
                )));
            }
            values.extend(row);
        }
        Ok(Self { size, values })
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
    }

    /// Entries of the strict upper triangle, row by row (`numpy.triu_indices(L, k=1)` order).
    pub fn upper_triangle(&self) -> Vec<f64> {
        let n = self.size;
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                out.push(self.get(i, j));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_square() {
        let m = SquareMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = SquareMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, BenchError::Parse(_)));
    }

    #[test]
    fn test_upper_triangle_order() {
        let m = SquareMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ])
        .unwrap();
        assert_eq!(m.upper_triangle(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_filled_and_set() {
        let mut m = SquareMatrix::filled(3, f64::NAN);
        assert!(m.get(2, 2).is_nan());
        m.set(0, 2, 4.5);
        assert_eq!(m.get(0, 2), 4.5);
    }
}
