//! Dense matrix operations over `f64`

use crate::error::{ToolError, ToolResult};

const SINGULAR_EPSILON: f64 = 1e-12;

/// Row-major matrix, validated rectangular and non-empty
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Validate and wrap rows; `name` is used in error messages
    pub fn new(rows: Vec<Vec<f64>>, name: &str) -> ToolResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(ToolError::invalid(
                "matrix_operations",
                format!("{name} must be a non-empty list of non-empty rows"),
            ));
        }
        if rows.iter().any(|r| r.len() != width) {
            return Err(ToolError::invalid(
                "matrix_operations",
                format!("{name} rows must all have the same length"),
            ));
        }
        Ok(Self { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows[0].len()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    fn require_square(&self) -> ToolResult<usize> {
        if self.row_count() != self.col_count() {
            return Err(ToolError::invalid(
                "matrix_operations",
                format!(
                    "matrix must be square, got {}x{}",
                    self.row_count(),
                    self.col_count()
                ),
            ));
        }
        Ok(self.row_count())
    }

    pub fn transpose(&self) -> Self {
        let rows = (0..self.col_count())
            .map(|c| self.rows.iter().map(|row| row[c]).collect())
            .collect();
        Self { rows }
    }

    pub fn add(&self, other: &Self) -> ToolResult<Self> {
        if self.row_count() != other.row_count() || self.col_count() != other.col_count() {
            return Err(ToolError::invalid(
                "matrix_operations",
                "matrices must have the same shape to add",
            ));
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x + y).collect())
            .collect();
        Ok(Self { rows })
    }

    pub fn multiply(&self, other: &Self) -> ToolResult<Self> {
        if self.col_count() != other.row_count() {
            return Err(ToolError::invalid(
                "matrix_operations",
                format!(
                    "cannot multiply {}x{} by {}x{}",
                    self.row_count(),
                    self.col_count(),
                    other.row_count(),
                    other.col_count()
                ),
            ));
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                (0..other.col_count())
                    .map(|c| row.iter().zip(&other.rows).map(|(a, b)| a * b[c]).sum::<f64>())
                    .collect()
            })
            .collect();
        Ok(Self { rows })
    }

    /// Determinant by Gaussian elimination with partial pivoting
    pub fn determinant(&self) -> ToolResult<f64> {
        let n = self.require_square()?;
        let mut a = self.rows.clone();
        let mut det = 1.0;

        for col in 0..n {
            let pivot = pivot_row(&a, col, col);
            if a[pivot][col].abs() < SINGULAR_EPSILON {
                return Ok(0.0);
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            det *= a[col][col];
            for row in col + 1..n {
                let factor = a[row][col] / a[col][col];
                for k in col..n {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }
        Ok(det)
    }

    /// Inverse by Gauss-Jordan elimination
    pub fn inverse(&self) -> ToolResult<Self> {
        let n = self.require_square()?;
        let mut a = self.rows.clone();
        let mut inv: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        for col in 0..n {
            let pivot = pivot_row(&a, col, col);
            if a[pivot][col].abs() < SINGULAR_EPSILON {
                return Err(ToolError::computation("matrix is singular"));
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);

            let p = a[col][col];
            for k in 0..n {
                a[col][k] /= p;
                inv[col][k] /= p;
            }
            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                for k in 0..n {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }
        Ok(Self { rows: inv })
    }
}

fn pivot_row(a: &[Vec<f64>], col: usize, from: usize) -> usize {
    (from..a.len())
        .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
        .unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::new(rows.iter().map(|r| r.to_vec()).collect(), "matrix_a").unwrap()
    }

    #[test]
    fn rejects_ragged_and_empty() {
        assert!(Matrix::new(vec![], "a").is_err());
        assert!(Matrix::new(vec![vec![]], "a").is_err());
        assert!(Matrix::new(vec![vec![1.0, 2.0], vec![3.0]], "a").is_err());
    }

    #[test]
    fn determinant() {
        assert!((m(&[&[1.0, 2.0], &[3.0, 4.0]]).determinant().unwrap() + 2.0).abs() < 1e-9);
        assert_eq!(m(&[&[1.0, 2.0], &[2.0, 4.0]]).determinant().unwrap(), 0.0);
        let d = m(&[&[2.0, 0.0, 1.0], &[1.0, 3.0, 2.0], &[1.0, 1.0, 2.0]])
            .determinant()
            .unwrap();
        assert!((d - 6.0).abs() < 1e-9);
        assert!(m(&[&[1.0, 2.0, 3.0]]).determinant().is_err());
    }

    #[test]
    fn inverse() {
        let inv = m(&[&[4.0, 7.0], &[2.0, 6.0]]).inverse().unwrap().into_rows();
        let expected = [[0.6, -0.7], [-0.2, 0.4]];
        for (row, want) in inv.iter().zip(expected.iter()) {
            for (x, y) in row.iter().zip(want.iter()) {
                assert!((x - y).abs() < 1e-9);
            }
        }

        let err = m(&[&[1.0, 2.0], &[2.0, 4.0]]).inverse().unwrap_err();
        assert!(matches!(err, ToolError::Computation(_)));
    }

    #[test]
    fn transpose_add_multiply() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        assert_eq!(
            a.transpose().into_rows(),
            vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]
        );

        let sum = a.add(&a).unwrap().into_rows();
        assert_eq!(sum, vec![vec![2.0, 4.0, 6.0], vec![8.0, 10.0, 12.0]]);

        let product = a.multiply(&a.transpose()).unwrap().into_rows();
        assert_eq!(product, vec![vec![14.0, 32.0], vec![32.0, 77.0]]);

        assert!(a.multiply(&a).is_err());
        assert!(a.add(&a.transpose()).is_err());
    }
}
