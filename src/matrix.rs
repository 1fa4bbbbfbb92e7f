//! Row-major 2-D arrays.

use crate::error::{Result, SynthError};

/// A dense row-major `rows x cols` matrix of `f32`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Wrap a flat buffer. `data.len()` must equal `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let Some(len) = rows.checked_mul(cols) else {
            return Err(SynthError::Configuration(format!(
                "{rows}x{cols} matrix is too large"
            )));
        };
        if data.len() != len {
            return Err(SynthError::Configuration(format!(
                "{rows}x{cols} matrix needs {len} values, got {}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Stack equally sized rows. `cols` is used when there are no rows.
    pub fn from_rows(rows: Vec<Vec<f32>>, cols: usize) -> Result<Self> {
        let nrows = rows.len();
        let mut data = Vec::with_capacity(nrows * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(SynthError::Configuration(format!(
                    "row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Self::new(nrows, cols, data)
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks(0) panics, an empty-width matrix simply has no row data.
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.iter_rows().count(), 2);
        assert!(Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]], 1).is_err());
        assert_eq!(Matrix::from_rows(vec![], 49).unwrap().shape(), (0, 49));
    }

    #[test]
    fn test_overflowing_shape() {
        assert!(matches!(
            Matrix::new(1 << 40, 1 << 40, vec![0.0]),
            Err(SynthError::Configuration(_))
        ));
    }
}
