//! Containers for linear equations over an optimization vector.

use nalgebra::{DMatrix, DVector, RowDVector};

/// One linear equation `v * x = s`.
#[derive(Clone, Debug, PartialEq)]
pub struct VecScalar {
    pub v: RowDVector<f64>,
    pub s: f64,
}

impl VecScalar {
    pub fn zeros(cols: usize) -> Self {
        Self {
            v: RowDVector::zeros(cols),
            s: 0.0,
        }
    }

    pub fn new(v: RowDVector<f64>, s: f64) -> Self {
        Self { v, s }
    }
}

/// A system of linear equations `M * x = v`, or the matrix and linear term
/// of a quadratic form.
#[derive(Clone, Debug, PartialEq)]
pub struct MatVec {
    pub m: DMatrix<f64>,
    pub v: DVector<f64>,
}

impl Default for MatVec {
    fn default() -> Self {
        Self::zeros(0, 0)
    }
}

impl MatVec {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            m: DMatrix::zeros(rows, cols),
            v: DVector::zeros(rows),
        }
    }

    pub fn rows(&self) -> usize {
        self.m.nrows()
    }

    pub fn cols(&self) -> usize {
        self.m.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.m.nrows() == 0 && self.m.ncols() == 0
    }

    pub fn extract_row(&self, row: usize) -> VecScalar {
        VecScalar::new(self.m.row(row).into_owned(), self.v[row])
    }

    /// Overwrite exactly one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range or `val` has the wrong width.
    pub fn add_vec_scalar(&mut self, val: &VecScalar, row: usize) {
        assert!(row < self.rows(), "row {row} out of range for {} rows", self.rows());
        assert_eq!(val.v.len(), self.cols(), "VecScalar width mismatch");
        self.m.set_row(row, &val.v);
        self.v[row] = val.s;
    }

    /// Stack the rows of `rhs` below the rows of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `self` is non-empty and the column counts differ.
    pub fn append(&mut self, rhs: &MatVec) {
        assert!(
            self.is_empty() || self.cols() == rhs.cols(),
            "cannot append {} columns to {} columns",
            rhs.cols(),
            self.cols()
        );
        assert_eq!(rhs.m.nrows(), rhs.v.len(), "MatVec rows and vector length differ");

        if self.is_empty() {
            *self = rhs.clone();
            return;
        }

        let old_rows = self.rows();
        let new_rows = old_rows + rhs.rows();
        let m = std::mem::replace(&mut self.m, DMatrix::zeros(0, 0));
        self.m = m.resize_vertically(new_rows, 0.0);
        self.m
            .view_mut((old_rows, 0), (rhs.rows(), rhs.cols()))
            .copy_from(&rhs.m);

        let v = std::mem::replace(&mut self.v, DVector::zeros(0));
        self.v = v.resize_vertically(new_rows, 0.0);
        self.v.rows_mut(old_rows, rhs.rows()).copy_from(&rhs.v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three(offset: f64) -> MatVec {
        let mut mv = MatVec::zeros(2, 3);
        for r in 0..2 {
            let row = RowDVector::from_fn(3, |_, c| offset + (r * 3 + c) as f64);
            mv.add_vec_scalar(&VecScalar::new(row, offset + r as f64), r);
        }
        mv
    }

    #[test]
    fn add_vec_scalar_overwrites_one_row() {
        let mut mv = MatVec::zeros(3, 2);
        mv.add_vec_scalar(&VecScalar::new(RowDVector::from_row_slice(&[1.0, 2.0]), 5.0), 1);
        assert_eq!(mv.m.row(0).sum(), 0.0);
        assert_eq!(mv.m[(1, 1)], 2.0);
        assert_eq!(mv.v, DVector::from_row_slice(&[0.0, 5.0, 0.0]));
        assert_eq!(mv.m.row(2).sum(), 0.0);
    }

    #[test]
    fn append_stacks_rows() {
        let mut mv = MatVec::default();
        mv.append(&two_by_three(0.0));
        mv.append(&two_by_three(10.0));

        assert_eq!(mv.rows(), 4);
        assert_eq!(mv.cols(), 3);
        assert_eq!(mv.extract_row(0), two_by_three(0.0).extract_row(0));
        assert_eq!(mv.extract_row(3), two_by_three(10.0).extract_row(1));
        assert_eq!(mv.v[2], 10.0);
    }

    #[test]
    #[should_panic(expected = "cannot append")]
    fn append_rejects_column_mismatch() {
        let mut mv = MatVec::zeros(1, 2);
        mv.append(&MatVec::zeros(1, 3));
    }

    #[test]
    #[should_panic]
    fn add_vec_scalar_rejects_wrong_width() {
        let mut mv = MatVec::zeros(1, 2);
        mv.add_vec_scalar(&VecScalar::zeros(3), 0);
    }
}
