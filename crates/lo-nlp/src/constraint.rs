//! Contracts shared by all constraint and cost terms.

use crate::error::NlpResult;
use lo_core::VecBound;
use lo_motion::{OptimizationVariables, VarSetId};
use nalgebra::{DMatrix, DVector, RowDVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Sparse Jacobian block of one term w.r.t. one variable set.
pub type Jacobian = CsrMatrix<f64>;

/// A vector-valued term `lower <= g(x) <= upper`.
///
/// Call order per solver iteration: [`Constraint::update_variables`] first,
/// then any of the read methods.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;

    /// Push the current values of every variable set this term reads into
    /// its providers.
    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()>;

    fn evaluate_constraint(&self) -> DVector<f64>;

    /// One interval per entry of [`Constraint::evaluate_constraint`].
    fn bounds(&self) -> VecBound;

    /// Derivative of `g` w.r.t. the coefficients of `var_set`.
    ///
    /// `None` means `g` does not depend on that set; callers treat it as an
    /// all-zero block.
    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian>;

    fn number_of_constraints(&self) -> usize;
}

/// A scalar objective term.
pub trait Cost: Send + Sync {
    fn name(&self) -> &str;

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()>;

    fn evaluate_cost(&self) -> f64;

    /// Gradient w.r.t. the coefficients of `var_set`, `None` if the cost does
    /// not depend on it.
    fn gradient_wrt(&self, var_set: VarSetId) -> Option<DVector<f64>>;
}

/// Triplet accumulator for a [`Jacobian`] of fixed shape.
///
/// Entries pushed twice at the same position are summed.
pub struct JacobianBuilder {
    coo: CooMatrix<f64>,
}

impl JacobianBuilder {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            coo: CooMatrix::new(rows, cols),
        }
    }

    /// Add a structural entry, kept even when `value` is zero.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` lies outside the matrix.
    pub fn insert(&mut self, row: usize, col: usize, value: f64) {
        self.coo.push(row, col, value);
    }

    /// Add the non-zero entries of a dense row.
    pub fn set_row(&mut self, row: usize, values: &RowDVector<f64>) {
        assert_eq!(values.len(), self.coo.ncols(), "Jacobian row width mismatch");
        for (col, &v) in values.iter().enumerate() {
            if v != 0.0 {
                self.coo.push(row, col, v);
            }
        }
    }

    pub fn from_dense(m: &DMatrix<f64>) -> Self {
        let mut builder = Self::new(m.nrows(), m.ncols());
        for (row, row_values) in m.row_iter().enumerate() {
            for (col, &v) in row_values.iter().enumerate() {
                if v != 0.0 {
                    builder.insert(row, col, v);
                }
            }
        }
        builder
    }

    pub fn build(self) -> Jacobian {
        CsrMatrix::from(&self.coo)
    }
}
