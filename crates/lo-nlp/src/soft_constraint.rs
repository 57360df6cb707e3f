//! Turn a hard constraint into a penalty cost.

use crate::constraint::{Constraint, Cost};
use crate::error::NlpResult;
use lo_motion::{OptimizationVariables, VarSetId};
use nalgebra::DVector;

/// `0.5 * sum w_i * viol_i^2`, where `viol_i` is how far `g_i` lies outside
/// its bound (zero inside).
pub struct SoftConstraint {
    constraint: Box<dyn Constraint>,
    weights: DVector<f64>,
}

impl SoftConstraint {
    /// Penalize every row of `constraint` with the same `weight`.
    pub fn new(constraint: Box<dyn Constraint>, weight: f64) -> Self {
        let weights = DVector::from_element(constraint.number_of_constraints(), weight);
        Self {
            constraint,
            weights,
        }
    }

    fn violation(&self) -> DVector<f64> {
        let g = self.constraint.evaluate_constraint();
        let bounds = self.constraint.bounds();
        DVector::from_iterator(
            g.len(),
            g.iter().zip(&bounds).map(|(&gi, b)| b.violation(gi)),
        )
    }
}

impl Cost for SoftConstraint {
    fn name(&self) -> &str {
        self.constraint.name()
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.constraint.update_variables(vars)
    }

    fn evaluate_cost(&self) -> f64 {
        let viol = self.violation();
        0.5 * viol.component_mul(&viol).dot(&self.weights)
    }

    fn gradient_wrt(&self, var_set: VarSetId) -> Option<DVector<f64>> {
        let jac = self.constraint.jacobian_wrt(var_set)?;
        let weighted = self.violation().component_mul(&self.weights);
        let mut grad = DVector::zeros(jac.ncols());
        for (row, col, v) in jac.triplet_iter() {
            grad[col] += v * weighted[row];
        }
        Some(grad)
    }
}
