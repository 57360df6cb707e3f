//! Linear equality constraints on the CoM spline coefficients.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, MatVec, VecBound};
use lo_motion::{ComMotion, OptimizationVariables, VarSetId};
use nalgebra::DVector;

/// `M * x = v` over the spline coefficients `x`, e.g. initial/final state
/// or junction continuity built by [`lo_motion::LinearSplineEquations`].
#[derive(Clone, Debug)]
pub struct LinearSplineEqualityConstraint {
    com_motion: Box<dyn ComMotion>,
    linear_equation: MatVec,
    jac: Jacobian,
    name: String,
}

impl LinearSplineEqualityConstraint {
    /// # Panics
    ///
    /// Panics if the equation width differs from the spline coefficient count.
    pub fn new(com_motion: &dyn ComMotion, linear_equation: MatVec, name: impl Into<String>) -> Self {
        assert_eq!(
            linear_equation.cols(),
            com_motion.opt_var_count(),
            "linear equation does not match the spline coefficients"
        );
        let jac = JacobianBuilder::from_dense(&linear_equation.m).build();
        Self {
            com_motion: com_motion.clone_box(),
            linear_equation,
            jac,
            name: name.into(),
        }
    }
}

impl Constraint for LinearSplineEqualityConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.com_motion.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        &self.linear_equation.m * self.com_motion.optimization_parameters()
    }

    fn bounds(&self) -> VecBound {
        self.linear_equation
            .v
            .iter()
            .map(|&v| Bound::equality(v))
            .collect()
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        (var_set == self.com_motion.id()).then(|| self.jac.clone())
    }

    fn number_of_constraints(&self) -> usize {
        self.linear_equation.rows()
    }
}
