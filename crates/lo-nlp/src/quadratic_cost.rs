//! Quadratic smoothness cost on the CoM spline.

use crate::constraint::Cost;
use crate::error::NlpResult;
use lo_core::MatVec;
use lo_motion::{ComMotion, OptimizationVariables, VarSetId};
use nalgebra::DVector;

/// `x^T M x + v^T x` over the spline coefficients `x`.
#[derive(Clone, Debug)]
pub struct QuadraticSplineCost {
    com_motion: Box<dyn ComMotion>,
    matrix_vector: MatVec,
}

impl QuadraticSplineCost {
    /// # Panics
    ///
    /// Panics unless `M` is square with one row per spline coefficient.
    pub fn new(com_motion: &dyn ComMotion, matrix_vector: MatVec) -> Self {
        let n = com_motion.opt_var_count();
        assert!(
            matrix_vector.rows() == n && matrix_vector.cols() == n,
            "quadratic form must be {n}x{n}"
        );
        Self {
            com_motion: com_motion.clone_box(),
            matrix_vector,
        }
    }
}

impl Cost for QuadraticSplineCost {
    fn name(&self) -> &str {
        "CoM Motion"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.com_motion.update_from(vars)?;
        Ok(())
    }

    fn evaluate_cost(&self) -> f64 {
        let x = self.com_motion.optimization_parameters();
        let MatVec { m, v } = &self.matrix_vector;
        x.dot(&(m * &x)) + v.dot(&x)
    }

    fn gradient_wrt(&self, var_set: VarSetId) -> Option<DVector<f64>> {
        if var_set != self.com_motion.id() {
            return None;
        }
        let x = self.com_motion.optimization_parameters();
        let MatVec { m, v } = &self.matrix_vector;
        Some(m * &x + m.transpose() * &x + v)
    }
}
