//! Load fractions of every segment sum to one.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, VecBound};
use lo_motion::{EndeffectorLoad, OptimizationVariables, VarSetId, VariableProvider};
use nalgebra::DVector;

/// `sum_ee lambda(ee, k) = 1` for every load segment `k`.
///
/// The Jacobian is a selection matrix that does not depend on the variable
/// values; it is built once on construction.
#[derive(Clone, Debug)]
pub struct ConvexityConstraint {
    ee_load: EndeffectorLoad,
    jac: Jacobian,
}

impl ConvexityConstraint {
    pub fn new(ee_load: &EndeffectorLoad) -> Self {
        let m = ee_load.number_of_segments();
        let n = ee_load.opt_var_count();
        let mut jac = JacobianBuilder::new(m, n);
        for k in 0..m {
            for ee in ee_load.load_values_idx(k).endeffectors_ordered() {
                jac.insert(k, ee_load.index_discrete(k, ee), 1.0);
            }
        }

        Self {
            ee_load: ee_load.clone(),
            jac: jac.build(),
        }
    }
}

impl Constraint for ConvexityConstraint {
    fn name(&self) -> &str {
        "Convexity"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.ee_load.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        DVector::from_fn(self.number_of_constraints(), |k, _| {
            self.ee_load.load_values_idx(k).iter().sum::<f64>()
        })
    }

    fn bounds(&self) -> VecBound {
        vec![Bound::equality(1.0); self.number_of_constraints()]
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        (var_set == self.ee_load.id()).then(|| self.jac.clone())
    }

    fn number_of_constraints(&self) -> usize {
        self.ee_load.number_of_segments()
    }
}
