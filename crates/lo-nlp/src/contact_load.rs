//! Only end-effectors in contact may carry load.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, VecBound};
use lo_motion::{EndeffectorLoad, EndeffectorsMotion, OptimizationVariables, VarSetId, VariableProvider};
use nalgebra::DVector;

/// Box constraint on every load fraction: `[0, 1]` while the end-effector is
/// in contact at the start of the segment, `[0, 0]` while it swings.
#[derive(Clone, Debug)]
pub struct ContactLoadConstraint {
    ee_load: EndeffectorLoad,
    bounds: VecBound,
    jac: Jacobian,
}

impl ContactLoadConstraint {
    pub fn new(ee_motion: &EndeffectorsMotion, ee_load: &EndeffectorLoad) -> Self {
        let n = ee_load.opt_var_count();
        let mut bounds = vec![Bound::EQUALITY_ZERO; n];
        for k in 0..ee_load.number_of_segments() {
            let t = ee_load.segment_start(k);
            for ee in ee_load.load_values_idx(k).endeffectors_ordered() {
                if ee_motion.is_in_contact(ee, t) {
                    bounds[ee_load.index_discrete(k, ee)] = Bound::new(0.0, 1.0);
                }
            }
        }

        let mut jac = JacobianBuilder::new(n, n);
        for i in 0..n {
            jac.insert(i, i, 1.0);
        }

        Self {
            ee_load: ee_load.clone(),
            bounds,
            jac: jac.build(),
        }
    }
}

impl Constraint for ContactLoadConstraint {
    fn name(&self) -> &str {
        "Contact Load"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.ee_load.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        self.ee_load.optimization_parameters()
    }

    fn bounds(&self) -> VecBound {
        self.bounds.clone()
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        (var_set == self.ee_load.id()).then(|| self.jac.clone())
    }

    fn number_of_constraints(&self) -> usize {
        self.bounds.len()
    }
}
