//! Prefer an even load split between the footholds in contact.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, EndeffectorId, VecBound};
use lo_motion::{EndeffectorLoad, EndeffectorsMotion, OptimizationVariables, VarSetId, VariableProvider};
use nalgebra::DVector;

/// Per load segment `k` with `m` end-effectors in contact:
/// `g_k = sum (lambda^2 - 2 lambda / m)` with bound `-1/m`.
///
/// When the loads sum to one, `g_k + 1/m = sum (lambda - 1/m)^2`, so the
/// constraint holds exactly when the CoP sits at the center of the support
/// polygon. Mostly used as a soft constraint.
#[derive(Clone, Debug)]
pub struct PolygonCenterConstraint {
    ee_load: EndeffectorLoad,
    in_contact: Vec<Vec<EndeffectorId>>,
}

impl PolygonCenterConstraint {
    pub fn new(ee_load: &EndeffectorLoad, ee_motion: &EndeffectorsMotion) -> Self {
        let in_contact = (0..ee_load.number_of_segments())
            .map(|k| {
                let t = ee_load.segment_start(k);
                ee_motion.contacts(t).into_iter().map(|c| c.ee).collect()
            })
            .collect();
        Self {
            ee_load: ee_load.clone(),
            in_contact,
        }
    }
}

impl Constraint for PolygonCenterConstraint {
    fn name(&self) -> &str {
        "Polygon Center"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.ee_load.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        DVector::from_fn(self.in_contact.len(), |k, _| {
            let contacts = &self.in_contact[k];
            let m = contacts.len() as f64;
            let lambdas = self.ee_load.load_values_idx(k);
            contacts
                .iter()
                .map(|&ee| {
                    let lambda = lambdas.at(ee);
                    lambda * lambda - 2.0 / m * lambda
                })
                .sum()
        })
    }

    fn bounds(&self) -> VecBound {
        self.in_contact
            .iter()
            .map(|contacts| match contacts.len() {
                0 => Bound::EQUALITY_ZERO,
                m => Bound::equality(-1.0 / m as f64),
            })
            .collect()
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        if var_set != self.ee_load.id() {
            return None;
        }
        let mut jac = JacobianBuilder::new(self.in_contact.len(), self.ee_load.opt_var_count());
        for (k, contacts) in self.in_contact.iter().enumerate() {
            let m = contacts.len() as f64;
            let lambdas = self.ee_load.load_values_idx(k);
            for &ee in contacts {
                let idx = self.ee_load.index_discrete(k, ee);
                jac.insert(k, idx, 2.0 * lambdas.at(ee) - 2.0 / m);
            }
        }
        Some(jac.build())
    }

    fn number_of_constraints(&self) -> usize {
        self.in_contact.len()
    }
}
