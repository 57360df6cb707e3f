//! The center of pressure is the load-weighted centroid of the footholds.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, Coord, K_DIM2D, VecBound, sample_times};
use lo_motion::{
    CenterOfPressure, EndeffectorLoad, EndeffectorsMotion, OptimizationVariables, VarSetId,
    VariableProvider,
};
use nalgebra::{DVector, Vector2};

/// `sum_contacts lambda(ee, t) * p_xy(ee, t) - cop(t) = 0` at every sample.
///
/// Together with [`crate::ConvexityConstraint`] and
/// [`crate::ContactLoadConstraint`] this places the CoP inside the convex hull
/// of the footholds in contact.
#[derive(Clone, Debug)]
pub struct SupportAreaConstraint {
    ee_motion: EndeffectorsMotion,
    ee_load: EndeffectorLoad,
    cop: CenterOfPressure,
    dts: Vec<f64>,
}

impl SupportAreaConstraint {
    pub fn new(
        ee_motion: &EndeffectorsMotion,
        ee_load: &EndeffectorLoad,
        cop: &CenterOfPressure,
        total_time: f64,
        dt: f64,
    ) -> Self {
        Self {
            ee_motion: ee_motion.clone(),
            ee_load: ee_load.clone(),
            cop: cop.clone(),
            dts: sample_times(total_time, dt, false),
        }
    }

    pub fn sample_times(&self) -> &[f64] {
        &self.dts
    }

    fn jacobian_wrt_loads(&self) -> Jacobian {
        let mut jac = JacobianBuilder::new(self.number_of_constraints(), self.ee_load.opt_var_count());
        for (k, &t) in self.dts.iter().enumerate() {
            for f in self.ee_motion.contacts(t) {
                let idx = self.ee_load.index(t, f.ee);
                for dim in Coord::XY {
                    jac.insert(K_DIM2D * k + dim.index(), idx, f.p[dim.index()]);
                }
            }
        }
        jac.build()
    }

    fn jacobian_wrt_contacts(&self) -> Jacobian {
        let mut jac =
            JacobianBuilder::new(self.number_of_constraints(), self.ee_motion.opt_var_count());
        for (k, &t) in self.dts.iter().enumerate() {
            let lambda_k = self.ee_load.load_values(t);
            for f in self.ee_motion.contacts(t) {
                for dim in Coord::XY {
                    if let Some(idx) = self.ee_motion.index(f.id, dim) {
                        jac.insert(K_DIM2D * k + dim.index(), idx, lambda_k.at(f.ee));
                    }
                }
            }
        }
        jac.build()
    }

    fn jacobian_wrt_cop(&self) -> Jacobian {
        let mut jac = JacobianBuilder::new(self.number_of_constraints(), self.cop.opt_var_count());
        for (k, &t) in self.dts.iter().enumerate() {
            for dim in Coord::XY {
                jac.set_row(K_DIM2D * k + dim.index(), &-self.cop.jacobian_wrt_cop(t, dim));
            }
        }
        jac.build()
    }
}

impl Constraint for SupportAreaConstraint {
    fn name(&self) -> &str {
        "Support Area"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.ee_load.update_from(vars)?;
        self.ee_motion.update_from(vars)?;
        self.cop.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        let mut g = DVector::zeros(self.number_of_constraints());
        for (k, &t) in self.dts.iter().enumerate() {
            let lambda_k = self.ee_load.load_values(t);
            let mut convex_contacts = Vector2::zeros();
            for f in self.ee_motion.contacts(t) {
                convex_contacts += lambda_k.at(f.ee) * f.p.xy();
            }
            g.fixed_rows_mut::<K_DIM2D>(K_DIM2D * k)
                .copy_from(&(convex_contacts - self.cop.cop(t)));
        }
        g
    }

    fn bounds(&self) -> VecBound {
        vec![Bound::EQUALITY_ZERO; self.number_of_constraints()]
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        match var_set {
            VarSetId::Convexity => Some(self.jacobian_wrt_loads()),
            VarSetId::Footholds => Some(self.jacobian_wrt_contacts()),
            VarSetId::Cop => Some(self.jacobian_wrt_cop()),
            VarSetId::SplineCoeff => None,
        }
    }

    fn number_of_constraints(&self) -> usize {
        self.dts.len() * K_DIM2D
    }
}
