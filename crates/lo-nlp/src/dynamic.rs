//! Zero-moment-point consistency of the CoM motion.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::{Bound, Coord, GRAVITY, K_DIM2D, VecBound, sample_times};
use lo_motion::{
    ComMotion, EndeffectorLoad, EndeffectorsMotion, MotionDerivative, OptimizationVariables,
    VarSetId, VariableProvider,
};
use nalgebra::{DVector, Vector2};

/// Cart-table model: the ZMP `p_xy - h/g * a_xy` of the CoM must coincide
/// with the load-weighted centroid of the footholds in contact.
///
/// Residual per sample: `zmp(t) - sum_contacts lambda(ee, t) * p_xy(ee, t)`.
#[derive(Clone, Debug)]
pub struct DynamicConstraint {
    com_motion: Box<dyn ComMotion>,
    ee_motion: EndeffectorsMotion,
    ee_load: EndeffectorLoad,
    dts: Vec<f64>,
}

impl DynamicConstraint {
    pub fn new(
        com_motion: &dyn ComMotion,
        ee_motion: &EndeffectorsMotion,
        ee_load: &EndeffectorLoad,
        total_time: f64,
        dt: f64,
    ) -> Self {
        Self {
            com_motion: com_motion.clone_box(),
            ee_motion: ee_motion.clone(),
            ee_load: ee_load.clone(),
            dts: sample_times(total_time, dt, false),
        }
    }

    /// `h / g` at time `t`.
    fn zmp_factor(&self, t: f64) -> f64 {
        self.com_motion.base(t).pos.p.z / GRAVITY
    }

    fn zmp(&self, t: f64) -> Vector2<f64> {
        let base = self.com_motion.base(t);
        base.pos.p.xy() - self.zmp_factor(t) * base.pos.a.xy()
    }

    fn jacobian_wrt_motion(&self) -> Jacobian {
        let mut jac =
            JacobianBuilder::new(self.number_of_constraints(), self.com_motion.opt_var_count());
        for (k, &t) in self.dts.iter().enumerate() {
            let factor = self.zmp_factor(t);
            for dim in Coord::XY {
                let row = self.com_motion.jacobian(t, MotionDerivative::Pos, dim)
                    - factor * self.com_motion.jacobian(t, MotionDerivative::Acc, dim);
                jac.set_row(K_DIM2D * k + dim.index(), &row);
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
                        jac.insert(K_DIM2D * k + dim.index(), idx, -lambda_k.at(f.ee));
                    }
                }
            }
        }
        jac.build()
    }

    fn jacobian_wrt_loads(&self) -> Jacobian {
        let mut jac = JacobianBuilder::new(self.number_of_constraints(), self.ee_load.opt_var_count());
        for (k, &t) in self.dts.iter().enumerate() {
            for f in self.ee_motion.contacts(t) {
                let idx = self.ee_load.index(t, f.ee);
                for dim in Coord::XY {
                    jac.insert(K_DIM2D * k + dim.index(), idx, -f.p[dim.index()]);
                }
            }
        }
        jac.build()
    }
}

impl Constraint for DynamicConstraint {
    fn name(&self) -> &str {
        "Dynamic"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.com_motion.update_from(vars)?;
        self.ee_motion.update_from(vars)?;
        self.ee_load.update_from(vars)?;
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        let mut g = DVector::zeros(self.number_of_constraints());
        for (k, &t) in self.dts.iter().enumerate() {
            let lambda_k = self.ee_load.load_values(t);
            let mut weighted_contacts = Vector2::zeros();
            for f in self.ee_motion.contacts(t) {
                weighted_contacts += lambda_k.at(f.ee) * f.p.xy();
            }
            g.fixed_rows_mut::<K_DIM2D>(K_DIM2D * k)
                .copy_from(&(self.zmp(t) - weighted_contacts));
        }
        g
    }

    fn bounds(&self) -> VecBound {
        vec![Bound::EQUALITY_ZERO; self.number_of_constraints()]
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        match var_set {
            VarSetId::SplineCoeff => Some(self.jacobian_wrt_motion()),
            VarSetId::Footholds => Some(self.jacobian_wrt_contacts()),
            VarSetId::Convexity => Some(self.jacobian_wrt_loads()),
            VarSetId::Cop => None,
        }
    }

    fn number_of_constraints(&self) -> usize {
        self.dts.len() * K_DIM2D
    }
}
