//! Footholds stay within a box around their nominal position below the CoM.

use crate::constraint::{Constraint, Jacobian, JacobianBuilder};
use crate::error::{NlpError, NlpResult};
use lo_core::{Bound, Coord, K_DIM2D, VecBound, sample_times};
use lo_motion::{
    ComMotion, EndeffectorsMotion, MotionDerivative, OptimizationVariables, VarSetId,
    VariableProvider,
};
use nalgebra::{DVector, Vector3};
use tracing::{trace, warn};

/// Lifecycle of the constant Jacobian blocks.
///
/// The blocks are assembled on the first variable update and frozen
/// afterwards. The CoM spline is linear in its coefficients, so its position
/// Jacobian only depends on time. A request before the first update is
/// answered with freshly assembled blocks and a warning.
#[derive(Clone, Debug)]
enum JacobianState {
    Initialized,
    Cached {
        wrt_contacts: Jacobian,
        wrt_motion: Jacobian,
    },
}

/// For every sample and every foothold in contact:
/// `nominal(ee) - max_dev <= p_xy(ee) - com_xy <= nominal(ee) + max_dev`.
///
/// Start-stance footholds are constants, so their residual is `-com_xy` and
/// their bound is shifted by the foothold position instead. The samples
/// include the end of the motion so the final stance is constrained as well.
#[derive(Clone, Debug)]
pub struct RangeOfMotionBox {
    com_motion: Box<dyn ComMotion>,
    ee_motion: EndeffectorsMotion,
    dts: Vec<f64>,
    max_deviation_from_nominal: [f64; 2],
    nominal_stance: Vec<Vector3<f64>>,
    state: JacobianState,
}

impl RangeOfMotionBox {
    pub fn new(
        com_motion: &dyn ComMotion,
        ee_motion: &EndeffectorsMotion,
        dt: f64,
        max_deviation_from_nominal: [f64; 2],
        nominal_stance: Vec<Vector3<f64>>,
    ) -> NlpResult<Self> {
        if nominal_stance.len() < ee_motion.endeffector_count() {
            return Err(NlpError::InvalidParameter {
                what: format!(
                    "nominal stance has {} entries for {} end-effectors",
                    nominal_stance.len(),
                    ee_motion.endeffector_count()
                ),
            });
        }
        if max_deviation_from_nominal.iter().any(|d| d.is_nan() || *d < 0.0) {
            return Err(NlpError::InvalidParameter {
                what: "maximum deviation from nominal must be non-negative".to_string(),
            });
        }

        Ok(Self {
            com_motion: com_motion.clone_box(),
            ee_motion: ee_motion.clone(),
            dts: sample_times(ee_motion.total_time(), dt, true),
            max_deviation_from_nominal,
            nominal_stance,
            state: JacobianState::Initialized,
        })
    }

    pub fn sample_times(&self) -> &[f64] {
        &self.dts
    }

    /// Whether the Jacobian blocks have been frozen by a variable update.
    pub fn is_jacobian_cached(&self) -> bool {
        matches!(self.state, JacobianState::Cached { .. })
    }

    fn jacobian_wrt_contacts(&self) -> Jacobian {
        let mut jac =
            JacobianBuilder::new(self.number_of_constraints(), self.ee_motion.opt_var_count());
        let mut row = 0;
        for &t in &self.dts {
            for c in self.ee_motion.contacts(t) {
                for dim in Coord::XY {
                    if let Some(idx) = self.ee_motion.index(c.id, dim) {
                        jac.insert(row + dim.index(), idx, 1.0);
                    }
                }
                row += K_DIM2D;
            }
        }
        jac.build()
    }

    fn jacobian_wrt_motion(&self) -> Jacobian {
        let mut jac =
            JacobianBuilder::new(self.number_of_constraints(), self.com_motion.opt_var_count());
        let mut row = 0;
        for &t in &self.dts {
            for _ in self.ee_motion.contacts(t) {
                for dim in Coord::XY {
                    let jac_pos = self.com_motion.jacobian(t, MotionDerivative::Pos, dim);
                    jac.set_row(row, &-jac_pos);
                    row += 1;
                }
            }
        }
        jac.build()
    }
}

impl Constraint for RangeOfMotionBox {
    fn name(&self) -> &str {
        "Range of Motion"
    }

    fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        self.com_motion.update_from(vars)?;
        self.ee_motion.update_from(vars)?;

        if let JacobianState::Initialized = self.state {
            self.state = JacobianState::Cached {
                wrt_contacts: self.jacobian_wrt_contacts(),
                wrt_motion: self.jacobian_wrt_motion(),
            };
            trace!(rows = self.number_of_constraints(), "range-of-motion Jacobians frozen");
        }
        Ok(())
    }

    fn evaluate_constraint(&self) -> DVector<f64> {
        let mut g = Vec::with_capacity(self.number_of_constraints());
        for &t in &self.dts {
            let com_xy = self.com_motion.base(t).pos.p.xy();
            for c in self.ee_motion.contacts(t) {
                let rel = if c.id.is_fixed() {
                    -com_xy
                } else {
                    c.p.xy() - com_xy
                };
                g.extend_from_slice(rel.as_slice());
            }
        }
        DVector::from_vec(g)
    }

    fn bounds(&self) -> VecBound {
        let mut bounds = Vec::with_capacity(self.number_of_constraints());
        for &t in &self.dts {
            for c in self.ee_motion.contacts(t) {
                let f_nom = self.nominal_stance[c.ee.index()];
                for dim in Coord::XY {
                    let dev = self.max_deviation_from_nominal[dim.index()];
                    let mut b = Bound::new(-dev, dev);
                    b += f_nom[dim.index()];
                    if c.id.is_fixed() {
                        b -= c.p[dim.index()];
                    }
                    bounds.push(b);
                }
            }
        }
        bounds
    }

    fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
        match (&self.state, var_set) {
            (_, VarSetId::Convexity | VarSetId::Cop) => None,
            (JacobianState::Cached { wrt_contacts, .. }, VarSetId::Footholds) => {
                Some(wrt_contacts.clone())
            }
            (JacobianState::Cached { wrt_motion, .. }, VarSetId::SplineCoeff) => {
                Some(wrt_motion.clone())
            }
            // the blocks only depend on time and the contact schedule
            (JacobianState::Initialized, VarSetId::Footholds) => {
                warn!("range-of-motion Jacobian requested before the first variable update");
                Some(self.jacobian_wrt_contacts())
            }
            (JacobianState::Initialized, VarSetId::SplineCoeff) => {
                warn!("range-of-motion Jacobian requested before the first variable update");
                Some(self.jacobian_wrt_motion())
            }
        }
    }

    fn number_of_constraints(&self) -> usize {
        self.dts
            .iter()
            .map(|&t| self.ee_motion.contacts(t).len() * K_DIM2D)
            .sum()
    }
}
