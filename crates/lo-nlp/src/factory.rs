//! Build named constraints and costs against one set of providers.

use crate::constraint::{Constraint, Cost};
use crate::contact_load::ContactLoadConstraint;
use crate::convexity::ConvexityConstraint;
use crate::dynamic::DynamicConstraint;
use crate::error::{NlpError, NlpResult};
use crate::params::{ConstraintName, CostName, MotionParameters};
use crate::polygon_center::PolygonCenterConstraint;
use crate::quadratic_cost::QuadraticSplineCost;
use crate::range_of_motion::RangeOfMotionBox;
use crate::soft_constraint::SoftConstraint;
use crate::spline_equality::LinearSplineEqualityConstraint;
use crate::stack::ConstraintStack;
use crate::support_area::SupportAreaConstraint;
use lo_core::{Bound, MatVec, Point2d};
use lo_motion::{
    CenterOfPressure, ComMotion, EndeffectorLoad, EndeffectorsMotion, LinearSplineEquations,
    MotionDerivative, OptimizationVariables, VariableProvider, VariableSet,
};
use nalgebra::DVector;
use tracing::{debug, warn};

pub type ConstraintPtrVec = Vec<Box<dyn Constraint>>;

/// Owns the providers and hands out freshly built terms.
///
/// Every term receives its own copy of the providers it reads.
#[derive(Debug)]
pub struct CostConstraintFactory {
    com_motion: Box<dyn ComMotion>,
    ee_motion: EndeffectorsMotion,
    ee_load: EndeffectorLoad,
    cop: CenterOfPressure,
    params: MotionParameters,
    initial_geom_state: Point2d,
    final_geom_state: Point2d,
}

impl CostConstraintFactory {
    /// `initial_geom_state` and `final_geom_state` describe the geometric
    /// base center; the CoM states are shifted by
    /// [`MotionParameters::offset_geom_to_com`].
    pub fn new(
        com_motion: &dyn ComMotion,
        ee_motion: &EndeffectorsMotion,
        ee_load: &EndeffectorLoad,
        cop: &CenterOfPressure,
        params: MotionParameters,
        initial_geom_state: Point2d,
        final_geom_state: Point2d,
    ) -> Self {
        Self {
            com_motion: com_motion.clone_box(),
            ee_motion: ee_motion.clone(),
            ee_load: ee_load.clone(),
            cop: cop.clone(),
            params,
            initial_geom_state,
            final_geom_state,
        }
    }

    pub fn params(&self) -> &MotionParameters {
        &self.params
    }

    /// `Ok(None)` for terms that have no implementation yet.
    pub fn constraint(&self, name: ConstraintName) -> NlpResult<Option<ConstraintPtrVec>> {
        let built = match name {
            ConstraintName::InitCom => Some(self.make_initial_constraint()),
            ConstraintName::FinalCom => Some(self.make_final_constraint()),
            ConstraintName::JunctionCom => Some(self.make_junction_constraint()),
            ConstraintName::Convexity => Some(self.make_convexity_constraint()),
            ConstraintName::Dynamic => Some(self.make_dynamic_constraint()),
            ConstraintName::RomBox => Some(self.make_range_of_motion_constraint()?),
            ConstraintName::FinalStance | ConstraintName::Obstacle => {
                warn!(constraint = %name, "constraint not yet available, skipping");
                None
            }
        };
        if let Some(constraints) = &built {
            debug!(
                constraint = %name,
                terms = constraints.len(),
                rows = constraints.iter().map(|c| c.number_of_constraints()).sum::<usize>(),
                "built constraint"
            );
        }
        Ok(built)
    }

    /// Parse `name` first; unknown names are configuration errors.
    pub fn constraint_by_name(&self, name: &str) -> NlpResult<Option<ConstraintPtrVec>> {
        self.constraint(name.parse()?)
    }

    pub fn cost(&self, name: CostName, weight: f64) -> NlpResult<Option<Box<dyn Cost>>> {
        let cost: Option<Box<dyn Cost>> = match name {
            CostName::ComCost => Some(Box::new(self.make_motion_cost(weight)?)),
            CostName::RangeOfMotionCost => {
                let rom = self.make_range_of_motion_constraint()?;
                Some(to_cost(rom, weight))
            }
            CostName::PolyCenterCost => Some(to_cost(self.make_polygon_center_constraint(), weight)),
            CostName::FinalComCost => Some(to_cost(self.make_final_constraint(), weight)),
            CostName::FinalStanceCost => {
                warn!(cost = %name, "cost not yet available, skipping");
                None
            }
        };
        if cost.is_some() {
            debug!(cost = %name, weight, "built cost");
        }
        Ok(cost)
    }

    pub fn cost_by_name(&self, name: &str, weight: f64) -> NlpResult<Option<Box<dyn Cost>>> {
        self.cost(name.parse()?, weight)
    }

    pub fn spline_coeff_variables(&self) -> VariableSet {
        VariableSet::new(
            self.com_motion.optimization_parameters(),
            self.com_motion.id(),
        )
    }

    pub fn contact_variables(&self) -> VariableSet {
        VariableSet::new(self.ee_motion.optimization_parameters(), self.ee_motion.id())
    }

    /// Every end-effector starts out carrying half the load.
    pub fn convexity_variables(&self) -> VariableSet {
        let lambdas = DVector::from_element(self.ee_load.opt_var_count(), 0.5);
        VariableSet::with_bound(lambdas, self.ee_load.id(), Bound::new(0.0, 1.0))
    }

    pub fn cop_variables(&self) -> VariableSet {
        VariableSet::new(self.cop.optimization_parameters(), self.cop.id())
    }

    /// All four variable sets in solver order.
    pub fn initial_variables(&self) -> NlpResult<OptimizationVariables> {
        let mut vars = OptimizationVariables::new();
        vars.add_set(self.spline_coeff_variables())?;
        vars.add_set(self.contact_variables())?;
        vars.add_set(self.convexity_variables())?;
        vars.add_set(self.cop_variables())?;
        Ok(vars)
    }

    /// Every constraint and cost listed in the parameters, skipping the ones
    /// that are not available.
    pub fn build_stack(&self) -> NlpResult<ConstraintStack> {
        let mut stack = ConstraintStack::new();
        for &name in &self.params.constraints {
            if let Some(constraints) = self.constraint(name)? {
                stack.add_constraints(constraints);
            }
        }
        for cost in &self.params.costs {
            if let Some(c) = self.cost(cost.name, cost.weight)? {
                stack.add_cost(c);
            }
        }
        Ok(stack)
    }

    fn com_state(&self, geom: &Point2d) -> Point2d {
        let mut state = *geom;
        state.p += self.params.offset_geom_to_com().xy();
        state
    }

    fn make_initial_constraint(&self) -> ConstraintPtrVec {
        let eq = LinearSplineEquations::new(self.com_motion.as_ref());
        let state = self.com_state(&self.initial_geom_state);
        vec![Box::new(LinearSplineEqualityConstraint::new(
            self.com_motion.as_ref(),
            eq.make_initial(&state),
            "Initial XY",
        ))]
    }

    fn make_final_constraint(&self) -> ConstraintPtrVec {
        let eq = LinearSplineEquations::new(self.com_motion.as_ref());
        let state = self.com_state(&self.final_geom_state);
        let derivs = [
            MotionDerivative::Pos,
            MotionDerivative::Vel,
            MotionDerivative::Acc,
        ];
        vec![Box::new(LinearSplineEqualityConstraint::new(
            self.com_motion.as_ref(),
            eq.make_final(&state, &derivs),
            "Final XY",
        ))]
    }

    fn make_junction_constraint(&self) -> ConstraintPtrVec {
        let eq = LinearSplineEquations::new(self.com_motion.as_ref());
        vec![Box::new(LinearSplineEqualityConstraint::new(
            self.com_motion.as_ref(),
            eq.make_junction(),
            "Junction",
        ))]
    }

    fn make_dynamic_constraint(&self) -> ConstraintPtrVec {
        vec![Box::new(DynamicConstraint::new(
            self.com_motion.as_ref(),
            &self.ee_motion,
            &self.ee_load,
            self.ee_motion.total_time(),
            self.params.dt_nodes,
        ))]
    }

    fn make_range_of_motion_constraint(&self) -> NlpResult<ConstraintPtrVec> {
        let rom = RangeOfMotionBox::new(
            self.com_motion.as_ref(),
            &self.ee_motion,
            self.params.dt_nodes,
            self.params.max_deviation_from_nominal(),
            self.params.nominal_stance_in_base(),
        )?;
        Ok(vec![Box::new(rom)])
    }

    fn make_convexity_constraint(&self) -> ConstraintPtrVec {
        vec![
            Box::new(SupportAreaConstraint::new(
                &self.ee_motion,
                &self.ee_load,
                &self.cop,
                self.ee_motion.total_time(),
                self.params.dt_nodes,
            )),
            Box::new(ConvexityConstraint::new(&self.ee_load)),
            Box::new(ContactLoadConstraint::new(&self.ee_motion, &self.ee_load)),
        ]
    }

    fn make_polygon_center_constraint(&self) -> ConstraintPtrVec {
        vec![Box::new(PolygonCenterConstraint::new(
            &self.ee_load,
            &self.ee_motion,
        ))]
    }

    fn make_motion_cost(&self, weight: f64) -> NlpResult<QuadraticSplineCost> {
        let eq = LinearSplineEquations::new(self.com_motion.as_ref());
        let term = match self.params.com_motion_cost {
            MotionDerivative::Acc => eq.make_acceleration(self.params.weight_com_motion_xy),
            MotionDerivative::Jerk => eq.make_jerk(self.params.weight_com_motion_xy),
            other => {
                return Err(NlpError::InvalidParameter {
                    what: format!("no CoM motion cost for derivative {other:?}"),
                });
            }
        };
        let n = term.nrows();
        let mv = MatVec {
            m: term * weight,
            v: DVector::zeros(n),
        };
        Ok(QuadraticSplineCost::new(self.com_motion.as_ref(), mv))
    }
}

/// Every builder above returns exactly one term for the cost variants.
fn to_cost(mut constraints: ConstraintPtrVec, weight: f64) -> Box<dyn Cost> {
    debug_assert_eq!(constraints.len(), 1);
    let constraint = constraints.swap_remove(0);
    Box::new(SoftConstraint::new(constraint, weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lo_motion::{ComSpline, VarSetId};
    use nalgebra::{Vector2, Vector3};

    fn factory(params: MotionParameters) -> CostConstraintFactory {
        let stance = vec![Vector3::new(0.0, 0.1, 0.0), Vector3::new(0.0, -0.1, 0.0)];
        let ee_motion =
            EndeffectorsMotion::from_phase_durations(stance, &params.phase_durations).unwrap();
        let total = ee_motion.total_time();
        let mut com = ComSpline::uniform(total, params.spline_segment_duration, params.walking_height)
            .unwrap();
        com.hold_position(Vector2::zeros());
        let ee_load = EndeffectorLoad::new(&ee_motion, params.dt_nodes).unwrap();
        let cop = CenterOfPressure::new(total, params.dt_nodes).unwrap();
        CostConstraintFactory::new(
            &com,
            &ee_motion,
            &ee_load,
            &cop,
            params,
            Point2d::default(),
            Point2d::at_rest(Vector2::new(0.2, 0.0)),
        )
    }

    #[test]
    fn convexity_expands_to_three_terms() {
        let f = factory(MotionParameters::default());
        let terms = f.constraint(ConstraintName::Convexity).unwrap().unwrap();
        let names: Vec<_> = terms.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["Support Area", "Convexity", "Contact Load"]);
    }

    #[test]
    fn unavailable_terms_are_none() {
        let f = factory(MotionParameters::default());
        assert!(f.constraint(ConstraintName::FinalStance).unwrap().is_none());
        assert!(f.constraint(ConstraintName::Obstacle).unwrap().is_none());
        assert!(f.cost(CostName::FinalStanceCost, 1.0).unwrap().is_none());
    }

    #[test]
    fn unknown_names_are_rejected() {
        let f = factory(MotionParameters::default());
        assert!(matches!(
            f.constraint_by_name("levitate"),
            Err(NlpError::UnknownConstraint { .. })
        ));
        assert!(matches!(
            f.cost_by_name("effort", 1.0),
            Err(NlpError::UnknownCost { .. })
        ));
    }

    #[test]
    fn convexity_variables_start_at_half() {
        let f = factory(MotionParameters::default());
        let set = f.convexity_variables();
        assert_eq!(set.id, VarSetId::Convexity);
        assert!(set.values.iter().all(|&v| v == 0.5));
        assert!(set.bounds.iter().all(|b| *b == Bound::new(0.0, 1.0)));
    }

    #[test]
    fn initial_variables_hold_all_sets() {
        let f = factory(MotionParameters::default());
        let vars = f.initial_variables().unwrap();
        for id in VarSetId::ALL {
            assert!(vars.contains(id), "missing {id}");
        }
    }

    #[test]
    fn initial_state_is_shifted_by_offset() {
        let params = MotionParameters {
            offset_geom_to_com: [0.05, -0.02, 0.0],
            ..MotionParameters::default()
        };
        let f = factory(params);
        let init = f.constraint(ConstraintName::InitCom).unwrap().unwrap();
        let bounds = init[0].bounds();
        // rows: pos x, pos y, vel x, vel y, acc x, acc y
        assert_eq!(bounds[0], Bound::equality(0.05));
        assert_eq!(bounds[1], Bound::equality(-0.02));
    }

    #[test]
    fn jerk_cost_is_built() {
        let params = MotionParameters {
            com_motion_cost: MotionDerivative::Jerk,
            ..MotionParameters::default()
        };
        let f = factory(params);
        let cost = f.cost(CostName::ComCost, 2.0).unwrap().unwrap();
        assert_eq!(cost.name(), "CoM Motion");
    }

    #[test]
    fn position_cost_is_rejected() {
        let mut params = MotionParameters::default();
        params.com_motion_cost = MotionDerivative::Pos;
        let f = factory(params);
        assert!(matches!(
            f.cost(CostName::ComCost, 1.0),
            Err(NlpError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn stack_follows_parameters() {
        let mut params = MotionParameters::default();
        params.constraints.push(ConstraintName::Obstacle);
        let f = factory(params);
        let stack = f.build_stack().unwrap();
        // init, final, junction, 3x convexity, dynamic, rom
        assert_eq!(stack.constraints().len(), 8);
        assert_eq!(stack.costs().len(), 1);
    }
}
