//! Shared fixtures for the lo-nlp integration tests.

#![allow(dead_code)]

use lo_core::Point2d;
use lo_motion::{
    CenterOfPressure, ComSpline, EndeffectorLoad, EndeffectorsMotion, OptimizationVariables,
    VarSetId,
};
use lo_nlp::{CostConstraintFactory, MotionParameters};
use nalgebra::{DVector, Vector2, Vector3};

pub struct Providers {
    pub com: ComSpline,
    pub ee_motion: EndeffectorsMotion,
    pub ee_load: EndeffectorLoad,
    pub cop: CenterOfPressure,
}

/// Two feet on the ground for 0.3 s at (0,0) and (1,0), dt 0.1.
pub fn double_stance() -> Providers {
    let ee_motion = EndeffectorsMotion::from_phase_durations(
        vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
        &[vec![0.3], vec![0.3]],
    )
    .unwrap();
    let mut com = ComSpline::uniform(0.3, 0.3, 0.58).unwrap();
    com.hold_position(Vector2::new(0.5, 0.0));
    let ee_load = EndeffectorLoad::new(&ee_motion, 0.1).unwrap();
    let cop = CenterOfPressure::new(0.3, 0.1).unwrap();
    Providers {
        com,
        ee_motion,
        ee_load,
        cop,
    }
}

/// Variables of [`double_stance`]: CoM held at (0.5, 0), even loads, CoP at
/// the midpoint.
pub fn double_stance_variables(p: &Providers) -> OptimizationVariables {
    let factory = factory_for(p, MotionParameters::default());
    let mut vars = factory.initial_variables().unwrap();
    let n_cop = vars.variables(VarSetId::Cop).unwrap().len();
    let cop = DVector::from_fn(n_cop, |i, _| if i % 2 == 0 { 0.5 } else { 0.0 });
    vars.set_variables(VarSetId::Cop, cop).unwrap();
    vars
}

/// A biped stepping in place over 1.2 s with one free foothold per foot.
pub fn walking_params() -> MotionParameters {
    MotionParameters::default()
}

pub fn walking(params: &MotionParameters) -> Providers {
    let start = params.nominal_stance_in_base();
    let ee_motion = EndeffectorsMotion::from_phase_durations(start, &params.phase_durations).unwrap();
    let total = ee_motion.total_time();
    let com = ComSpline::uniform(total, params.spline_segment_duration, params.walking_height)
        .unwrap();
    let ee_load = EndeffectorLoad::new(&ee_motion, params.dt_nodes).unwrap();
    let cop = CenterOfPressure::new(total, params.dt_nodes).unwrap();
    Providers {
        com,
        ee_motion,
        ee_load,
        cop,
    }
}

pub fn factory_for(p: &Providers, params: MotionParameters) -> CostConstraintFactory {
    CostConstraintFactory::new(
        &p.com,
        &p.ee_motion,
        &p.ee_load,
        &p.cop,
        params,
        Point2d::default(),
        Point2d::at_rest(Vector2::new(0.2, 0.0)),
    )
}

/// Deterministic, non-trivial values for every variable set.
pub fn scrambled(vars: &OptimizationVariables) -> OptimizationVariables {
    let mut out = vars.clone();
    let x = vars.to_vector();
    let scrambled = DVector::from_fn(x.len(), |i, _| {
        let s = (i as f64 * 0.7).sin();
        x[i] + 0.1 * s
    });
    out.set_from_vector(&scrambled).unwrap();
    out
}
