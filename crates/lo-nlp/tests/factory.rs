//! Factory wiring and the stacked problem.

mod common;

use common::{double_stance, double_stance_variables, factory_for, scrambled, walking};
use lo_motion::VarSetId;
use lo_nlp::{ConstraintName, CostName, CostWeight, MotionParameters, NlpError};
use nalgebra::DMatrix;

#[test]
fn double_stance_scenario_is_feasible() {
    let p = double_stance();
    let params = MotionParameters {
        phase_durations: vec![vec![0.3], vec![0.3]],
        nominal_stance: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        max_dev_xy: [0.6, 0.1],
        constraints: vec![
            ConstraintName::Convexity,
            ConstraintName::Dynamic,
            ConstraintName::RomBox,
        ],
        costs: vec![],
        ..MotionParameters::default()
    };
    let factory = factory_for(&p, params);
    let vars = double_stance_variables(&p);
    let mut stack = factory.build_stack().unwrap();
    stack.update_variables(&vars).unwrap();

    let violations = stack.violations(1e-9);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn stack_jacobian_spans_all_variables() {
    let params = MotionParameters::default();
    let p = walking(&params);
    let factory = factory_for(&p, params);
    let vars = scrambled(&factory.initial_variables().unwrap());
    let mut stack = factory.build_stack().unwrap();
    stack.update_variables(&vars).unwrap();

    let g = stack.evaluate_constraints();
    let jac = stack.jacobian(&vars);
    assert_eq!(jac.nrows(), g.len());
    assert_eq!(jac.ncols(), vars.total_count());
    assert_eq!(stack.bounds().len(), g.len());

    // the dynamic rows depend on the spline, the support-area rows on the CoP
    let dense = DMatrix::from(&jac);
    let spline = vars.column_range(VarSetId::SplineCoeff).unwrap();
    let cop = vars.column_range(VarSetId::Cop).unwrap();
    assert!(dense.columns(spline.start, spline.len()).amax() > 0.0);
    assert!(dense.columns(cop.start, cop.len()).amax() > 0.0);
}

#[test]
fn stacked_cost_gradient_has_global_length() {
    let mut params = MotionParameters::default();
    params.costs = vec![
        CostWeight {
            name: CostName::ComCost,
            weight: 1.0,
        },
        CostWeight {
            name: CostName::RangeOfMotionCost,
            weight: 10.0,
        },
        CostWeight {
            name: CostName::PolyCenterCost,
            weight: 1.0,
        },
        CostWeight {
            name: CostName::FinalComCost,
            weight: 100.0,
        },
        CostWeight {
            name: CostName::FinalStanceCost,
            weight: 1.0,
        },
    ];
    let p = walking(&params);
    let factory = factory_for(&p, params);
    let vars = scrambled(&factory.initial_variables().unwrap());
    let mut stack = factory.build_stack().unwrap();
    // final stance is not available
    assert_eq!(stack.costs().len(), 4);

    stack.update_variables(&vars).unwrap();
    assert!(stack.evaluate_cost() > 0.0);
    let grad = stack.cost_gradient(&vars);
    assert_eq!(grad.len(), vars.total_count());
    let cop = vars.column_range(VarSetId::Cop).unwrap();
    assert_eq!(grad.rows(cop.start, cop.len()).amax(), 0.0);
}

#[test]
fn names_from_yaml_reach_the_factory() {
    let yaml = r#"
constraints: [init_com, junction_com, dynamic]
costs:
  - name: poly_center_cost
    weight: 2.0
"#;
    let params = MotionParameters::from_yaml_str(yaml).unwrap();
    let p = walking(&params);
    let factory = factory_for(&p, params);
    let stack = factory.build_stack().unwrap();
    let names: Vec<_> = stack.constraints().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["Initial XY", "Junction", "Dynamic"]);
    assert_eq!(stack.costs()[0].name(), "Polygon Center");
}

#[test]
fn unknown_names_are_configuration_errors() {
    let p = double_stance();
    let factory = factory_for(&p, MotionParameters::default());
    let Err(err) = factory.constraint_by_name("moonwalk") else {
        panic!("expected an unknown constraint error");
    };
    assert!(matches!(err, NlpError::UnknownConstraint { .. }));
    assert!(err.to_string().contains("moonwalk"));
}
