use clap::{Parser, Subcommand};
use lo_core::Point2d;
use lo_motion::{
    CenterOfPressure, ComSpline, EndeffectorLoad, EndeffectorsMotion, VarSetId,
};
use lo_nlp::{
    ConstraintName, CostConstraintFactory, CostName, MotionParameters, NlpResult,
    check_constraint_jacobian,
};
use nalgebra::Vector2;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "lo-cli")]
#[command(about = "Build and inspect legged-locomotion NLP constraints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a motion parameter file
    Validate {
        /// Path to the parameter YAML file
        params_path: PathBuf,
    },
    /// Print the default motion parameters as YAML
    Defaults,
    /// List the constraint and cost names understood by the factory
    Terms,
    /// Build every configured term for a demonstration gait and evaluate it
    Evaluate {
        /// Path to the parameter YAML file (defaults are used if omitted)
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Goal position of the base in x [m]
        #[arg(long, default_value_t = 0.0)]
        goal_x: f64,
        /// Goal position of the base in y [m]
        #[arg(long, default_value_t = 0.0)]
        goal_y: f64,
        /// Compare analytic Jacobians against central differences
        #[arg(long)]
        check_jacobians: bool,
        /// Tolerance for reporting bound violations
        #[arg(long, default_value_t = 1e-6)]
        tol: f64,
    },
}

fn main() -> NlpResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { params_path } => cmd_validate(&params_path),
        Commands::Defaults => cmd_defaults(),
        Commands::Terms => {
            cmd_terms();
            Ok(())
        }
        Commands::Evaluate {
            params,
            goal_x,
            goal_y,
            check_jacobians,
            tol,
        } => cmd_evaluate(
            params.as_deref(),
            Vector2::new(goal_x, goal_y),
            check_jacobians,
            tol,
        ),
    }
}

fn load_params(path: Option<&Path>) -> NlpResult<MotionParameters> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading motion parameters");
            MotionParameters::load_yaml(path)
        }
        None => Ok(MotionParameters::default()),
    }
}

fn cmd_validate(params_path: &Path) -> NlpResult<()> {
    println!("Validating parameters: {}", params_path.display());
    let params = MotionParameters::load_yaml(params_path)?;
    println!("✓ Parameters are valid");
    println!("  End-effectors: {}", params.phase_durations.len());
    println!("  Constraints: {}", params.constraints.len());
    println!("  Costs: {}", params.costs.len());
    Ok(())
}

fn cmd_defaults() -> NlpResult<()> {
    print!("{}", MotionParameters::default().to_yaml_string()?);
    Ok(())
}

fn cmd_terms() {
    println!("Constraints:");
    for name in ConstraintName::ALL {
        println!("  {name}");
    }
    println!("Costs:");
    for name in CostName::ALL {
        println!("  {name}");
    }
}

/// Providers for a gait that keeps the start stance at the nominal stance
/// and the CoM above the origin.
fn demo_factory(params: MotionParameters, goal: Vector2<f64>) -> NlpResult<CostConstraintFactory> {
    let ee_motion = EndeffectorsMotion::from_phase_durations(
        params.nominal_stance_in_base(),
        &params.phase_durations,
    )?;
    let total = ee_motion.total_time();
    let mut com = ComSpline::uniform(total, params.spline_segment_duration, params.walking_height)?;
    com.hold_position(params.offset_geom_to_com().xy());
    let ee_load = EndeffectorLoad::new(&ee_motion, params.dt_nodes)?;
    let cop = CenterOfPressure::new(total, params.dt_nodes)?;

    info!(
        total_time = total,
        spline_segments = lo_motion::ComMotion::segment_count(&com),
        load_segments = ee_load.number_of_segments(),
        free_footholds = ee_motion.all_free_contacts().len(),
        "built providers"
    );

    Ok(CostConstraintFactory::new(
        &com,
        &ee_motion,
        &ee_load,
        &cop,
        params,
        Point2d::default(),
        Point2d::at_rest(goal),
    ))
}

fn cmd_evaluate(
    params_path: Option<&Path>,
    goal: Vector2<f64>,
    check_jacobians: bool,
    tol: f64,
) -> NlpResult<()> {
    let params = load_params(params_path)?;
    let factory = demo_factory(params, goal)?;
    let vars = factory.initial_variables()?;
    let mut stack = factory.build_stack()?;
    stack.update_variables(&vars)?;

    println!("Variables: {}", vars.total_count());
    for set in vars.sets() {
        println!("  {:<14} {}", set.id.name(), set.len());
    }

    println!("Constraints: {} rows", stack.number_of_constraints());
    for c in stack.constraints() {
        let g = c.evaluate_constraint();
        let norm = if g.is_empty() { 0.0 } else { g.amax() };
        println!("  {:<18} rows {:>4}  |g|max {:.3e}", c.name(), g.len(), norm);
    }

    let violations = stack.violations(tol);
    if violations.is_empty() {
        println!("✓ All constraints within bounds (tol {tol:.1e})");
    } else {
        println!("Bound violations:");
        for v in &violations {
            println!(
                "  {:<18} row {:>4}  value {:+.4e}  violation {:+.4e}",
                v.name, v.row, v.value, v.violation
            );
        }
    }

    println!("Cost: {:.6e}", stack.evaluate_cost());
    for c in stack.costs() {
        println!("  {:<18} {:.6e}", c.name(), c.evaluate_cost());
    }

    if check_jacobians {
        println!("Jacobian check (max abs error):");
        let mut constraints = Vec::new();
        for &name in &factory.params().constraints {
            if let Some(built) = factory.constraint(name)? {
                constraints.extend(built);
            }
        }
        for c in &mut constraints {
            for id in VarSetId::ALL {
                let err = check_constraint_jacobian(c.as_mut(), &vars, id, 1e-6)?;
                println!("  {:<18} {:<14} {:.3e}", c.name(), id.name(), err);
            }
        }
    }

    Ok(())
}
