//! Optimization-variable providers for legged trajectory optimization.
//!
//! Each provider owns one named block of the global optimization vector and
//! turns it into domain quantities:
//!
//! - [`ComSpline`]: piecewise-polynomial center-of-mass motion in the plane
//! - [`EndeffectorsMotion`]: contact schedule and free foothold positions
//! - [`EndeffectorLoad`]: per-segment load fractions of every end-effector
//! - [`CenterOfPressure`]: piecewise-constant center of pressure
//!
//! Providers are plain values. Constraints keep their own copies and push the
//! solver's current variables into them through [`VariableProvider`].

pub mod com_motion;
pub mod com_spline;
pub mod cop;
pub mod ee_load;
pub mod ee_motion;
pub mod error;
pub mod spline_equations;
pub mod variables;

pub use com_motion::{ComMotion, MotionDerivative};
pub use com_spline::{ComSpline, SPLINE_COEFF_COUNT};
pub use cop::CenterOfPressure;
pub use ee_load::{EndeffectorLoad, LoadValues};
pub use ee_motion::{Contact, EndeffectorsMotion};
pub use error::{MotionError, MotionResult};
pub use spline_equations::LinearSplineEquations;
pub use variables::{OptimizationVariables, VarSetId, VariableProvider, VariableSet};
