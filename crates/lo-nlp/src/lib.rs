//! Constraint and cost terms of a legged trajectory optimization problem.
//!
//! Every term reads the solver's variables through its own copies of the
//! providers from `lo-motion` and produces residuals, bounds and one sparse
//! Jacobian block per variable set. The [`CostConstraintFactory`] wires the
//! terms from [`MotionParameters`]; a [`ConstraintStack`] concatenates them
//! into the global vectors and matrices a generic NLP solver consumes.
//!
//! Per solver iteration the caller must update every term with the current
//! variables before reading residuals, bounds or Jacobians.

pub mod constraint;
pub mod contact_load;
pub mod convexity;
pub mod dynamic;
pub mod error;
pub mod factory;
pub mod jacobian_check;
pub mod params;
pub mod polygon_center;
pub mod quadratic_cost;
pub mod range_of_motion;
pub mod soft_constraint;
pub mod spline_equality;
pub mod stack;
pub mod support_area;

pub use constraint::{Constraint, Cost, Jacobian, JacobianBuilder};
pub use contact_load::ContactLoadConstraint;
pub use convexity::ConvexityConstraint;
pub use dynamic::DynamicConstraint;
pub use error::{NlpError, NlpResult};
pub use factory::{ConstraintPtrVec, CostConstraintFactory};
pub use jacobian_check::{central_difference_jacobian, check_constraint_jacobian};
pub use params::{ConstraintName, CostName, CostWeight, MotionParameters};
pub use polygon_center::PolygonCenterConstraint;
pub use quadratic_cost::QuadraticSplineCost;
pub use range_of_motion::RangeOfMotionBox;
pub use soft_constraint::SoftConstraint;
pub use spline_equality::LinearSplineEqualityConstraint;
pub use stack::{ConstraintStack, ConstraintViolation};
pub use support_area::SupportAreaConstraint;
