//! lo-core: shared foundation for the locomotion NLP engine.
//!
//! Contains:
//! - error (shared error type)
//! - numeric (Real, constants, argument checks)
//! - ids (end-effector and contact identifiers)
//! - geometry (points, orientations, poses, lines)
//! - linear (VecScalar / MatVec linear equation containers)
//! - bound (constraint bound intervals)
//! - grid (time discretization of a motion)

pub mod bound;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod ids;
pub mod linear;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use bound::{Bound, VecBound};
pub use error::{CoreError, CoreResult};
pub use geometry::*;
pub use grid::{sample_count, sample_times, segment_count, segment_index};
pub use ids::{ContactId, EndeffectorId};
pub use linear::{MatVec, VecScalar};
pub use numeric::*;
