//! Center-of-mass motion interface.

use crate::variables::VariableProvider;
use core::fmt;
use lo_core::{Coord, Pose};
use nalgebra::RowDVector;
use serde::{Deserialize, Serialize};

/// Order of a time derivative of the CoM position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionDerivative {
    Pos,
    Vel,
    Acc,
    Jerk,
}

impl MotionDerivative {
    pub fn order(self) -> usize {
        match self {
            MotionDerivative::Pos => 0,
            MotionDerivative::Vel => 1,
            MotionDerivative::Acc => 2,
            MotionDerivative::Jerk => 3,
        }
    }
}

/// Planar CoM motion parametrized by a block of optimization variables.
///
/// Every query that returns a Jacobian row assumes the motion is linear in
/// its coefficients: the row only depends on time, not on the current
/// coefficient values.
pub trait ComMotion: VariableProvider + fmt::Debug + Send + Sync {
    /// Duration of the whole motion.
    fn total_time(&self) -> f64;

    /// CoM state at time `t`. The height is constant.
    fn base(&self, t: f64) -> Pose;

    /// Derivative `deriv` of coordinate `dim` at `t` w.r.t. all coefficients.
    fn jacobian(&self, t: f64, deriv: MotionDerivative, dim: Coord) -> RowDVector<f64>;

    fn segment_count(&self) -> usize;

    fn segment_duration(&self, segment: usize) -> f64;

    /// Like [`ComMotion::jacobian`], but at local time `t_local` of one
    /// polynomial segment. Used to express junction conditions where the
    /// global time is ambiguous.
    fn jacobian_in_segment(
        &self,
        segment: usize,
        t_local: f64,
        deriv: MotionDerivative,
        dim: Coord,
    ) -> RowDVector<f64>;

    fn clone_box(&self) -> Box<dyn ComMotion>;
}

impl Clone for Box<dyn ComMotion> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
