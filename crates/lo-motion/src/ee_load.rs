//! Load distribution between end-effectors.
//!
//! The motion is cut into segments of length `dt`. Each segment holds one
//! load fraction per end-effector, whether it is in contact or not; other
//! constraints force the loads of swinging legs to zero and the loads of
//! each segment to sum to one.

use crate::error::MotionResult;
use crate::ee_motion::EndeffectorsMotion;
use crate::variables::{VarSetId, VariableProvider, check_len};
use lo_core::{EndeffectorId, ensure_positive, segment_count, segment_index};
use nalgebra::DVector;

/// Load fractions of all end-effectors in one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadValues {
    values: Vec<f64>,
}

impl LoadValues {
    pub fn at(&self, ee: EndeffectorId) -> f64 {
        self.values[ee.index()]
    }

    /// End-effectors in index order.
    pub fn endeffectors_ordered(&self) -> impl Iterator<Item = EndeffectorId> + '_ {
        (0..self.values.len()).map(EndeffectorId::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EndeffectorLoad {
    n_ee: usize,
    dt: f64,
    n_segments: usize,
    lambdas: DVector<f64>,
}

impl EndeffectorLoad {
    /// One load segment every `dt` over the duration of `ee_motion`.
    pub fn new(ee_motion: &EndeffectorsMotion, dt: f64) -> MotionResult<Self> {
        ensure_positive(dt, "load segment duration")?;
        let n_ee = ee_motion.endeffector_count();
        let n_segments = segment_count(ee_motion.total_time(), dt);
        Ok(Self {
            n_ee,
            dt,
            n_segments,
            lambdas: DVector::zeros(n_ee * n_segments),
        })
    }

    pub fn number_of_segments(&self) -> usize {
        self.n_segments
    }

    pub fn endeffector_count(&self) -> usize {
        self.n_ee
    }

    /// Start time of segment `k`.
    pub fn segment_start(&self, k: usize) -> f64 {
        k as f64 * self.dt
    }

    pub fn segment(&self, t: f64) -> usize {
        segment_index(t, self.dt, self.n_segments)
    }

    /// Column of the load of `ee` in segment `k`.
    pub fn index_discrete(&self, k: usize, ee: EndeffectorId) -> usize {
        assert!(k < self.n_segments && ee.index() < self.n_ee);
        k * self.n_ee + ee.index()
    }

    /// Column of the load of `ee` at time `t`.
    pub fn index(&self, t: f64, ee: EndeffectorId) -> usize {
        self.index_discrete(self.segment(t), ee)
    }

    pub fn load_values_idx(&self, k: usize) -> LoadValues {
        let start = k * self.n_ee;
        LoadValues {
            values: self.lambdas.as_slice()[start..start + self.n_ee].to_vec(),
        }
    }

    pub fn load_values(&self, t: f64) -> LoadValues {
        self.load_values_idx(self.segment(t))
    }
}

impl VariableProvider for EndeffectorLoad {
    fn id(&self) -> VarSetId {
        VarSetId::Convexity
    }

    fn opt_var_count(&self) -> usize {
        self.lambdas.len()
    }

    fn optimization_parameters(&self) -> DVector<f64> {
        self.lambdas.clone()
    }

    fn set_optimization_parameters(&mut self, x: &DVector<f64>) -> MotionResult<()> {
        check_len(self.id(), x, self.lambdas.len())?;
        self.lambdas.copy_from(x);
        Ok(())
    }
}
