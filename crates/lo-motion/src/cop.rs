//! Piecewise-constant center of pressure.

use crate::error::MotionResult;
use crate::variables::{VarSetId, VariableProvider, check_len};
use lo_core::{Coord, K_DIM2D, ensure_positive, segment_count, segment_index};
use nalgebra::{DVector, RowDVector, Vector2};

/// One CoP per segment of length `dt`, stored as `[x0, y0, x1, y1, ...]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CenterOfPressure {
    dt: f64,
    n_segments: usize,
    coeffs: DVector<f64>,
}

impl CenterOfPressure {
    pub fn new(total_time: f64, dt: f64) -> MotionResult<Self> {
        ensure_positive(dt, "CoP segment duration")?;
        ensure_positive(total_time, "motion duration")?;
        let n_segments = segment_count(total_time, dt);
        Ok(Self {
            dt,
            n_segments,
            coeffs: DVector::zeros(n_segments * K_DIM2D),
        })
    }

    pub fn number_of_segments(&self) -> usize {
        self.n_segments
    }

    pub fn index(&self, k: usize, dim: Coord) -> usize {
        k * K_DIM2D + dim.index()
    }

    fn segment(&self, t: f64) -> usize {
        segment_index(t, self.dt, self.n_segments)
    }

    pub fn cop(&self, t: f64) -> Vector2<f64> {
        let k = self.segment(t);
        Vector2::new(
            self.coeffs[self.index(k, Coord::X)],
            self.coeffs[self.index(k, Coord::Y)],
        )
    }

    /// Derivative of coordinate `dim` of the CoP at `t` w.r.t. all
    /// coefficients.
    pub fn jacobian_wrt_cop(&self, t: f64, dim: Coord) -> RowDVector<f64> {
        let mut row = RowDVector::zeros(self.coeffs.len());
        row[self.index(self.segment(t), dim)] = 1.0;
        row
    }
}

impl VariableProvider for CenterOfPressure {
    fn id(&self) -> VarSetId {
        VarSetId::Cop
    }

    fn opt_var_count(&self) -> usize {
        self.coeffs.len()
    }

    fn optimization_parameters(&self) -> DVector<f64> {
        self.coeffs.clone()
    }

    fn set_optimization_parameters(&mut self, x: &DVector<f64>) -> MotionResult<()> {
        check_len(self.id(), x, self.coeffs.len())?;
        self.coeffs.copy_from(x);
        Ok(())
    }
}
