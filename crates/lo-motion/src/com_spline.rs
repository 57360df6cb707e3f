//! Piecewise quintic CoM spline.
//!
//! Each segment and each horizontal dimension holds the six coefficients of
//! `c0 + c1*t + ... + c5*t^5` in local segment time. Coefficients are laid out
//! segment-major, then dimension, then power.

use crate::com_motion::{ComMotion, MotionDerivative};
use crate::error::{MotionError, MotionResult};
use crate::variables::{VarSetId, VariableProvider, check_len};
use lo_core::{Coord, GRID_EPS, K_DIM2D, Point3d, Pose, cache_exponents, ensure_positive};
use nalgebra::{DVector, RowDVector, Vector2, Vector3};

/// Polynomial coefficients per segment and dimension.
pub const SPLINE_COEFF_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct ComSpline {
    durations: Vec<f64>,
    coeffs: DVector<f64>,
    height: f64,
}

impl ComSpline {
    /// Spline with all coefficients zero.
    pub fn new(durations: Vec<f64>, height: f64) -> MotionResult<Self> {
        if durations.is_empty() {
            return Err(MotionError::InvalidSchedule {
                what: "CoM spline needs at least one segment".to_string(),
            });
        }
        for &d in &durations {
            ensure_positive(d, "spline segment duration")?;
        }
        let n = durations.len() * K_DIM2D * SPLINE_COEFF_COUNT;
        Ok(Self {
            durations,
            coeffs: DVector::zeros(n),
            height,
        })
    }

    /// Split `total` into segments of length `dt_segment`, the last one
    /// absorbing the remainder.
    pub fn uniform(total: f64, dt_segment: f64, height: f64) -> MotionResult<Self> {
        ensure_positive(total, "motion duration")?;
        ensure_positive(dt_segment, "spline segment duration")?;
        let n = lo_core::segment_count(total, dt_segment);
        let mut durations = vec![dt_segment; n];
        durations[n - 1] = total - dt_segment * (n - 1) as f64;
        Self::new(durations, height)
    }

    /// Keep the CoM at `p`: constant term set, everything else zero.
    pub fn hold_position(&mut self, p: Vector2<f64>) {
        self.coeffs.fill(0.0);
        for seg in 0..self.durations.len() {
            for dim in Coord::XY {
                self.coeffs[Self::index(seg, dim, 0)] = p[dim.index()];
            }
        }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn index(segment: usize, dim: Coord, power: usize) -> usize {
        (segment * K_DIM2D + dim.index()) * SPLINE_COEFF_COUNT + power
    }

    /// Segment containing global time `t` and the local time within it.
    /// Times past the end map to the end of the last segment.
    fn locate(&self, t: f64) -> (usize, f64) {
        let mut t_start = 0.0;
        let last = self.durations.len() - 1;
        for (seg, &d) in self.durations.iter().enumerate() {
            if t < t_start + d - GRID_EPS || seg == last {
                return (seg, (t - t_start).clamp(0.0, d));
            }
            t_start += d;
        }
        (last, self.durations[last])
    }

    /// `deriv`-th derivative of `t^power`, without the coefficient.
    fn basis(power: usize, order: usize, exps: &[f64; SPLINE_COEFF_COUNT]) -> f64 {
        if power < order {
            return 0.0;
        }
        let factor: usize = ((power - order + 1)..=power).product();
        factor as f64 * exps[power - order]
    }

    fn value_in_segment(&self, segment: usize, t_local: f64, deriv: MotionDerivative, dim: Coord) -> f64 {
        let exps = cache_exponents::<SPLINE_COEFF_COUNT>(t_local);
        (0..SPLINE_COEFF_COUNT)
            .map(|k| {
                self.coeffs[Self::index(segment, dim, k)] * Self::basis(k, deriv.order(), &exps)
            })
            .sum()
    }

    /// Value of derivative `deriv` of `dim` at global time `t`.
    pub fn value(&self, t: f64, deriv: MotionDerivative, dim: Coord) -> f64 {
        let (seg, tau) = self.locate(t);
        self.value_in_segment(seg, tau, deriv, dim)
    }
}

impl VariableProvider for ComSpline {
    fn id(&self) -> VarSetId {
        VarSetId::SplineCoeff
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

impl ComMotion for ComSpline {
    fn total_time(&self) -> f64 {
        self.durations.iter().sum()
    }

    fn base(&self, t: f64) -> Pose {
        let (seg, tau) = self.locate(t);
        let at = |deriv| {
            Vector2::new(
                self.value_in_segment(seg, tau, deriv, Coord::X),
                self.value_in_segment(seg, tau, deriv, Coord::Y),
            )
        };
        let p = at(MotionDerivative::Pos);
        let v = at(MotionDerivative::Vel);
        let a = at(MotionDerivative::Acc);
        Pose {
            pos: Point3d::new(
                Vector3::new(p.x, p.y, self.height),
                Vector3::new(v.x, v.y, 0.0),
                Vector3::new(a.x, a.y, 0.0),
            ),
            ..Pose::default()
        }
    }

    fn jacobian(&self, t: f64, deriv: MotionDerivative, dim: Coord) -> RowDVector<f64> {
        let (seg, tau) = self.locate(t);
        self.jacobian_in_segment(seg, tau, deriv, dim)
    }

    fn segment_count(&self) -> usize {
        self.durations.len()
    }

    fn segment_duration(&self, segment: usize) -> f64 {
        self.durations[segment]
    }

    fn jacobian_in_segment(
        &self,
        segment: usize,
        t_local: f64,
        deriv: MotionDerivative,
        dim: Coord,
    ) -> RowDVector<f64> {
        let mut row = RowDVector::zeros(self.coeffs.len());
        let exps = cache_exponents::<SPLINE_COEFF_COUNT>(t_local);
        for k in 0..SPLINE_COEFF_COUNT {
            row[Self::index(segment, dim, k)] = Self::basis(k, deriv.order(), &exps);
        }
        row
    }

    fn clone_box(&self) -> Box<dyn ComMotion> {
        Box::new(self.clone())
    }
}
