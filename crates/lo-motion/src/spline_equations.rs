//! Linear equations and quadratic forms over the CoM spline coefficients.

use crate::com_motion::{ComMotion, MotionDerivative};
use lo_core::{Coord, MatVec, Point2d, VecScalar};
use nalgebra::{DMatrix, Vector2};

/// Five-point Gauss-Legendre rule on [-1, 1], exact up to degree 9.
const GAUSS_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

/// Boundary, continuity and smoothness terms of a CoM motion.
pub struct LinearSplineEquations<'a> {
    com: &'a dyn ComMotion,
}

fn component(state: &Point2d, deriv: MotionDerivative) -> Vector2<f64> {
    match deriv {
        MotionDerivative::Pos => state.p,
        MotionDerivative::Vel => state.v,
        MotionDerivative::Acc => state.a,
        MotionDerivative::Jerk => Vector2::zeros(),
    }
}

impl<'a> LinearSplineEquations<'a> {
    pub fn new(com: &'a dyn ComMotion) -> Self {
        Self { com }
    }

    fn state_equations(
        &self,
        segment: usize,
        t_local: f64,
        state: &Point2d,
        derivs: &[MotionDerivative],
    ) -> MatVec {
        let n = self.com.opt_var_count();
        let mut mv = MatVec::zeros(derivs.len() * Coord::XY.len(), n);
        let mut row = 0;
        for &deriv in derivs {
            let target = component(state, deriv);
            for dim in Coord::XY {
                let jac = self.com.jacobian_in_segment(segment, t_local, deriv, dim);
                mv.add_vec_scalar(&VecScalar::new(jac, target[dim.index()]), row);
                row += 1;
            }
        }
        mv
    }

    /// Position, velocity and acceleration at t=0 equal `state`.
    pub fn make_initial(&self, state: &Point2d) -> MatVec {
        self.state_equations(
            0,
            0.0,
            state,
            &[MotionDerivative::Pos, MotionDerivative::Vel, MotionDerivative::Acc],
        )
    }

    /// The chosen derivatives at the end of the motion equal `state`.
    pub fn make_final(&self, state: &Point2d, derivs: &[MotionDerivative]) -> MatVec {
        let last = self.com.segment_count() - 1;
        let t_end = self.com.segment_duration(last);
        self.state_equations(last, t_end, state, derivs)
    }

    /// Position, velocity and acceleration are continuous across every
    /// segment boundary.
    pub fn make_junction(&self) -> MatVec {
        let n = self.com.opt_var_count();
        let derivs = [MotionDerivative::Pos, MotionDerivative::Vel, MotionDerivative::Acc];
        let junctions = self.com.segment_count().saturating_sub(1);
        let mut mv = MatVec::zeros(junctions * derivs.len() * Coord::XY.len(), n);

        let mut row = 0;
        for seg in 0..junctions {
            let t_end = self.com.segment_duration(seg);
            for deriv in derivs {
                for dim in Coord::XY {
                    let jac = self.com.jacobian_in_segment(seg, t_end, deriv, dim)
                        - self.com.jacobian_in_segment(seg + 1, 0.0, deriv, dim);
                    mv.add_vec_scalar(&VecScalar::new(jac, 0.0), row);
                    row += 1;
                }
            }
        }
        mv
    }

    /// `M` such that `x^T M x` is the weighted integral of the squared
    /// acceleration over the motion.
    pub fn make_acceleration(&self, weight_xy: [f64; 2]) -> DMatrix<f64> {
        self.make_cost_matrix(MotionDerivative::Acc, weight_xy)
    }

    /// Same as [`Self::make_acceleration`] for the jerk.
    pub fn make_jerk(&self, weight_xy: [f64; 2]) -> DMatrix<f64> {
        self.make_cost_matrix(MotionDerivative::Jerk, weight_xy)
    }

    fn make_cost_matrix(&self, deriv: MotionDerivative, weight_xy: [f64; 2]) -> DMatrix<f64> {
        let n = self.com.opt_var_count();
        let mut m = DMatrix::zeros(n, n);
        for seg in 0..self.com.segment_count() {
            let half = 0.5 * self.com.segment_duration(seg);
            for (node, w) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS) {
                let t_local = half * (node + 1.0);
                for dim in Coord::XY {
                    let jac = self.com.jacobian_in_segment(seg, t_local, deriv, dim);
                    m += (weight_xy[dim.index()] * w * half) * jac.transpose() * &jac;
                }
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::com_spline::ComSpline;
    use crate::variables::VariableProvider;
    use nalgebra::DVector;

    #[test]
    fn initial_equations_hold_for_matching_spline() {
        let mut s = ComSpline::new(vec![0.5, 0.5], 0.5).unwrap();
        let mut x = DVector::zeros(s.opt_var_count());
        x[ComSpline::index(0, Coord::X, 0)] = 0.3;
        x[ComSpline::index(0, Coord::Y, 1)] = -0.2;
        x[ComSpline::index(0, Coord::X, 2)] = 0.5; // acc = 1.0
        s.set_optimization_parameters(&x).unwrap();

        let state = Point2d::new(
            Vector2::new(0.3, 0.0),
            Vector2::new(0.0, -0.2),
            Vector2::new(1.0, 0.0),
        );
        let mv = LinearSplineEquations::new(&s).make_initial(&state);
        assert_eq!(mv.rows(), 6);
        let residual = &mv.m * &x - &mv.v;
        assert!(residual.norm() < 1e-12);
    }

    #[test]
    fn junction_holds_for_constant_spline_and_breaks_on_jump() {
        let mut s = ComSpline::new(vec![0.4, 0.3, 0.3], 0.5).unwrap();
        s.hold_position(Vector2::new(1.0, 2.0));
        let eq = LinearSplineEquations::new(&s);
        let mv = eq.make_junction();
        assert_eq!(mv.rows(), 2 * 3 * 2);
        let mut x = s.optimization_parameters();
        assert!((&mv.m * &x).norm() < 1e-12);

        x[ComSpline::index(1, Coord::X, 0)] += 0.1;
        assert!((&mv.m * &x).norm() > 0.05);
    }

    #[test]
    fn final_equations_use_segment_end() {
        let mut s = ComSpline::new(vec![0.5, 0.5], 0.5).unwrap();
        let mut x = DVector::zeros(s.opt_var_count());
        x[ComSpline::index(1, Coord::X, 1)] = 2.0; // x = 2 t_local
        s.set_optimization_parameters(&x).unwrap();
        let mv = LinearSplineEquations::new(&s)
            .make_final(&Point2d::at_rest(Vector2::new(1.0, 0.0)), &[MotionDerivative::Pos]);
        assert_eq!(mv.rows(), 2);
        let residual = &mv.m * &x - &mv.v;
        assert!(residual.norm() < 1e-12);
    }

    #[test]
    fn acceleration_cost_integrates_exactly() {
        // x(t) = t^2 on one segment of length 2: acc = 2, integral of 4 = 8
        let mut s = ComSpline::new(vec![2.0], 0.5).unwrap();
        let mut x = DVector::zeros(s.opt_var_count());
        x[ComSpline::index(0, Coord::X, 2)] = 1.0;
        s.set_optimization_parameters(&x).unwrap();

        let m = LinearSplineEquations::new(&s).make_acceleration([1.0, 3.0]);
        let cost = (x.transpose() * &m * &x)[0];
        assert!((cost - 8.0).abs() < 1e-9);

        // y(t) = t^3: jerk = 6, integral of 36 over 2s = 72, weighted by 3
        let mut y = DVector::zeros(s.opt_var_count());
        y[ComSpline::index(0, Coord::Y, 3)] = 1.0;
        let m = LinearSplineEquations::new(&s).make_jerk([1.0, 3.0]);
        assert!(((y.transpose() * &m * &y)[0] - 216.0).abs() < 1e-9);
    }
}
