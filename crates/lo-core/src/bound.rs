//! Interval bounds on constraint values.

use core::ops::{AddAssign, SubAssign};

/// Interval `[lower, upper]`. Equality constraints use `lower == upper`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
}

pub type VecBound = Vec<Bound>;

impl Default for Bound {
    fn default() -> Self {
        Self::EQUALITY_ZERO
    }
}

impl Bound {
    pub const EQUALITY_ZERO: Bound = Bound {
        lower: 0.0,
        upper: 0.0,
    };

    pub const UNBOUNDED: Bound = Bound {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn equality(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    pub fn is_equality(&self) -> bool {
        self.lower == self.upper
    }

    pub fn contains(&self, value: f64, tol: f64) -> bool {
        value >= self.lower - tol && value <= self.upper + tol
    }

    /// Signed distance of `value` outside the interval, zero inside.
    pub fn violation(&self, value: f64) -> f64 {
        if value > self.upper {
            value - self.upper
        } else if value < self.lower {
            value - self.lower
        } else {
            0.0
        }
    }
}

impl AddAssign<f64> for Bound {
    fn add_assign(&mut self, rhs: f64) {
        self.lower += rhs;
        self.upper += rhs;
    }
}

impl SubAssign<f64> for Bound {
    fn sub_assign(&mut self, rhs: f64) {
        self.lower -= rhs;
        self.upper -= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_both_ends() {
        let mut b = Bound::new(-0.1, 0.1);
        b += 0.3;
        assert!((b.lower - 0.2).abs() < 1e-12);
        assert!((b.upper - 0.4).abs() < 1e-12);
        b -= 1.0;
        assert!((b.lower + 0.8).abs() < 1e-12);
    }

    #[test]
    fn violation_is_signed_and_zero_inside() {
        let b = Bound::new(0.0, 1.0);
        assert_eq!(b.violation(0.5), 0.0);
        assert_eq!(b.violation(1.5), 0.5);
        assert_eq!(b.violation(-0.25), -0.25);
        assert_eq!(Bound::UNBOUNDED.violation(1e9), 0.0);
    }

    #[test]
    fn equality_bound() {
        assert!(Bound::equality(1.0).is_equality());
        assert!(!Bound::new(0.0, 1.0).is_equality());
        assert!(Bound::default().contains(1e-10, 1e-9));
    }
}
