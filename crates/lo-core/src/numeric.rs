use crate::{CoreError, CoreResult};

/// Floating point type used throughout the engine
pub type Real = f64;

/// Standard gravity (m/s^2) used by the cart-table model.
pub const GRAVITY: Real = 9.80665;

/// Slack applied when dividing a horizon into grid intervals so that
/// T=0.3, dt=0.1 yields 3 intervals and not 2.
pub const GRID_EPS: Real = 1e-9;

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}
