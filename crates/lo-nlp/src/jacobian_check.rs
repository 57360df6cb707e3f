//! Finite difference checks of analytic constraint Jacobians.

use crate::constraint::Constraint;
use crate::error::{NlpError, NlpResult};
use lo_motion::{OptimizationVariables, VarSetId};
use nalgebra::{DMatrix, DVector};

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> NlpResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> NlpResult<DVector<f64>>,
{
    let n = x.len();
    let m = f(x)?.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        jac.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    Ok(jac)
}

/// Largest absolute difference between the analytic block of `constraint`
/// w.r.t. `var_set` and a central difference around `vars`.
///
/// A `None` block is compared as all zeros. The constraint is left updated
/// with `vars`.
pub fn check_constraint_jacobian(
    constraint: &mut dyn Constraint,
    vars: &OptimizationVariables,
    var_set: VarSetId,
    epsilon: f64,
) -> NlpResult<f64> {
    constraint.update_variables(vars)?;
    let analytic = constraint
        .jacobian_wrt(var_set)
        .map(|j| DMatrix::from(&j))
        .unwrap_or_else(|| {
            DMatrix::zeros(
                constraint.number_of_constraints(),
                vars.variables(var_set).map(|x| x.len()).unwrap_or(0),
            )
        });

    let x0 = vars.variables(var_set)?.clone();
    let mut perturbed = vars.clone();
    let numeric = central_difference_jacobian(
        &x0,
        |x| {
            perturbed.set_variables(var_set, x.clone())?;
            constraint.update_variables(&perturbed)?;
            Ok(constraint.evaluate_constraint())
        },
        epsilon,
    )?;
    constraint.update_variables(vars)?;

    if analytic.shape() != numeric.shape() {
        return Err(NlpError::InvalidParameter {
            what: format!(
                "{}: analytic block is {:?}, numeric is {:?}",
                constraint.name(),
                analytic.shape(),
                numeric.shape()
            ),
        });
    }
    Ok((analytic - numeric).amax())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_quadratic() {
        // f(x) = [x0^2, x0*x1], J = [[2*x0, 0], [x1, x0]]
        let x = DVector::from_vec(vec![2.0, 3.0]);
        let f = |x: &DVector<f64>| Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]));

        let jac = central_difference_jacobian(&x, f, 1e-6).unwrap();
        let expected = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 3.0, 2.0]);
        assert!((jac - expected).amax() < 1e-6);
    }

    #[test]
    fn errors_propagate() {
        let x = DVector::from_vec(vec![1.0]);
        let f = |_: &DVector<f64>| -> NlpResult<DVector<f64>> {
            Err(NlpError::InvalidParameter {
                what: "boom".to_string(),
            })
        };
        assert!(central_difference_jacobian(&x, f, 1e-6).is_err());
    }
}
