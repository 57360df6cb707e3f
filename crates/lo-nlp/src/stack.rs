//! Concatenation of many terms into the global NLP vectors and matrices.

use crate::constraint::{Constraint, Cost, Jacobian, JacobianBuilder};
use crate::error::NlpResult;
use lo_core::VecBound;
use lo_motion::OptimizationVariables;
use nalgebra::DVector;

/// Largest bound violation of one constraint term.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintViolation {
    pub name: String,
    /// Row within the term.
    pub row: usize,
    pub value: f64,
    /// Signed distance outside the bound.
    pub violation: f64,
}

/// Constraints stacked row-wise in insertion order, costs summed.
///
/// Columns of [`ConstraintStack::jacobian`] follow the variable set order
/// of the [`OptimizationVariables`] passed in.
#[derive(Default)]
pub struct ConstraintStack {
    constraints: Vec<Box<dyn Constraint>>,
    costs: Vec<Box<dyn Cost>>,
}

impl ConstraintStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    pub fn add_constraints(&mut self, constraints: impl IntoIterator<Item = Box<dyn Constraint>>) {
        self.constraints.extend(constraints);
    }

    pub fn add_cost(&mut self, cost: Box<dyn Cost>) {
        self.costs.push(cost);
    }

    pub fn constraints(&self) -> &[Box<dyn Constraint>] {
        &self.constraints
    }

    pub fn costs(&self) -> &[Box<dyn Cost>] {
        &self.costs
    }

    pub fn number_of_constraints(&self) -> usize {
        self.constraints
            .iter()
            .map(|c| c.number_of_constraints())
            .sum()
    }

    pub fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
        for c in &mut self.constraints {
            c.update_variables(vars)?;
        }
        for c in &mut self.costs {
            c.update_variables(vars)?;
        }
        Ok(())
    }

    pub fn evaluate_constraints(&self) -> DVector<f64> {
        let parts: Vec<_> = self
            .constraints
            .iter()
            .map(|c| c.evaluate_constraint())
            .collect();
        let n = parts.iter().map(|g| g.len()).sum();
        DVector::from_iterator(n, parts.iter().flat_map(|g| g.iter().copied()))
    }

    pub fn bounds(&self) -> VecBound {
        self.constraints.iter().flat_map(|c| c.bounds()).collect()
    }

    /// Global constraint Jacobian, one column per entry of `vars`.
    ///
    /// # Panics
    ///
    /// Panics if a term returns a block whose shape does not match its row
    /// count and the variable set length.
    pub fn jacobian(&self, vars: &OptimizationVariables) -> Jacobian {
        let mut jac = JacobianBuilder::new(self.number_of_constraints(), vars.total_count());
        let mut row_offset = 0;
        for c in &self.constraints {
            let rows = c.number_of_constraints();
            for set in vars.sets() {
                let Some(block) = c.jacobian_wrt(set.id) else {
                    continue;
                };
                let cols = vars.column_range(set.id).unwrap_or(0..0);
                assert!(
                    block.nrows() == rows && block.ncols() == cols.len(),
                    "{}: block w.r.t. {} is {}x{}, expected {}x{}",
                    c.name(),
                    set.id,
                    block.nrows(),
                    block.ncols(),
                    rows,
                    cols.len()
                );
                for (i, j, &v) in block.triplet_iter() {
                    jac.insert(row_offset + i, cols.start + j, v);
                }
            }
            row_offset += rows;
        }
        jac.build()
    }

    pub fn evaluate_cost(&self) -> f64 {
        self.costs.iter().map(|c| c.evaluate_cost()).sum()
    }

    /// Gradient of the summed cost w.r.t. the global vector.
    pub fn cost_gradient(&self, vars: &OptimizationVariables) -> DVector<f64> {
        let mut grad = DVector::zeros(vars.total_count());
        for set in vars.sets() {
            let Some(cols) = vars.column_range(set.id) else {
                continue;
            };
            for c in &self.costs {
                if let Some(g) = c.gradient_wrt(set.id) {
                    assert_eq!(g.len(), cols.len(), "{}: gradient length", c.name());
                    for (k, gk) in g.iter().enumerate() {
                        grad[cols.start + k] += gk;
                    }
                }
            }
        }
        grad
    }

    /// Worst row of every term whose residual leaves its bounds by more
    /// than `tol`.
    pub fn violations(&self, tol: f64) -> Vec<ConstraintViolation> {
        let mut out = Vec::new();
        for c in &self.constraints {
            let g = c.evaluate_constraint();
            let worst = g
                .iter()
                .zip(c.bounds())
                .enumerate()
                .map(|(row, (&value, b))| (row, value, b.violation(value)))
                .max_by(|a, b| a.2.abs().total_cmp(&b.2.abs()));
            if let Some((row, value, violation)) = worst {
                if violation.abs() > tol {
                    out.push(ConstraintViolation {
                        name: c.name().to_string(),
                        row,
                        value,
                        violation,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NlpResult;
    use lo_core::Bound;
    use lo_motion::{VarSetId, VariableSet};

    /// g = [x0 + y0, 2 y1] over two small sets.
    struct Toy {
        x: DVector<f64>,
        y: DVector<f64>,
    }

    impl Constraint for Toy {
        fn name(&self) -> &str {
            "toy"
        }

        fn update_variables(&mut self, vars: &OptimizationVariables) -> NlpResult<()> {
            self.x = vars.variables(VarSetId::SplineCoeff)?.clone();
            self.y = vars.variables(VarSetId::Cop)?.clone();
            Ok(())
        }

        fn evaluate_constraint(&self) -> DVector<f64> {
            DVector::from_vec(vec![self.x[0] + self.y[0], 2.0 * self.y[1]])
        }

        fn bounds(&self) -> VecBound {
            vec![Bound::equality(1.0), Bound::new(0.0, 1.0)]
        }

        fn jacobian_wrt(&self, var_set: VarSetId) -> Option<Jacobian> {
            let mut jac = match var_set {
                VarSetId::SplineCoeff => JacobianBuilder::new(2, 1),
                VarSetId::Cop => JacobianBuilder::new(2, 2),
                _ => return None,
            };
            if var_set == VarSetId::SplineCoeff {
                jac.insert(0, 0, 1.0);
            } else {
                jac.insert(0, 0, 1.0);
                jac.insert(1, 1, 2.0);
            }
            Some(jac.build())
        }

        fn number_of_constraints(&self) -> usize {
            2
        }
    }

    fn vars() -> OptimizationVariables {
        let mut vars = OptimizationVariables::new();
        vars.add_set(VariableSet::new(DVector::from_vec(vec![0.25]), VarSetId::SplineCoeff))
            .unwrap();
        vars.add_set(VariableSet::new(DVector::from_vec(vec![0.5, 1.5]), VarSetId::Cop))
            .unwrap();
        vars
    }

    fn stack() -> ConstraintStack {
        let mut stack = ConstraintStack::new();
        for _ in 0..2 {
            stack.add_constraint(Box::new(Toy {
                x: DVector::zeros(1),
                y: DVector::zeros(2),
            }));
        }
        stack
    }

    #[test]
    fn concatenates_rows() {
        let mut stack = stack();
        let vars = vars();
        stack.update_variables(&vars).unwrap();
        let g = stack.evaluate_constraints();
        assert_eq!(g.as_slice(), &[0.75, 3.0, 0.75, 3.0]);
        assert_eq!(stack.bounds().len(), 4);
    }

    #[test]
    fn jacobian_uses_column_offsets() {
        let mut stack = stack();
        let vars = vars();
        stack.update_variables(&vars).unwrap();
        let jac = nalgebra::DMatrix::from(&stack.jacobian(&vars));
        assert_eq!(jac.shape(), (4, 3));
        assert_eq!(jac[(2, 0)], 1.0);
        assert_eq!(jac[(2, 1)], 1.0);
        assert_eq!(jac[(3, 2)], 2.0);
        assert_eq!(jac[(3, 0)], 0.0);
    }

    #[test]
    fn reports_worst_violation() {
        let mut stack = stack();
        let vars = vars();
        stack.update_variables(&vars).unwrap();
        let v = stack.violations(1e-9);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].row, 1);
        assert!((v[0].violation - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_set_is_an_error() {
        let mut stack = stack();
        let mut vars = OptimizationVariables::new();
        vars.add_set(VariableSet::new(DVector::zeros(1), VarSetId::SplineCoeff))
            .unwrap();
        assert!(stack.update_variables(&vars).is_err());
    }
}
