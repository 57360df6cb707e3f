//! Named optimization-variable sets and the global variable vector.

use crate::error::{MotionError, MotionResult};
use core::fmt;
use core::ops::Range;
use lo_core::{Bound, VecBound};
use nalgebra::DVector;

/// Identifier of a variable set in the global optimization vector.
///
/// The set of providers is closed, so Jacobian requests are dispatched on this
/// enum instead of on names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarSetId {
    /// Polynomial coefficients of the CoM spline.
    SplineCoeff,
    /// x/y position of every free foothold.
    Footholds,
    /// Load fraction of every end-effector per load segment.
    Convexity,
    /// Center of pressure per load segment.
    Cop,
}

impl VarSetId {
    pub const ALL: [VarSetId; 4] = [
        VarSetId::SplineCoeff,
        VarSetId::Footholds,
        VarSetId::Convexity,
        VarSetId::Cop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VarSetId::SplineCoeff => "spline_coeff",
            VarSetId::Footholds => "footholds",
            VarSetId::Convexity => "convexity",
            VarSetId::Cop => "cop",
        }
    }
}

impl fmt::Display for VarSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owner of one block of the global optimization vector.
pub trait VariableProvider {
    fn id(&self) -> VarSetId;

    /// Number of coefficients this provider owns.
    fn opt_var_count(&self) -> usize;

    fn optimization_parameters(&self) -> DVector<f64>;

    /// Overwrite the provider state from its block of the global vector.
    fn set_optimization_parameters(&mut self, x: &DVector<f64>) -> MotionResult<()>;

    /// Pull this provider's block out of `vars` and apply it.
    fn update_from(&mut self, vars: &OptimizationVariables) -> MotionResult<()> {
        let x = vars.variables(self.id())?;
        self.set_optimization_parameters(x)
    }
}

/// Check a parameter vector against the expected provider size.
pub(crate) fn check_len(id: VarSetId, x: &DVector<f64>, expected: usize) -> MotionResult<()> {
    if x.len() != expected {
        return Err(MotionError::DimensionMismatch {
            what: format!("variable set '{id}'"),
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

/// Values and per-coefficient bounds of one named variable set.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSet {
    pub id: VarSetId,
    pub values: DVector<f64>,
    pub bounds: VecBound,
}

impl VariableSet {
    /// Unbounded variable set.
    pub fn new(values: DVector<f64>, id: VarSetId) -> Self {
        Self::with_bound(values, id, Bound::UNBOUNDED)
    }

    /// Variable set with the same bound on every coefficient.
    pub fn with_bound(values: DVector<f64>, id: VarSetId, bound: Bound) -> Self {
        let bounds = vec![bound; values.len()];
        Self { id, values, bounds }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The global optimization vector, organized as an ordered list of named
/// variable sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptimizationVariables {
    sets: Vec<VariableSet>,
}

impl OptimizationVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable set. Column ranges follow insertion order.
    pub fn add_set(&mut self, set: VariableSet) -> MotionResult<()> {
        if self.sets.iter().any(|s| s.id == set.id) {
            return Err(MotionError::DuplicateVariableSet { id: set.id });
        }
        self.sets.push(set);
        Ok(())
    }

    pub fn sets(&self) -> &[VariableSet] {
        &self.sets
    }

    pub fn contains(&self, id: VarSetId) -> bool {
        self.sets.iter().any(|s| s.id == id)
    }

    fn set(&self, id: VarSetId) -> MotionResult<&VariableSet> {
        self.sets
            .iter()
            .find(|s| s.id == id)
            .ok_or(MotionError::UnknownVariableSet { id })
    }

    pub fn variables(&self, id: VarSetId) -> MotionResult<&DVector<f64>> {
        Ok(&self.set(id)?.values)
    }

    /// Replace the values of one set, keeping its size.
    pub fn set_variables(&mut self, id: VarSetId, values: DVector<f64>) -> MotionResult<()> {
        let set = self
            .sets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(MotionError::UnknownVariableSet { id })?;
        check_len(id, &values, set.values.len())?;
        set.values = values;
        Ok(())
    }

    /// Columns occupied by `id` in the global vector.
    pub fn column_range(&self, id: VarSetId) -> Option<Range<usize>> {
        let mut start = 0;
        for s in &self.sets {
            if s.id == id {
                return Some(start..start + s.len());
            }
            start += s.len();
        }
        None
    }

    pub fn total_count(&self) -> usize {
        self.sets.iter().map(VariableSet::len).sum()
    }

    /// Concatenation of all sets in insertion order.
    pub fn to_vector(&self) -> DVector<f64> {
        let mut x = DVector::zeros(self.total_count());
        let mut start = 0;
        for s in &self.sets {
            x.rows_mut(start, s.len()).copy_from(&s.values);
            start += s.len();
        }
        x
    }

    /// Split a global vector back into the variable sets.
    pub fn set_from_vector(&mut self, x: &DVector<f64>) -> MotionResult<()> {
        let expected = self.total_count();
        if x.len() != expected {
            return Err(MotionError::DimensionMismatch {
                what: "global optimization vector".to_string(),
                expected,
                actual: x.len(),
            });
        }
        let mut start = 0;
        for s in &mut self.sets {
            let n = s.len();
            s.values.copy_from(&x.rows(start, n));
            start += n;
        }
        Ok(())
    }

    /// Bounds of all coefficients in global order.
    pub fn bounds(&self) -> VecBound {
        self.sets
            .iter()
            .flat_map(|s| s.bounds.iter().copied())
            .collect()
    }
}
