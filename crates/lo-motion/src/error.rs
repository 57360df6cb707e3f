//! Error types for variable providers.

use crate::variables::VarSetId;
use lo_core::CoreError;
use thiserror::Error;

/// Errors raised while wiring or updating optimization variables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    #[error("Unknown variable set: {id}")]
    UnknownVariableSet { id: VarSetId },

    #[error("Duplicate variable set: {id}")]
    DuplicateVariableSet { id: VarSetId },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid contact schedule: {what}")]
    InvalidSchedule { what: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type MotionResult<T> = Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_variable_set() {
        let err = MotionError::UnknownVariableSet { id: VarSetId::Cop };
        assert!(err.to_string().contains("cop"));
    }

    #[test]
    fn core_error_converts() {
        let err: MotionError = CoreError::InvalidArg { what: "dt" }.into();
        assert!(matches!(err, MotionError::Core(_)));
    }
}
