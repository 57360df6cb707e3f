//! Error types for constraint construction and evaluation.

use lo_core::CoreError;
use lo_motion::MotionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Unknown constraint: {name}")]
    UnknownConstraint { name: String },

    #[error("Unknown cost: {name}")]
    UnknownCost { name: String },

    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type NlpResult<T> = Result<T, NlpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lo_motion::VarSetId;

    #[test]
    fn error_display() {
        let err = NlpError::UnknownConstraint {
            name: "hover".to_string(),
        };
        assert!(err.to_string().contains("hover"));
    }

    #[test]
    fn motion_error_converts() {
        let err: NlpError = MotionError::UnknownVariableSet { id: VarSetId::Cop }.into();
        assert!(matches!(err, NlpError::Motion(_)));
        assert!(err.to_string().contains("cop"));
    }
}
