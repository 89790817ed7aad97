use thiserror::Error;

/// Errors raised when a fitting problem is incomplete or inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("no fitting function has been set")]
    MissingFunction,

    #[error("no starting values have been set")]
    NoStartingValues,

    #[error("{field} has no values")]
    MissingData { field: &'static str },

    #[error("{field} has {actual} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("starting value set {index} does not use the parameter names of set 0")]
    InconsistentParameters { index: usize },

    #[error("expected {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("parameter set {index} is out of range for {len} starting value sets")]
    ParameterSetOutOfRange { index: usize, len: usize },
}
