use fitbench_controllers::{ControllerAttributeError, FactoryError};
use fitbench_core::ProblemError;
use thiserror::Error;

/// Errors that stop a benchmark run.
///
/// Failures of individual fits are not errors; they are recorded as
/// [`ExitFlag::Exception`](crate::ExitFlag::Exception) results.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error("no minimizers are configured for software '{software}'")]
    NoMinimizers { software: String },

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error("controller for '{software}' left invalid attributes")]
    Attribute {
        software: String,
        #[source]
        source: ControllerAttributeError,
    },
}

/// Errors from validating benchmark options.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OptionsError {
    #[error("num_runs must be at least 1")]
    NoRuns,

    #[error("at least one software must be selected")]
    NoSoftware,
}
