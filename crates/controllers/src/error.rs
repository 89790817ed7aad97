use fitbench_core::ProblemError;
use thiserror::Error;

/// A controller attribute is missing or holds an invalid value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerAttributeError {
    #[error("minimizer must be set before prepare()")]
    MinimizerUnset,

    #[error("parameter_set must be set before prepare()")]
    ParameterSetUnset,

    #[error("flag was not set by cleanup()")]
    FlagUnset,

    #[error("flag must be one of 0, 1, 2 or 3, got {code}")]
    FlagOutOfRange { code: i32 },
}

/// Errors raised while driving a controller through its lifecycle.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Attribute(#[from] ControllerAttributeError),

    #[error("{software} has no minimizer named '{minimizer}'")]
    UnknownMinimizer {
        software: &'static str,
        minimizer: String,
    },

    #[error("{software}: fit() called before setup()")]
    NotSetUp { software: &'static str },

    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error("{software} engine failed: {source}")]
    Engine {
        software: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors from resolving a software name to a controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("no controller exists for software '{software}'")]
    NoController { software: String },

    #[error("software '{software}' requires the '{feature}' feature of fitbench-controllers")]
    MissingDependency {
        software: String,
        feature: &'static str,
    },
}
