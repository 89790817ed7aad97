//! Benchmarks fitting minimizers from several engines against one problem.
//!
//! [`benchmark`] drives every (starting point, software, minimizer)
//! combination through the [`Controller`](fitbench_controllers::Controller)
//! lifecycle and returns one [`FittingResult`] per combination. Fit failures
//! are recorded in the results; only configuration and problem errors abort
//! the run.

mod driver;
mod error;
mod options;
mod result;
mod timing;

pub use driver::benchmark;
pub use error::{BenchmarkError, OptionsError};
pub use options::Options;
pub use result::FittingResult;
pub use timing::{RATIO_TOLERANCE, RepeatTimings};

pub use fitbench_controllers::ExitFlag;
pub use fitbench_core::{FittingProblem, ParameterSet};
