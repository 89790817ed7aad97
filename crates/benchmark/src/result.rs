use std::sync::Arc;

use fitbench_controllers::ExitFlag;
use fitbench_core::FittingProblem;

/// The outcome of one (starting point, software, minimizer) combination.
///
/// `chi_sq` and `runtime` are `+∞` when the attempt raised an error, and
/// `chi_sq` is also `+∞` whenever no usable parameters were produced.
#[derive(Debug, Clone)]
pub struct FittingResult {
    pub problem: Arc<FittingProblem>,
    pub parameter_set: usize,
    pub software: String,
    pub minimizer: String,
    pub chi_sq: f64,

    /// Mean wall time of the timed repeats, in seconds.
    pub runtime: f64,
    pub initial_params: Vec<f64>,
    pub final_params: Option<Vec<f64>>,

    /// `initial_params` formatted with their names.
    pub ini_function_params: String,
    pub fin_function_params: Option<String>,

    /// Model values at `final_params` over the corrected x data.
    pub fitted_y: Option<Vec<f64>>,
    pub error_flag: ExitFlag,
}

impl FittingResult {
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.error_flag.message()
    }

    /// Returns true if the minimizer converged to usable parameters.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.error_flag == ExitFlag::Converged && self.final_params.is_some()
    }
}
