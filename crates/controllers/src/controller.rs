use std::sync::Arc;

use fitbench_core::{DataSlice, FittingProblem, ProblemError};
use tracing::debug;

use crate::{ControllerAttributeError, ControllerError, ExitFlag};

/// Iteration cap applied when none is set explicitly.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// State shared by every controller.
///
/// The driver sets `minimizer` and `parameter_set` before each attempt.
/// `initial_params` is filled by [`Controller::prepare`], and `flag`,
/// `final_params` and `results` by the controller's `cleanup()`.
#[derive(Debug)]
pub struct ControllerBase {
    problem: Arc<FittingProblem>,
    pub minimizer: Option<String>,
    pub parameter_set: Option<usize>,
    pub initial_params: Vec<f64>,
    pub final_params: Option<Vec<f64>>,

    /// Model values at `final_params` over the problem's x data.
    pub results: Option<Vec<f64>>,
    pub flag: Option<ExitFlag>,
    pub max_iterations: usize,
}

impl ControllerBase {
    #[must_use]
    pub fn new(problem: Arc<FittingProblem>) -> Self {
        Self {
            problem,
            minimizer: None,
            parameter_set: None,
            initial_params: Vec::new(),
            final_params: None,
            results: None,
            flag: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn problem(&self) -> &Arc<FittingProblem> {
        &self.problem
    }

    /// Returns the minimizer name, or an error if it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerAttributeError::MinimizerUnset`].
    pub fn minimizer(&self) -> Result<&str, ControllerAttributeError> {
        self.minimizer
            .as_deref()
            .ok_or(ControllerAttributeError::MinimizerUnset)
    }

    /// Records the outcome of a fit.
    ///
    /// Parameters are kept only when the flag is below 3 and every value is
    /// finite. An engine that stopped without iterating keeps them only if it
    /// converged, as when it starts at the optimum. `results` follows
    /// `final_params`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProblemError`] if the model cannot be evaluated at the
    /// kept parameters.
    pub fn record(
        &mut self,
        flag: ExitFlag,
        params: Option<Vec<f64>>,
        iterations: u64,
    ) -> Result<(), ProblemError> {
        debug!(
            minimizer = self.minimizer.as_deref().unwrap_or_default(),
            code = flag.code(),
            iterations,
            "recorded fit outcome"
        );

        let iterated = iterations > 0 || flag == ExitFlag::Converged;
        let usable = params
            .filter(|params| flag.completed() && iterated && params.iter().all(|p| p.is_finite()));

        self.flag = Some(flag);
        self.results = usable
            .as_deref()
            .map(|params| self.problem.eval_f(params, None))
            .transpose()?;
        self.final_params = usable;
        Ok(())
    }

    fn reset_outcome(&mut self) {
        self.final_params = None;
        self.results = None;
        self.flag = None;
    }
}

/// One engine's adapter to the common fitting lifecycle.
///
/// Implementors provide [`setup`](Self::setup), [`fit`](Self::fit) and
/// [`cleanup`](Self::cleanup). The provided methods handle preconditions,
/// postconditions and the chi-squared metric identically for every engine.
pub trait Controller: Send {
    /// Software name, as accepted by [`crate::create_controller`].
    fn software(&self) -> &'static str;

    /// Minimizer names this controller accepts.
    fn minimizers(&self) -> &'static [&'static str];

    fn base(&self) -> &ControllerBase;

    fn base_mut(&mut self) -> &mut ControllerBase;

    /// Builds the engine state for the current minimizer from `initial_params`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownMinimizer`] for names outside
    /// [`minimizers`](Self::minimizers), or an engine configuration error.
    fn setup(&mut self) -> Result<(), ControllerError>;

    /// Runs the engine until it stops.
    ///
    /// Expected non-convergence is not an error; it is classified later by
    /// [`cleanup`](Self::cleanup).
    ///
    /// # Errors
    ///
    /// Returns an error if the engine itself fails.
    fn fit(&mut self) -> Result<(), ControllerError>;

    /// Translates the engine status into a flag and records the parameters.
    ///
    /// Releases any engine state built by [`setup`](Self::setup).
    ///
    /// # Errors
    ///
    /// Returns an error if called before [`fit`](Self::fit), or if the model
    /// cannot be evaluated at the final parameters.
    fn cleanup(&mut self) -> Result<(), ControllerError>;

    /// Checks preconditions, loads the starting values, and runs `setup()`.
    ///
    /// # Errors
    ///
    /// Returns an attribute error if `minimizer` or `parameter_set` is unset,
    /// a problem error if the starting values cannot be read, or any error
    /// from [`setup`](Self::setup).
    fn prepare(&mut self) -> Result<(), ControllerError> {
        let base = self.base_mut();
        base.minimizer()?;
        let index = base
            .parameter_set
            .ok_or(ControllerAttributeError::ParameterSetUnset)?;

        base.initial_params = base.problem.initial_params(index)?;
        base.reset_outcome();
        self.setup()
    }

    /// Confirms `cleanup()` left a valid flag.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerAttributeError::FlagUnset`] if no flag was set.
    fn check_attributes(&self) -> Result<ExitFlag, ControllerAttributeError> {
        let flag = self.base().flag.ok_or(ControllerAttributeError::FlagUnset)?;
        ExitFlag::try_from(flag.code())
    }

    /// Computes the weighted residual sum of squares at `params`.
    ///
    /// Uses the problem's own data when `data` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProblemError`] if the residuals cannot be evaluated.
    fn eval_chisq(&self, params: &[f64], data: Option<DataSlice<'_>>) -> Result<f64, ProblemError> {
        self.base().problem.eval_r_norm(params, data)
    }

    fn set_max_iterations(&mut self, max_iterations: usize) {
        self.base_mut().max_iterations = max_iterations;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use fitbench_core::ParameterSet;

    use super::*;

    /// Reports whatever outcome the test loads into it.
    struct Scripted {
        base: ControllerBase,
        outcome: (ExitFlag, Option<Vec<f64>>, u64),
        set_up: bool,
    }

    impl Scripted {
        fn new(outcome: (ExitFlag, Option<Vec<f64>>, u64)) -> Self {
            Self {
                base: ControllerBase::new(Arc::new(line_problem())),
                outcome,
                set_up: false,
            }
        }
    }

    impl Controller for Scripted {
        fn software(&self) -> &'static str {
            "scripted"
        }

        fn minimizers(&self) -> &'static [&'static str] {
            &["only"]
        }

        fn base(&self) -> &ControllerBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ControllerBase {
            &mut self.base
        }

        fn setup(&mut self) -> Result<(), ControllerError> {
            self.set_up = true;
            Ok(())
        }

        fn fit(&mut self) -> Result<(), ControllerError> {
            Ok(())
        }

        fn cleanup(&mut self) -> Result<(), ControllerError> {
            let (flag, params, iterations) = self.outcome.clone();
            Ok(self.base.record(flag, params, iterations)?)
        }
    }

    fn line_problem() -> FittingProblem {
        FittingProblem::new("line")
            .with_data(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0])
            .with_function(|x: f64, p: &[f64]| p[0] * x)
            .with_starting_values(ParameterSet::new().with("m", 1.0))
    }

    fn ready(outcome: (ExitFlag, Option<Vec<f64>>, u64)) -> Scripted {
        let mut controller = Scripted::new(outcome);
        controller.base.minimizer = Some("only".into());
        controller.base.parameter_set = Some(0);
        controller
    }

    #[test]
    fn prepare_requires_minimizer() {
        let mut controller = Scripted::new((ExitFlag::Converged, None, 1));
        controller.base.parameter_set = Some(0);

        let err = controller.prepare().expect_err("minimizer is unset");
        assert!(matches!(
            err,
            ControllerError::Attribute(ControllerAttributeError::MinimizerUnset)
        ));
        assert!(!controller.set_up);
    }

    #[test]
    fn prepare_requires_parameter_set() {
        let mut controller = Scripted::new((ExitFlag::Converged, None, 1));
        controller.base.minimizer = Some("only".into());

        let err = controller.prepare().expect_err("parameter set is unset");
        assert!(matches!(
            err,
            ControllerError::Attribute(ControllerAttributeError::ParameterSetUnset)
        ));
    }

    #[test]
    fn prepare_loads_starting_values() {
        let mut controller = ready((ExitFlag::Converged, None, 1));
        controller.prepare().expect("prepare succeeds");

        assert_eq!(controller.base.initial_params, vec![1.0]);
        assert!(controller.set_up);
    }

    #[test]
    fn prepare_rejects_missing_parameter_set() {
        let mut controller = ready((ExitFlag::Converged, None, 1));
        controller.base.parameter_set = Some(3);

        let err = controller.prepare().expect_err("only one starting value set");
        assert!(matches!(
            err,
            ControllerError::Problem(ProblemError::ParameterSetOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn converged_outcome_keeps_params_and_results() {
        let mut controller = ready((ExitFlag::Converged, Some(vec![2.0]), 4));
        controller.prepare().expect("prepare succeeds");
        controller.fit().expect("fit succeeds");
        controller.cleanup().expect("cleanup succeeds");

        assert_eq!(controller.check_attributes(), Ok(ExitFlag::Converged));
        let final_params = controller.base.final_params.clone().expect("params kept");
        assert_eq!(final_params.len(), controller.base.initial_params.len());
        assert_eq!(controller.base.results, Some(vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn zero_iterations_drops_params() {
        let mut controller = ready((ExitFlag::MaxIterations, Some(vec![1.0]), 0));
        controller.prepare().expect("prepare succeeds");
        controller.cleanup().expect("cleanup succeeds");

        assert_eq!(controller.base.flag, Some(ExitFlag::MaxIterations));
        assert!(controller.base.final_params.is_none());
        assert!(controller.base.results.is_none());
    }

    #[test]
    fn converging_without_iterating_keeps_params() {
        let mut controller = ready((ExitFlag::Converged, Some(vec![2.0]), 0));
        controller.prepare().expect("prepare succeeds");
        controller.cleanup().expect("cleanup succeeds");

        assert_eq!(controller.base.final_params, Some(vec![2.0]));
        assert_eq!(controller.base.results, Some(vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn exception_or_non_finite_drops_params() {
        let mut controller = ready((ExitFlag::Exception, Some(vec![2.0]), 3));
        controller.cleanup().expect("cleanup succeeds");
        assert!(controller.base.final_params.is_none());

        let mut controller = ready((ExitFlag::NotConverged, Some(vec![f64::NAN]), 3));
        controller.cleanup().expect("cleanup succeeds");
        assert!(controller.base.final_params.is_none());
    }

    #[test]
    fn check_attributes_requires_flag() {
        let mut controller = ready((ExitFlag::Converged, Some(vec![2.0]), 1));
        controller.prepare().expect("prepare succeeds");

        assert_eq!(
            controller.check_attributes(),
            Err(ControllerAttributeError::FlagUnset)
        );
    }

    #[test]
    fn prepare_clears_previous_outcome() {
        let mut controller = ready((ExitFlag::Converged, Some(vec![2.0]), 1));
        controller.prepare().expect("prepare succeeds");
        controller.cleanup().expect("cleanup succeeds");
        controller.prepare().expect("prepare succeeds again");

        assert!(controller.base.flag.is_none());
        assert!(controller.base.final_params.is_none());
    }

    #[test]
    fn eval_chisq_is_deterministic() {
        let controller = ready((ExitFlag::Converged, None, 1));
        let first = controller.eval_chisq(&[1.5], None).expect("chi-squared");
        let second = controller.eval_chisq(&[1.5], None).expect("chi-squared");

        assert_eq!(first.to_bits(), second.to_bits());
        assert_relative_eq!(first, 0.25 + 1.0 + 2.25);
    }

    #[test]
    fn max_iterations_defaults_and_updates() {
        let mut controller = ready((ExitFlag::Converged, None, 1));
        assert_eq!(controller.base.max_iterations, DEFAULT_MAX_ITERATIONS);

        controller.set_max_iterations(0);
        assert_eq!(controller.base.max_iterations, 0);
    }
}
