use std::{cell::RefCell, rc::Rc, sync::Arc};

use argmin::{
    core::{
        ArgminError, Executor, IterState, KV, Solver, State, TerminationReason,
        observers::{Observe, ObserverMode},
    },
    solver::{
        conjugategradient::{
            NonlinearConjugateGradient,
            beta::{FletcherReeves, PolakRibiere},
        },
        gradientdescent::SteepestDescent,
        linesearch::MoreThuenteLineSearch,
        neldermead::NelderMead,
        quasinewton::LBFGS,
    },
};
use fitbench_core::FittingProblem;
use tracing::debug;

use crate::{Controller, ControllerBase, ControllerError, ExitFlag};

mod cost;

use cost::ChiSquared;

const SOFTWARE: &str = "argmin";

const LBFGS_MEMORY: usize = 7;
const LBFGS_GRAD_TOL: f64 = 1e-10;
const LBFGS_COST_TOL: f64 = 1e-14;
const SIMPLEX_SD_TOL: f64 = 1e-12;
const CG_RESTART_ITERS: u64 = 10;
const CG_RESTART_ORTHOGONALITY: f64 = 0.1;

/// Relative size of each simplex edge, or the absolute size for zero params.
const SIMPLEX_STEP: f64 = 0.05;
const SIMPLEX_ZERO_STEP: f64 = 0.00025;

type Param = Vec<f64>;
type Line = MoreThuenteLineSearch<Param, Param, f64>;

/// A configured argmin solver, consumed by `fit()`.
enum Method {
    NelderMead(NelderMead<Param, f64>),
    Lbfgs(LBFGS<Line, Param, Param, f64>),
    SteepestDescent(SteepestDescent<Line>),
    ConjugatePr(NonlinearConjugateGradient<Param, Line, PolakRibiere, f64>),
    ConjugateFr(NonlinearConjugateGradient<Param, Line, FletcherReeves, f64>),
}

/// What the executor left behind.
#[derive(Default)]
struct Outcome {
    params: Option<Param>,
    iterations: u64,
    reason: Option<TerminationReason>,
}

/// Controller for the `argmin` minimizers.
///
/// Minimizes the chi-squared cost directly. Gradient-based methods use a
/// central-difference gradient of that cost.
pub struct ArgminController {
    base: ControllerBase,
    method: Option<Method>,
    outcome: Option<Outcome>,
}

impl ArgminController {
    pub const MINIMIZERS: &'static [&'static str] = &[
        "nelder_mead",
        "lbfgs",
        "steepest_descent",
        "conjugate_pr",
        "conjugate_fr",
    ];

    #[must_use]
    pub fn new(problem: Arc<FittingProblem>) -> Self {
        Self {
            base: ControllerBase::new(problem),
            method: None,
            outcome: None,
        }
    }

    fn build(minimizer: &str, initial: &[f64]) -> Result<Method, argmin::core::Error> {
        Ok(match minimizer {
            "nelder_mead" => Method::NelderMead(
                NelderMead::new(initial_simplex(initial)).with_sd_tolerance(SIMPLEX_SD_TOL)?,
            ),
            "lbfgs" => Method::Lbfgs(
                LBFGS::new(MoreThuenteLineSearch::new(), LBFGS_MEMORY)
                    .with_tolerance_grad(LBFGS_GRAD_TOL)?
                    .with_tolerance_cost(LBFGS_COST_TOL)?,
            ),
            "steepest_descent" => {
                Method::SteepestDescent(SteepestDescent::new(MoreThuenteLineSearch::new()))
            }
            "conjugate_pr" => Method::ConjugatePr(
                NonlinearConjugateGradient::new(cg_line_search()?, PolakRibiere::new())
                    .restart_iters(CG_RESTART_ITERS)
                    .restart_orthogonality(CG_RESTART_ORTHOGONALITY),
            ),
            _ => Method::ConjugateFr(
                NonlinearConjugateGradient::new(cg_line_search()?, FletcherReeves::new())
                    .restart_iters(CG_RESTART_ITERS)
                    .restart_orthogonality(CG_RESTART_ORTHOGONALITY),
            ),
        })
    }
}

impl Controller for ArgminController {
    fn software(&self) -> &'static str {
        SOFTWARE
    }

    fn minimizers(&self) -> &'static [&'static str] {
        Self::MINIMIZERS
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }

    fn setup(&mut self) -> Result<(), ControllerError> {
        let minimizer = super::find_minimizer(SOFTWARE, Self::MINIMIZERS, self.base.minimizer()?)?;
        let method = Self::build(minimizer, &self.base.initial_params).map_err(engine_error)?;

        self.method = Some(method);
        self.outcome = None;
        Ok(())
    }

    fn fit(&mut self) -> Result<(), ControllerError> {
        let method = self
            .method
            .take()
            .ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;
        let cost = ChiSquared::new(Arc::clone(self.base.problem()));
        let init = self.base.initial_params.clone();
        let max_iters = u64::try_from(self.base.max_iterations).unwrap_or(u64::MAX);

        let outcome = match method {
            Method::NelderMead(solver) => execute(cost, solver, init, max_iters),
            Method::Lbfgs(solver) => execute(cost, solver, init, max_iters),
            Method::SteepestDescent(solver) => execute(cost, solver, init, max_iters),
            Method::ConjugatePr(solver) => execute(cost, solver, init, max_iters),
            Method::ConjugateFr(solver) => execute(cost, solver, init, max_iters),
        }
        .map_err(engine_error)?;

        self.outcome = Some(outcome);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), ControllerError> {
        self.method = None;
        let outcome = self
            .outcome
            .take()
            .ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;

        let flag = exit_flag(outcome.reason.as_ref());
        debug!(reason = ?outcome.reason, iterations = outcome.iterations, "argmin run finished");
        self.base.record(flag, outcome.params, outcome.iterations)?;
        Ok(())
    }
}

/// Best point and iteration count seen so far, shared with the executor.
///
/// A run that ends in an error hands back no state, so this is all that
/// survives of it.
#[derive(Clone, Default)]
struct Progress(Rc<RefCell<Outcome>>);

impl Progress {
    fn take(&self) -> Outcome {
        self.0.take()
    }
}

impl<I> Observe<I> for Progress
where
    I: State<Param = Param>,
{
    fn observe_iter(&mut self, state: &I, _kv: &KV) -> Result<(), argmin::core::Error> {
        let mut outcome = self.0.borrow_mut();
        outcome.params = state.get_best_param().cloned();
        outcome.iterations = state.get_iter() + 1;
        Ok(())
    }
}

/// Runs any argmin solver over the chi-squared cost.
///
/// A violated line-search condition, such as a direction that no longer
/// descends or a non-finite trial cost, ends the run with the best point
/// reached and no termination reason.
fn execute<S, G>(
    cost: ChiSquared,
    solver: S,
    init: Param,
    max_iters: u64,
) -> Result<Outcome, argmin::core::Error>
where
    S: Solver<ChiSquared, IterState<Param, G, (), (), (), f64>>,
    IterState<Param, G, (), (), (), f64>: State<Param = Param, Float = f64>,
{
    let progress = Progress::default();
    let run = Executor::new(cost, solver)
        .configure(|state| state.param(init).max_iters(max_iters))
        .add_observer(progress.clone(), ObserverMode::Always)
        .run();

    match run {
        Ok(result) => {
            let state = result.state();
            Ok(Outcome {
                params: state.get_best_param().cloned(),
                iterations: state.get_iter(),
                reason: state.get_termination_reason().cloned(),
            })
        }
        Err(err) if condition_violated(&err) => {
            debug!(error = %err, "argmin stopped early");
            Ok(progress.take())
        }
        Err(err) => Err(err),
    }
}

fn condition_violated(err: &argmin::core::Error) -> bool {
    matches!(
        err.downcast_ref::<ArgminError>(),
        Some(ArgminError::ConditionViolated { .. })
    )
}

fn exit_flag(reason: Option<&TerminationReason>) -> ExitFlag {
    match reason {
        Some(TerminationReason::SolverConverged | TerminationReason::TargetCostReached) => {
            ExitFlag::Converged
        }
        Some(TerminationReason::MaxItersReached | TerminationReason::Timeout) => {
            ExitFlag::MaxIterations
        }
        _ => ExitFlag::NotConverged,
    }
}

/// The starting point plus one vertex per parameter, nudged along its axis.
fn initial_simplex(initial: &[f64]) -> Vec<Param> {
    let vertices = (0..initial.len()).map(|i| {
        let mut vertex = initial.to_vec();
        vertex[i] = if vertex[i] == 0.0 {
            SIMPLEX_ZERO_STEP
        } else {
            vertex[i] * (1.0 + SIMPLEX_STEP)
        };
        vertex
    });
    std::iter::once(initial.to_vec()).chain(vertices).collect()
}

fn cg_line_search() -> Result<Line, argmin::core::Error> {
    MoreThuenteLineSearch::new().with_c(1e-4, 0.1)
}

fn engine_error(err: argmin::core::Error) -> ControllerError {
    ControllerError::Engine {
        software: SOFTWARE,
        source: err.into(),
    }
}
