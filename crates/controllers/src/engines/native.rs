use std::sync::Arc;

use fitbench_core::{FittingProblem, ProblemError};
use fitbench_solvers::least_squares::{self, Solution, Status, coordinate_search, gauss_newton};
use tracing::debug;

use crate::{Controller, ControllerBase, ControllerError, ExitFlag};

const SOFTWARE: &str = "native";
const ABS_TOL: f64 = 1e-8;
const REL_TOL: f64 = 1e-8;

#[derive(Debug, Clone, Copy)]
enum Solver {
    GaussNewton(gauss_newton::Config),
    CoordinateSearch(coordinate_search::Config),
}

/// Controller for the in-house `fitbench-solvers` minimizers.
#[derive(Debug)]
pub struct NativeController {
    base: ControllerBase,
    solver: Option<Solver>,
    solution: Option<Solution>,
}

impl NativeController {
    pub const MINIMIZERS: &'static [&'static str] = &["gauss_newton", "coordinate_search"];

    #[must_use]
    pub fn new(problem: Arc<FittingProblem>) -> Self {
        Self {
            base: ControllerBase::new(problem),
            solver: None,
            solution: None,
        }
    }
}

impl Controller for NativeController {
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
        let max_iters = self.base.max_iterations;

        let solver = if minimizer == "gauss_newton" {
            gauss_newton::Config::new(max_iters, ABS_TOL, REL_TOL)
                .map(Solver::GaussNewton)
                .map_err(engine_error)?
        } else {
            coordinate_search::Config::new(max_iters, ABS_TOL, REL_TOL)
                .map(Solver::CoordinateSearch)
                .map_err(engine_error)?
        };

        self.solver = Some(solver);
        self.solution = None;
        Ok(())
    }

    fn fit(&mut self) -> Result<(), ControllerError> {
        let solver = self.solver.ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;
        let problem = self.base.problem().as_ref();
        let initial = &self.base.initial_params;

        let solution = match solver {
            Solver::GaussNewton(config) => gauss_newton::solve(problem, initial, &config),
            Solver::CoordinateSearch(config) => coordinate_search::solve(problem, initial, &config),
        }?;

        self.solution = Some(solution);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), ControllerError> {
        self.solver = None;
        let solution = self
            .solution
            .take()
            .ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;

        let flag = match solution.status {
            Status::Converged => ExitFlag::Converged,
            Status::MaxIters => ExitFlag::MaxIterations,
            Status::Stalled => ExitFlag::NotConverged,
        };
        debug!(status = ?solution.status, cost = solution.cost, "native solve finished");

        let iterations = u64::try_from(solution.iters).unwrap_or(u64::MAX);
        self.base.record(flag, Some(solution.params), iterations)?;
        Ok(())
    }
}

fn engine_error<E>(err: E) -> ControllerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ControllerError::Engine {
        software: SOFTWARE,
        source: Box::new(err),
    }
}

impl From<least_squares::Error<ProblemError>> for ControllerError {
    fn from(err: least_squares::Error<ProblemError>) -> Self {
        match err {
            least_squares::Error::Problem(source) => Self::Problem(source),
            other => engine_error(other),
        }
    }
}
