use std::sync::Arc;

use fitbench_core::FittingProblem;
use levenberg_marquardt::{
    LeastSquaresProblem, LevenbergMarquardt, MinimizationReport, TerminationReason,
};
use nalgebra::{DMatrix, DVector, Dyn, storage::Owned};
use tracing::debug;

use crate::{Controller, ControllerBase, ControllerError, ExitFlag};

const SOFTWARE: &str = "minpack";

/// Residuals and Jacobian of a fitting problem at the engine's current point.
struct Residuals {
    problem: Arc<FittingProblem>,
    params: DVector<f64>,
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for Residuals {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.problem
            .eval_r(self.params.as_slice(), None)
            .ok()
            .map(DVector::from_vec)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        self.problem.eval_j(self.params.as_slice(), None).ok()
    }
}

/// Outcome of one `fit()`.
enum Run {
    /// The iteration cap was zero, so the engine never started.
    Skipped,
    Finished {
        params: DVector<f64>,
        report: MinimizationReport<f64>,
    },
}

/// Controller for the MINPACK-style Levenberg-Marquardt implementation.
///
/// `lm` scales the damping by the Jacobian column norms; `lm_unscaled`
/// uses the identity.
pub struct MinpackController {
    base: ControllerBase,
    solver: Option<LevenbergMarquardt<f64>>,
    run: Option<Run>,
}

impl MinpackController {
    pub const MINIMIZERS: &'static [&'static str] = &["lm", "lm_unscaled"];

    #[must_use]
    pub fn new(problem: Arc<FittingProblem>) -> Self {
        Self {
            base: ControllerBase::new(problem),
            solver: None,
            run: None,
        }
    }
}

impl Controller for MinpackController {
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

        self.solver = Some(
            LevenbergMarquardt::new()
                .with_patience(self.base.max_iterations.max(1))
                .with_scale_diag(minimizer == "lm"),
        );
        self.run = None;
        Ok(())
    }

    fn fit(&mut self) -> Result<(), ControllerError> {
        let solver = self
            .solver
            .take()
            .ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;

        if self.base.max_iterations == 0 {
            self.run = Some(Run::Skipped);
            return Ok(());
        }

        let residuals = Residuals {
            problem: Arc::clone(self.base.problem()),
            params: DVector::from_column_slice(&self.base.initial_params),
        };
        let (residuals, report) = solver.minimize(residuals);

        self.run = Some(Run::Finished {
            params: residuals.params,
            report,
        });
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), ControllerError> {
        self.solver = None;
        let run = self
            .run
            .take()
            .ok_or(ControllerError::NotSetUp { software: SOFTWARE })?;

        match run {
            Run::Skipped => self.base.record(ExitFlag::MaxIterations, None, 0)?,
            Run::Finished { params, report } => {
                let flag = exit_flag(&report.termination);
                debug!(
                    termination = ?report.termination,
                    evaluations = report.number_of_evaluations,
                    objective = report.objective_function,
                    "levenberg-marquardt finished"
                );
                let evaluations = u64::try_from(report.number_of_evaluations).unwrap_or(u64::MAX);
                self.base
                    .record(flag, Some(params.as_slice().to_vec()), evaluations)?;
            }
        }
        Ok(())
    }
}

fn exit_flag(termination: &TerminationReason) -> ExitFlag {
    match termination {
        TerminationReason::Converged { .. }
        | TerminationReason::ResidualsZero
        | TerminationReason::Orthogonal => ExitFlag::Converged,
        TerminationReason::LostPatience => ExitFlag::MaxIterations,
        _ => ExitFlag::NotConverged,
    }
}
