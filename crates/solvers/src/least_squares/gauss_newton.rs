//! Gauss-Newton with a line search.
//!
//! Each iteration solves the normal equations `JᵀJ δ = -Jᵀr` for the step
//! direction and then runs a golden section search for the step length over
//! `[0, max_step]`. The solve converges when the accepted step satisfies
//! `|δᵢ| < abs_tol + rel_tol·|pᵢ|` for every parameter.
//!
//! If `JᵀJ` is not positive definite the direction comes from an SVD
//! pseudo-inverse instead. A direction along which the cost cannot be reduced
//! ends the solve with [`Status::Stalled`], unless the gradient is already
//! below `grad_tol`.

mod config;


pub use config::{Config, ConfigError};

use fitbench_core::LeastSquaresProblem;
use nalgebra::{DMatrix, DVector};

use super::{Error, Solution, Status, line, step_within_tolerance};

/// Minimizes the sum of squared residuals of `problem` starting at `initial`.
///
/// # Errors
///
/// Returns an error if the problem cannot be evaluated, the starting cost is
/// not finite, or the Jacobian has the wrong shape.
pub fn solve<P: LeastSquaresProblem>(
    problem: &P,
    initial: &[f64],
    config: &Config,
) -> Result<Solution, Error<P::Error>> {
    let mut params = initial.to_vec();
    let mut residuals = problem.residuals(&params).map_err(Error::Problem)?;
    let mut cost = residuals.norm_squared();
    if !cost.is_finite() {
        return Err(Error::NonFiniteStart);
    }

    for iter in 0..config.max_iters() {
        let jacobian = problem.jacobian(&params).map_err(Error::Problem)?;
        check_shape(&jacobian, residuals.len(), params.len())?;

        let gradient = jacobian.tr_mul(&residuals);
        if gradient.amax() < config.grad_tol() {
            return Ok(finish(Status::Converged, params, cost, iter));
        }

        let Some(direction) = normal_step(&jacobian, &gradient) else {
            return Ok(finish(Status::Stalled, params, cost, iter));
        };
        if step_within_tolerance(
            direction.as_slice(),
            &params,
            config.abs_tol(),
            config.rel_tol(),
        ) {
            return Ok(finish(Status::Converged, params, cost, iter));
        }

        let found = line::minimize_along(
            problem,
            &params,
            cost,
            direction.as_slice(),
            [0.0, config.max_step()],
            config.line_search(),
        )?;
        let Some(found) = found else {
            return Ok(finish(Status::Stalled, params, cost, iter));
        };

        let step: Vec<f64> = found.params.iter().zip(&params).map(|(a, b)| a - b).collect();
        params = found.params;
        cost = found.cost;
        residuals = problem.residuals(&params).map_err(Error::Problem)?;

        if step_within_tolerance(&step, &params, config.abs_tol(), config.rel_tol()) {
            return Ok(finish(Status::Converged, params, cost, iter + 1));
        }
    }

    Ok(finish(Status::MaxIters, params, cost, config.max_iters()))
}

fn finish(status: Status, params: Vec<f64>, cost: f64, iters: usize) -> Solution {
    Solution {
        status,
        params,
        cost,
        iters,
    }
}

fn check_shape<E>(jacobian: &DMatrix<f64>, m: usize, n: usize) -> Result<(), Error<E>> {
    if jacobian.shape() == (m, n) {
        Ok(())
    } else {
        Err(Error::JacobianShape {
            rows: jacobian.nrows(),
            cols: jacobian.ncols(),
            expected_rows: m,
            expected_cols: n,
        })
    }
}

/// Solves `JᵀJ δ = -Jᵀr`, falling back to a pseudo-inverse.
fn normal_step(jacobian: &DMatrix<f64>, gradient: &DVector<f64>) -> Option<DVector<f64>> {
    let rhs = -gradient;
    let normal = jacobian.tr_mul(jacobian);

    let step = match normal.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&rhs),
        None => normal.svd(true, true).solve(&rhs, f64::EPSILON).ok()?,
    };

    step.iter().all(|d| d.is_finite()).then_some(step)
}
