//! Cyclic coordinate search.
//!
//! Each sweep runs a golden section search along every parameter axis in
//! turn, keeping the others fixed. The search window for parameter `i` is
//! `pᵢ ± hᵢ`, where `hᵢ` starts at `initial_step·max(|pᵢ|, 1)`. After an
//! accepted move `hᵢ` becomes twice that move; after a failed search it halves.
//!
//! The solve converges once every `hᵢ` is below `abs_tol + rel_tol·|pᵢ|`.
//! Only the residuals are needed.

mod config;


pub use config::{Config, ConfigError};

use fitbench_core::LeastSquaresProblem;

use super::{Error, Solution, Status, line, step_within_tolerance};

/// Minimizes the sum of squared residuals of `problem` starting at `initial`.
///
/// # Errors
///
/// Returns an error if the problem cannot be evaluated or the starting cost
/// is not finite.
pub fn solve<P: LeastSquaresProblem>(
    problem: &P,
    initial: &[f64],
    config: &Config,
) -> Result<Solution, Error<P::Error>> {
    let mut params = initial.to_vec();
    let mut cost = problem.cost(&params).map_err(Error::Problem)?;
    if !cost.is_finite() {
        return Err(Error::NonFiniteStart);
    }

    let mut widths: Vec<f64> = params
        .iter()
        .map(|p| config.initial_step() * p.abs().max(1.0))
        .collect();
    let mut axis = vec![0.0; params.len()];

    for sweep in 0..config.max_iters() {
        for i in 0..params.len() {
            axis.fill(0.0);
            axis[i] = 1.0;
            let h = widths[i];

            let found = line::minimize_along(
                problem,
                &params,
                cost,
                &axis,
                [-h, h],
                config.line_search(),
            )?;
            match found {
                Some(found) => {
                    widths[i] = 2.0 * (found.params[i] - params[i]).abs();
                    params = found.params;
                    cost = found.cost;
                }
                None => widths[i] *= 0.5,
            }
        }

        if step_within_tolerance(&widths, &params, config.abs_tol(), config.rel_tol()) {
            return Ok(Solution {
                status: Status::Converged,
                params,
                cost,
                iters: sweep + 1,
            });
        }
    }

    Ok(Solution {
        status: Status::MaxIters,
        params,
        cost,
        iters: config.max_iters(),
    })
}
