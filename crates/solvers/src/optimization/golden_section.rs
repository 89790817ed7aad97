//! Golden section search for single-variable minimization.
//!
//! # Algorithm
//!
//! The search keeps two interior points of the bracket `[lo, hi]`, placed so
//! that each interior point divides the bracket in the golden ratio. Each
//! iteration discards the part of the bracket beyond the worse interior point,
//! reusing the better one, so only one new evaluation is needed per iteration.
//!
//! # Non-finite objectives
//!
//! An objective that evaluates to NaN is treated as `+∞`. This lets callers
//! such as line searches probe regions where the model overflows without
//! aborting: the search simply shrinks away from them.
//!
//! # Limitations
//!
//! - Finds a local minimum when the objective is not unimodal on the bracket
//! - Converges linearly (the bracket shrinks by `φ⁻¹ ≈ 0.618` per iteration)

mod config;
mod error;
mod solution;
mod state;


pub use config::{Config, ConfigError};
pub use error::Error;
pub use solution::{Solution, Status};

use state::{Probe, State};

/// Minimizes `objective` over the interval `bracket`.
///
/// The bounds may be given in either order.
///
/// # Errors
///
/// Returns [`Error::NonFiniteBracket`] if a bound is not finite, or
/// [`Error::Objective`] if the objective itself fails.
pub fn minimize<F, E>(
    mut objective: F,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution, Error<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if let Some(&value) = bracket.iter().find(|b| !b.is_finite()) {
        return Err(Error::NonFiniteBracket { value });
    }

    let mut eval = |x: f64| -> Result<Probe, Error<E>> {
        let value = objective(x).map_err(|source| Error::Objective { x, source })?;
        Ok(Probe::new(x, value))
    };

    let mut state = State::new(bracket, &mut eval)?;

    for iter in 0..config.max_iters() {
        if state.is_converged(config) {
            return Ok(state.into_solution(Status::Converged, iter));
        }
        state.step(&mut eval)?;
    }

    let status = if state.is_converged(config) {
        Status::Converged
    } else {
        Status::MaxIters
    };
    Ok(state.into_solution(status, config.max_iters()))
}
