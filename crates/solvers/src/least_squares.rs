//! Multi-parameter least-squares minimization.
//!
//! Both solvers work on any [`LeastSquaresProblem`] and report a shared
//! [`Solution`]. They only need residuals, plus the Jacobian for Gauss-Newton.
//!
//! # Solvers
//!
//! - [`gauss_newton`]: Gauss-Newton steps with a golden section line search
//! - [`coordinate_search`]: cyclic one-parameter-at-a-time line searches
//!
//! [`LeastSquaresProblem`]: fitbench_core::LeastSquaresProblem

pub mod coordinate_search;
pub mod gauss_newton;

mod error;
mod line;
mod solution;

pub use error::Error;
pub use solution::{Solution, Status};

/// Returns true if every step component satisfies `|Δᵢ| < abs + rel·|pᵢ|`.
fn step_within_tolerance(step: &[f64], params: &[f64], abs_tol: f64, rel_tol: f64) -> bool {
    step.iter()
        .zip(params)
        .all(|(dp, p)| dp.abs() < abs_tol + rel_tol * p.abs())
}
