//! In-house numerical solvers.
//!
//! These solvers form the `native` fitting software. They are written against
//! [`fitbench_core::LeastSquaresProblem`] and share nothing with the external
//! engines, so benchmarking them alongside those engines is a fair comparison.
//!
//! - [`optimization`]: one-dimensional minimization (golden section search)
//! - [`least_squares`]: multi-parameter least-squares minimization

pub mod least_squares;
pub mod optimization;
