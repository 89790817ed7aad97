//! Core types for benchmarking curve-fitting minimizers.
//!
//! This crate defines the data that every fitting engine consumes:
//!
//! - [`FittingProblem`]: x/y/error data, a model function, and one or more
//!   starting parameter sets, with the evaluation primitives shared by all
//!   engines (model values, residuals, chi-squared, Jacobian)
//! - [`ParameterSet`]: an ordered mapping of parameter names to values
//! - [`DataSlice`]: borrowed x/y/error data for evaluating a problem against
//!   data other than its own
//! - [`LeastSquaresProblem`]: the residual/Jacobian interface that in-house
//!   solvers are written against

mod data;
mod error;
mod function;
mod least_squares;
mod params;
mod problem;

pub use data::DataSlice;
pub use error::ProblemError;
pub use function::FitFunction;
pub use least_squares::LeastSquaresProblem;
pub use params::ParameterSet;
pub use problem::FittingProblem;
