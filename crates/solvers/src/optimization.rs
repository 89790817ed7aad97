//! One-dimensional minimization.
//!
//! # Solvers
//!
//! - [`golden_section`]: derivative-free search over a bracketed interval for
//!   unimodal functions

pub mod golden_section;
