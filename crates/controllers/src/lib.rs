//! Controllers normalize minimizers from different engines into one lifecycle.
//!
//! A [`Controller`] is created per (problem, software) pair. For each
//! minimizer the caller sets [`ControllerBase::minimizer`] and
//! [`ControllerBase::parameter_set`], then runs
//! [`prepare`](Controller::prepare), [`fit`](Controller::fit) and
//! [`cleanup`](Controller::cleanup). The outcome is always reported as an
//! [`ExitFlag`], whatever the engine's native status vocabulary.
//!
//! Controllers are looked up by software name through [`create_controller`].

mod controller;
mod engines;
mod error;
mod factory;
mod flag;

pub mod scope;

pub use controller::{Controller, ControllerBase, DEFAULT_MAX_ITERATIONS};
pub use engines::NativeController;
#[cfg(feature = "argmin")]
pub use engines::ArgminController;
#[cfg(feature = "minpack")]
pub use engines::MinpackController;
pub use error::{ControllerAttributeError, ControllerError, FactoryError};
pub use factory::{ControllerClass, SOFTWARE, create_controller};
pub use flag::ExitFlag;
