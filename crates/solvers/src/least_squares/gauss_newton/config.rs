use thiserror::Error;

use crate::optimization::golden_section;

/// Configuration for the Gauss-Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    abs_tol: f64,
    rel_tol: f64,
    grad_tol: f64,
    max_step: f64,
    line_search: golden_section::Config,
}

/// Errors from validating a Gauss-Newton config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("grad_tol must be finite and non-negative")]
    GradTol,

    #[error("max_step must be finite and positive")]
    MaxStep,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 500,
            abs_tol: 1e-8,
            rel_tol: 1e-8,
            grad_tol: 1e-12,
            max_step: 2.0,
            line_search: default_line_search(),
        }
    }
}

fn default_line_search() -> golden_section::Config {
    golden_section::Config::new(60, 1e-10, 1e-6).unwrap_or_default()
}

impl Config {
    /// Creates a config with the default line search.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite.
    pub fn new(max_iters: usize, abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        Ok(Self {
            max_iters,
            abs_tol,
            rel_tol,
            ..Self::default()
        })
    }

    /// Sets the gradient tolerance below which the start is already optimal.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GradTol`] if `grad_tol` is negative or non-finite.
    pub fn with_grad_tol(self, grad_tol: f64) -> Result<Self, ConfigError> {
        if !grad_tol.is_finite() || grad_tol < 0.0 {
            return Err(ConfigError::GradTol);
        }
        Ok(Self { grad_tol, ..self })
    }

    /// Sets the upper end of the step length bracket.
    ///
    /// A value of 1 searches up to the full Gauss-Newton step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxStep`] if `max_step` is not positive and finite.
    pub fn with_max_step(self, max_step: f64) -> Result<Self, ConfigError> {
        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(ConfigError::MaxStep);
        }
        Ok(Self { max_step, ..self })
    }

    #[must_use]
    pub fn with_line_search(self, line_search: golden_section::Config) -> Self {
        Self {
            line_search,
            ..self
        }
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    #[must_use]
    pub fn grad_tol(&self) -> f64 {
        self.grad_tol
    }

    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    #[must_use]
    pub fn line_search(&self) -> &golden_section::Config {
        &self.line_search
    }
}
