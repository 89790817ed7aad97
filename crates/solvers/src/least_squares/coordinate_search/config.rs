use thiserror::Error;

use crate::optimization::golden_section;

/// Configuration for cyclic coordinate search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    abs_tol: f64,
    rel_tol: f64,
    initial_step: f64,
    line_search: golden_section::Config,
}

/// Errors from validating a coordinate search config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("initial_step must be finite and positive")]
    InitialStep,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 500,
            abs_tol: 1e-8,
            rel_tol: 1e-8,
            initial_step: 1.0,
            line_search: golden_section::Config::default(),
        }
    }
}

impl Config {
    /// Creates a config with a unit initial step.
    ///
    /// `max_iters` counts full sweeps over all parameters.
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

    /// Sets the first sweep's search half-width relative to `max(|p|, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InitialStep`] if the step is not positive and finite.
    pub fn with_initial_step(self, initial_step: f64) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        Ok(Self {
            initial_step,
            ..self
        })
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
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    #[must_use]
    pub fn line_search(&self) -> &golden_section::Config {
        &self.line_search
    }
}
