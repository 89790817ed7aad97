//! The fitting problem: data, model, and starting values.

mod correct;
mod eval;

use std::fmt;
use std::sync::Arc;

use crate::{DataSlice, FitFunction, ParameterSet, ProblemError};

/// A curve-fitting problem.
///
/// A problem is populated by a parser, checked once with [`verify`], and
/// corrected once with [`correct_data`] before any engine reads it. After that
/// it is treated as read-only and shared between controllers.
///
/// [`verify`]: FittingProblem::verify
/// [`correct_data`]: FittingProblem::correct_data
#[derive(Clone, Default)]
pub struct FittingProblem {
    /// Display name of the problem.
    pub name: String,

    /// Human-readable form of the model equation.
    pub equation: String,

    pub data_x: Vec<f64>,
    pub data_y: Vec<f64>,

    /// Per-point errors used to weight residuals, if any.
    pub data_e: Option<Vec<f64>>,

    /// The model `y = f(x; p)`.
    pub function: Option<Arc<dyn FitFunction>>,

    /// Initial guesses; each entry is one complete parameter vector.
    pub starting_values: Vec<ParameterSet>,

    /// Lower bound (inclusive) of the fitted x range.
    pub start_x: Option<f64>,

    /// Upper bound (inclusive) of the fitted x range.
    pub end_x: Option<f64>,

    sorted_index: Option<Vec<usize>>,
    corrected: bool,
}

impl FittingProblem {
    /// Creates an empty problem with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the x/y data.
    #[must_use]
    pub fn with_data(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.data_x = x;
        self.data_y = y;
        self
    }

    /// Sets per-point errors.
    #[must_use]
    pub fn with_errors(mut self, e: Vec<f64>) -> Self {
        self.data_e = Some(e);
        self
    }

    /// Sets the model function.
    #[must_use]
    pub fn with_function<F>(mut self, function: F) -> Self
    where
        F: FitFunction + 'static,
    {
        self.function = Some(Arc::new(function));
        self
    }

    /// Sets the model equation shown in reports.
    #[must_use]
    pub fn with_equation(mut self, equation: impl Into<String>) -> Self {
        self.equation = equation.into();
        self
    }

    /// Appends a starting parameter set.
    #[must_use]
    pub fn with_starting_values(mut self, values: ParameterSet) -> Self {
        self.starting_values.push(values);
        self
    }

    /// Restricts fitting to `start_x <= x <= end_x`.
    #[must_use]
    pub fn with_fit_range(mut self, start_x: Option<f64>, end_x: Option<f64>) -> Self {
        self.start_x = start_x;
        self.end_x = end_x;
        self
    }

    /// Returns the name with spaces and commas replaced by underscores.
    #[must_use]
    pub fn sanitised_name(&self) -> String {
        self.name.replace([' ', ','], "_")
    }

    /// Returns the problem's own data.
    #[must_use]
    pub fn data(&self) -> DataSlice<'_> {
        DataSlice {
            x: &self.data_x,
            y: &self.data_y,
            e: self.data_e.as_deref(),
        }
    }

    /// Returns the indices that order the (corrected) x data ascending.
    ///
    /// Only available after [`correct_data`](Self::correct_data).
    #[must_use]
    pub fn sorted_index(&self) -> Option<&[usize]> {
        self.sorted_index.as_deref()
    }

    /// Returns `true` once [`correct_data`](Self::correct_data) has run.
    #[must_use]
    pub fn is_corrected(&self) -> bool {
        self.corrected
    }

    /// Returns the parameter names, taken from the first starting value set.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.starting_values.iter().take(1).flat_map(ParameterSet::names)
    }

    /// Returns the number of parameters in the model.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.starting_values.first().map_or(0, ParameterSet::len)
    }

    /// Returns the initial parameter values of starting set `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::ParameterSetOutOfRange`] if `index` does not
    /// name a starting value set.
    pub fn initial_params(&self, index: usize) -> Result<Vec<f64>, ProblemError> {
        self.starting_values
            .get(index)
            .map(ParameterSet::values)
            .ok_or(ProblemError::ParameterSetOutOfRange {
                index,
                len: self.starting_values.len(),
            })
    }

    /// Formats parameter values with their names, e.g. `"a=1, b=2.5"`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::ParameterCount`] if `params` does not have one
    /// value per named parameter.
    pub fn get_function_params(&self, params: &[f64]) -> Result<String, ProblemError> {
        let expected = self.param_count();
        if params.len() != expected {
            return Err(ProblemError::ParameterCount {
                expected,
                actual: params.len(),
            });
        }
        let parts: Vec<String> = self
            .param_names()
            .zip(params)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Ok(parts.join(", "))
    }

    /// Checks that the problem is complete enough to benchmark.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProblemError`] found: missing or inconsistent
    /// starting values, missing or mismatched data, or a missing function.
    pub fn verify(&self) -> Result<(), ProblemError> {
        let first = self
            .starting_values
            .first()
            .ok_or(ProblemError::NoStartingValues)?;
        if let Some(index) = self
            .starting_values
            .iter()
            .position(|set| !set.same_names(first))
        {
            return Err(ProblemError::InconsistentParameters { index });
        }

        if self.data_x.is_empty() {
            return Err(ProblemError::MissingData { field: "data_x" });
        }
        if self.data_y.is_empty() {
            return Err(ProblemError::MissingData { field: "data_y" });
        }
        self.data().check_lengths()?;

        if self.function.is_none() {
            return Err(ProblemError::MissingFunction);
        }
        Ok(())
    }

    pub(crate) fn function(&self) -> Result<&dyn FitFunction, ProblemError> {
        self.function.as_deref().ok_or(ProblemError::MissingFunction)
    }
}

impl fmt::Debug for FittingProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittingProblem")
            .field("name", &self.name)
            .field("equation", &self.equation)
            .field("points", &self.data_x.len())
            .field("has_errors", &self.data_e.is_some())
            .field("has_function", &self.function.is_some())
            .field("starting_values", &self.starting_values)
            .field("start_x", &self.start_x)
            .field("end_x", &self.end_x)
            .field("corrected", &self.corrected)
            .finish_non_exhaustive()
    }
}
