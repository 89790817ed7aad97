use std::collections::BTreeMap;

use fitbench_controllers::{SOFTWARE, create_controller};

use crate::OptionsError;

/// Benchmark configuration.
///
/// `minimizers` maps each software name to the minimizers to run. A selected
/// software without an entry is a configuration error at run time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Options {
    software: Vec<String>,
    num_runs: usize,
    use_errors: bool,
    max_iterations: usize,
    minimizers: BTreeMap<String, Vec<String>>,
}

impl Default for Options {
    /// Every available software with all of its minimizers.
    fn default() -> Self {
        let classes: Vec<_> = SOFTWARE
            .iter()
            .filter_map(|software| create_controller(software).ok())
            .collect();

        Self {
            software: classes.iter().map(|c| c.software().to_owned()).collect(),
            minimizers: classes
                .iter()
                .map(|c| {
                    let names = c.minimizers().iter().map(|&m| m.to_owned()).collect();
                    (c.software().to_owned(), names)
                })
                .collect(),
            num_runs: 5,
            use_errors: true,
            max_iterations: fitbench_controllers::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Options {
    /// Creates options for the given software and minimizers.
    ///
    /// Run count, error weighting and the iteration cap take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::NoSoftware`] if `software` is empty.
    pub fn new<S, I>(
        software: I,
        minimizers: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, OptionsError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let options = Self {
            software: software.into_iter().map(Into::into).collect(),
            minimizers,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    /// Sets how many timed repeats each minimizer gets.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::NoRuns`] if `num_runs` is zero.
    pub fn with_num_runs(self, num_runs: usize) -> Result<Self, OptionsError> {
        if num_runs == 0 {
            return Err(OptionsError::NoRuns);
        }
        Ok(Self { num_runs, ..self })
    }

    #[must_use]
    pub fn with_use_errors(self, use_errors: bool) -> Self {
        Self { use_errors, ..self }
    }

    #[must_use]
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Checks options that bypassed the constructor, such as deserialized ones.
    ///
    /// # Errors
    ///
    /// Returns the first [`OptionsError`] found.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.software.is_empty() {
            return Err(OptionsError::NoSoftware);
        }
        if self.num_runs == 0 {
            return Err(OptionsError::NoRuns);
        }
        Ok(())
    }

    #[must_use]
    pub fn software(&self) -> &[String] {
        &self.software
    }

    /// Returns the minimizers configured for `software`, if any.
    #[must_use]
    pub fn minimizers(&self, software: &str) -> Option<&[String]> {
        self.minimizers.get(software).map(Vec::as_slice)
    }

    #[must_use]
    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    #[must_use]
    pub fn use_errors(&self) -> bool {
        self.use_errors
    }

    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}
