use crate::ProblemError;

/// Borrowed x/y data with optional per-point errors.
///
/// Used to evaluate a problem's residuals against data other than the data
/// stored on the problem itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataSlice<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub e: Option<&'a [f64]>,
}

impl<'a> DataSlice<'a> {
    /// Creates unweighted data.
    #[must_use]
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        Self { x, y, e: None }
    }

    /// Attaches per-point errors used to weight the residuals.
    #[must_use]
    pub fn with_errors(self, e: &'a [f64]) -> Self {
        Self { e: Some(e), ..self }
    }

    /// Returns the number of data points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` if there are no data points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Checks that `y` and `e` (if present) match the length of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::LengthMismatch`] on the first mismatched field.
    pub fn check_lengths(&self) -> Result<(), ProblemError> {
        let expected = self.x.len();
        if self.y.len() != expected {
            return Err(ProblemError::LengthMismatch {
                field: "data_y",
                expected,
                actual: self.y.len(),
            });
        }
        if let Some(e) = self.e {
            if e.len() != expected {
                return Err(ProblemError::LengthMismatch {
                    field: "data_e",
                    expected,
                    actual: e.len(),
                });
            }
        }
        Ok(())
    }
}
