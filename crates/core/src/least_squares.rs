use nalgebra::{DMatrix, DVector};

/// A nonlinear least-squares problem over `n` parameters and `m` residuals.
///
/// Solvers minimize `‖r(p)‖²`, the sum of squared residuals.
pub trait LeastSquaresProblem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the residual vector `r(p)` of length `m`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residuals cannot be evaluated at `params`.
    fn residuals(&self, params: &[f64]) -> Result<DVector<f64>, Self::Error>;

    /// Computes the `m x n` Jacobian `∂r/∂p`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the Jacobian cannot be evaluated at `params`.
    fn jacobian(&self, params: &[f64]) -> Result<DMatrix<f64>, Self::Error>;

    /// Computes the sum of squared residuals.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residuals cannot be evaluated.
    fn cost(&self, params: &[f64]) -> Result<f64, Self::Error> {
        Ok(self.residuals(params)?.norm_squared())
    }
}
