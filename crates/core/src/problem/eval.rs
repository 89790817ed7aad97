use nalgebra::{DMatrix, DVector};

use crate::{DataSlice, LeastSquaresProblem, ProblemError};

use super::FittingProblem;

impl FittingProblem {
    /// Evaluates the model at every x value.
    ///
    /// Uses the problem's own `data_x` when `x` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::MissingFunction`] if no function is set.
    pub fn eval_f(&self, params: &[f64], x: Option<&[f64]>) -> Result<Vec<f64>, ProblemError> {
        let function = self.function()?;
        let x = x.unwrap_or(&self.data_x);
        Ok(x.iter().map(|&xi| function.eval(xi, params)).collect())
    }

    /// Evaluates the residuals `(y - f(x; p)) / e`.
    ///
    /// The division by `e` only happens when errors are present. Uses the
    /// problem's own data when `data` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if no function is set or the data lengths differ.
    pub fn eval_r(
        &self,
        params: &[f64],
        data: Option<DataSlice<'_>>,
    ) -> Result<Vec<f64>, ProblemError> {
        let data = data.unwrap_or_else(|| self.data());
        data.check_lengths()?;
        let fitted = self.eval_f(params, Some(data.x))?;

        let residuals = fitted.iter().zip(data.y).map(|(f, y)| y - f);
        Ok(match data.e {
            Some(e) => residuals.zip(e).map(|(r, e)| r / e).collect(),
            None => residuals.collect(),
        })
    }

    /// Evaluates chi-squared: the sum of squared (weighted) residuals.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be evaluated.
    pub fn eval_r_norm(
        &self,
        params: &[f64],
        data: Option<DataSlice<'_>>,
    ) -> Result<f64, ProblemError> {
        let residuals = self.eval_r(params, data)?;
        Ok(residuals.iter().map(|r| r * r).sum())
    }

    /// Approximates the `m x n` Jacobian of the residuals by central differences.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be evaluated.
    pub fn eval_j(
        &self,
        params: &[f64],
        data: Option<DataSlice<'_>>,
    ) -> Result<DMatrix<f64>, ProblemError> {
        let data = data.unwrap_or_else(|| self.data());
        let rows = data.len();
        let mut jacobian = DMatrix::zeros(rows, params.len());
        let mut shifted = params.to_vec();

        for (col, &p) in params.iter().enumerate() {
            let step = f64::EPSILON.cbrt() * p.abs().max(1.0);

            shifted[col] = p + step;
            let forward = self.eval_r(&shifted, Some(data))?;
            shifted[col] = p - step;
            let backward = self.eval_r(&shifted, Some(data))?;
            shifted[col] = p;

            for (row, (f, b)) in forward.iter().zip(&backward).enumerate() {
                jacobian[(row, col)] = (f - b) / (2.0 * step);
            }
        }
        Ok(jacobian)
    }

    /// Evaluates the model at the problem's x data using starting set `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or no function is set.
    pub fn eval_starting_params(&self, index: usize) -> Result<Vec<f64>, ProblemError> {
        self.function()?;
        let params = self.initial_params(index)?;
        self.eval_f(&params, None)
    }
}

impl LeastSquaresProblem for FittingProblem {
    type Error = ProblemError;

    fn residuals(&self, params: &[f64]) -> Result<DVector<f64>, Self::Error> {
        Ok(DVector::from_vec(self.eval_r(params, None)?))
    }

    fn jacobian(&self, params: &[f64]) -> Result<DMatrix<f64>, Self::Error> {
        self.eval_j(params, None)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::ParameterSet;

    fn offset_problem() -> FittingProblem {
        FittingProblem::new("offset").with_function(|x: f64, p: &[f64]| x + p[0])
    }

    #[test]
    fn eval_f_needs_a_function() {
        let problem = FittingProblem::default();
        assert_eq!(
            problem.eval_f(&[1.0, 2.0, 3.0], Some(&[2.0])),
            Err(ProblemError::MissingFunction)
        );
    }

    #[test]
    fn eval_f_uses_given_or_stored_x() {
        let mut problem = offset_problem();
        assert_eq!(
            problem.eval_f(&[5.0], Some(&[1.0, 8.0, 11.0])).unwrap(),
            [6.0, 13.0, 16.0]
        );

        problem.data_x = vec![20.0, 21.0, 22.0];
        assert_eq!(problem.eval_f(&[5.0], None).unwrap(), [25.0, 26.0, 27.0]);
    }

    #[test]
    fn eval_r_weights_by_errors() {
        let mut problem = offset_problem();
        let x = [1.0, 8.0, 11.0];
        let y = [6.0, 10.0, 20.0];

        let r = problem.eval_r(&[5.0], Some(DataSlice::new(&x, &y))).unwrap();
        assert_eq!(r, [0.0, -3.0, 4.0]);

        let e = [2.0, 4.0, 1.0];
        let r = problem
            .eval_r(&[5.0], Some(DataSlice::new(&x, &y).with_errors(&e)))
            .unwrap();
        assert_eq!(r, [0.0, -0.75, 4.0]);

        problem.data_x = vec![20.0, 21.0, 22.0];
        problem.data_y = vec![20.0, 30.0, 35.0];
        assert_eq!(problem.eval_r(&[5.0], None).unwrap(), [-5.0, 4.0, 8.0]);

        problem.data_e = Some(vec![2.0, 5.0, 10.0]);
        assert_eq!(problem.eval_r(&[5.0], None).unwrap(), [-2.5, 0.8, 0.8]);
    }

    #[test]
    fn eval_r_norm_is_sum_of_squares() {
        let mut problem = offset_problem();
        let x = [1.0, 8.0, 11.0];
        let y = [6.0, 10.0, 20.0];
        let e = [0.5, 10.0, 0.1];

        let chisq = problem
            .eval_r_norm(&[5.0], Some(DataSlice::new(&x, &y).with_errors(&e)))
            .unwrap();
        assert_relative_eq!(chisq, 1600.09, max_relative = 1e-12);

        problem.data_x = x.to_vec();
        problem.data_y = y.to_vec();
        assert_relative_eq!(problem.eval_r_norm(&[5.0], None).unwrap(), 25.0);
    }

    #[test]
    fn eval_r_norm_is_repeatable() {
        let problem = offset_problem().with_data(vec![0.1, 0.7, 1.3], vec![3.3, 0.2, 9.1]);
        let first = problem.eval_r_norm(&[0.37], None).unwrap();
        let second = problem.eval_r_norm(&[0.37], None).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn eval_j_matches_analytic_jacobian() {
        let problem = FittingProblem::new("exp")
            .with_function(|x: f64, p: &[f64]| p[0] * (p[1] * x).exp())
            .with_data(
                vec![1.0, 2.0, 3.0, 4.0, 5.0],
                vec![1.0, 2.0, 4.0, 8.0, 16.0],
            );
        let params = [6.0, 0.1];

        let jacobian = problem.eval_j(&params, None).unwrap();

        assert_eq!(jacobian.shape(), (5, 2));
        for (row, x) in problem.data_x.iter().enumerate() {
            let growth = (params[1] * x).exp();
            assert_relative_eq!(jacobian[(row, 0)], -growth, max_relative = 1e-7);
            assert_relative_eq!(
                jacobian[(row, 1)],
                -x * params[0] * growth,
                max_relative = 1e-7
            );
        }
    }

    #[test]
    fn eval_starting_params_uses_selected_set() {
        let mut problem = FittingProblem::default();
        assert_eq!(
            problem.eval_starting_params(0),
            Err(ProblemError::MissingFunction)
        );

        problem = offset_problem()
            .with_data(vec![1.0], vec![0.0])
            .with_starting_values(ParameterSet::new().with("p1", 3.0))
            .with_starting_values(ParameterSet::new().with("p1", 7.0));

        assert_eq!(problem.eval_starting_params(0).unwrap(), [4.0]);
        assert_eq!(problem.eval_starting_params(1).unwrap(), [8.0]);
    }
}
