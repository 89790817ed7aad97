/// A model function `y = f(x; p)` evaluated one point at a time.
///
/// Any `Fn(f64, &[f64]) -> f64` closure that is `Send + Sync` implements this
/// trait, so problems can be defined inline:
///
/// ```
/// use std::sync::Arc;
/// use fitbench_core::FitFunction;
///
/// let line: Arc<dyn FitFunction> = Arc::new(|x: f64, p: &[f64]| p[0] + p[1] * x);
/// assert_eq!(line.eval(2.0, &[1.0, 3.0]), 7.0);
/// ```
pub trait FitFunction: Send + Sync {
    /// Evaluates the model at `x` with parameters `params`.
    fn eval(&self, x: f64, params: &[f64]) -> f64;
}

impl<F> FitFunction for F
where
    F: Fn(f64, &[f64]) -> f64 + Send + Sync,
{
    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        self(x, params)
    }
}
