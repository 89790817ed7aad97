use std::{cell::RefCell, sync::Arc};

use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use fitbench_core::FittingProblem;

/// Chi-squared of a fitting problem as an argmin cost.
pub(super) struct ChiSquared {
    problem: Arc<FittingProblem>,
}

impl ChiSquared {
    pub(super) fn new(problem: Arc<FittingProblem>) -> Self {
        Self { problem }
    }
}

impl CostFunction for ChiSquared {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.problem.eval_r_norm(params, None)?)
    }
}

impl Gradient for ChiSquared {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    /// Central differences of the cost.
    ///
    /// The difference closure cannot fail, so the first cost error is held
    /// aside and returned once differencing finishes.
    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, Error> {
        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let cost = |p: &Vec<f64>| -> f64 {
            self.cost(p).unwrap_or_else(|err| {
                failure.borrow_mut().get_or_insert(err);
                f64::NAN
            })
        };

        let gradient = params.central_diff(&cost);
        match failure.into_inner() {
            Some(err) => Err(err),
            None => Ok(gradient),
        }
    }
}
