use fitbench_core::LeastSquaresProblem;

use crate::optimization::golden_section;

use super::Error;

/// The best point found along a search direction.
pub(super) struct LineMinimum {
    pub(super) params: Vec<f64>,
    pub(super) cost: f64,
}

/// Minimizes the cost along `base + t * direction` for `t` in `bracket`.
///
/// Returns `None` if no point along the line improves on `base_cost`.
pub(super) fn minimize_along<P: LeastSquaresProblem>(
    problem: &P,
    base: &[f64],
    base_cost: f64,
    direction: &[f64],
    bracket: [f64; 2],
    config: &golden_section::Config,
) -> Result<Option<LineMinimum>, Error<P::Error>> {
    let point = |t: f64| -> Vec<f64> {
        base.iter()
            .zip(direction)
            .map(|(p, d)| p + t * d)
            .collect()
    };

    let found = golden_section::minimize(|t| problem.cost(&point(t)), bracket, config)
        .map_err(|err| match err {
            golden_section::Error::Objective { source, .. } => Error::Problem(source),
            golden_section::Error::NonFiniteBracket { .. } => Error::NonFiniteStep,
        })?;

    if found.objective < base_cost {
        Ok(Some(LineMinimum {
            params: point(found.x),
            cost: found.objective,
        }))
    } else {
        Ok(None)
    }
}
