/// How a least-squares solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The last step was within the configured tolerance.
    Converged,

    /// Reached the iteration limit before converging.
    MaxIters,

    /// Could not make further progress and did not meet the tolerance.
    Stalled,
}

/// The result of a least-squares solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: Status,

    /// Best parameters found.
    pub params: Vec<f64>,

    /// Sum of squared residuals at `params`.
    pub cost: f64,

    /// Number of completed iterations.
    pub iters: usize,
}
