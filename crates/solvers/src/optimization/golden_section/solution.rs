/// Whether the search converged or ran out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The interior points are within the configured tolerance.
    Converged,

    /// Reached the iteration limit first.
    MaxIters,
}

/// The result of a golden section search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub status: Status,

    /// Best x found.
    pub x: f64,

    /// Objective at `x`.
    pub objective: f64,

    /// Number of bracket reductions performed.
    pub iters: usize,
}
