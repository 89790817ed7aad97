/// Errors that stop a least-squares solve.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// The problem failed to evaluate residuals or the Jacobian.
    #[error("problem evaluation failed")]
    Problem(#[source] E),

    /// The starting point produced a non-finite cost.
    #[error("cost is not finite at the starting parameters")]
    NonFiniteStart,

    /// A search step or bracket was not finite.
    #[error("search step is not finite")]
    NonFiniteStep,

    /// The Jacobian shape does not match the residuals and parameters.
    #[error("jacobian is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    JacobianShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
}
