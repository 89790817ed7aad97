/// Errors that can occur during golden section search.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("bracket contains non-finite value: {value}")]
    NonFiniteBracket { value: f64 },

    #[error("objective failed at x = {x}")]
    Objective {
        x: f64,
        #[source]
        source: E,
    },
}
