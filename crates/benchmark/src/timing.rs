use tracing::warn;

/// Max-to-min repeat time ratio above which timings are flagged.
pub const RATIO_TOLERANCE: f64 = 4.0;

/// Wall times, in seconds, of repeated runs of one minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatTimings {
    seconds: Vec<f64>,
}

impl RepeatTimings {
    #[must_use]
    pub fn new(seconds: Vec<f64>) -> Self {
        Self { seconds }
    }

    #[must_use]
    pub fn seconds(&self) -> &[f64] {
        &self.seconds
    }

    /// Arithmetic mean of the repeats, or `+∞` when there are none.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.seconds.is_empty() {
            return f64::INFINITY;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.seconds.len() as f64;
        self.seconds.iter().sum::<f64>() / count
    }

    /// Ratio of the slowest to the fastest repeat.
    #[must_use]
    pub fn max_min_ratio(&self) -> Option<f64> {
        let min = self.seconds.iter().copied().reduce(f64::min)?;
        let max = self.seconds.iter().copied().reduce(f64::max)?;
        Some(max / min)
    }

    /// Warns when the repeats vary by more than `tolerance`.
    ///
    /// Returns the offending ratio, which usually indicates timing noise or
    /// caching rather than the cost of a single run.
    pub fn check_ratio(&self, tolerance: f64) -> Option<f64> {
        let ratio = self.max_min_ratio().filter(|ratio| *ratio > tolerance)?;
        warn!(
            ratio,
            tolerance,
            "slowest run took {ratio:.1} times longer than the fastest; timings may be unreliable"
        );
        Some(ratio)
    }
}
