use tracing::debug;

use super::FittingProblem;

/// Errors below this magnitude are replaced when synthesizing from `y`.
const MIN_SYNTHETIC_ERROR: f64 = 1.0e-8;

impl FittingProblem {
    /// Prepares the data for fitting. Runs at most once per problem.
    ///
    /// - Keeps only points with `start_x <= x <= end_x` (either bound may be
    ///   absent), preserving their original order.
    /// - Records [`sorted_index`](Self::sorted_index), the indices that order
    ///   the retained x values ascending.
    /// - With `use_errors`, synthesizes `e = sqrt(|y|)` when no errors were
    ///   provided, substituting `1` for values below `1e-8`. Without
    ///   `use_errors`, discards any errors so residuals are unweighted.
    ///
    /// Later calls are ignored so the data is never trimmed twice.
    pub fn correct_data(&mut self, use_errors: bool) {
        if self.corrected {
            debug!(problem = %self.name, "data already corrected, skipping");
            return;
        }

        let (start, end) = (self.start_x, self.end_x);
        if start.is_some() || end.is_some() {
            let keep: Vec<usize> = self
                .data_x
                .iter()
                .enumerate()
                .filter(|&(_, &x)| start.is_none_or(|s| x >= s) && end.is_none_or(|e| x <= e))
                .map(|(i, _)| i)
                .collect();

            let pick = |values: &[f64]| -> Vec<f64> {
                keep.iter().filter_map(|&i| values.get(i).copied()).collect()
            };
            self.data_x = pick(&self.data_x);
            self.data_y = pick(&self.data_y);
            self.data_e = self.data_e.as_deref().map(pick);
        }

        let mut order: Vec<usize> = (0..self.data_x.len()).collect();
        order.sort_by(|&a, &b| self.data_x[a].total_cmp(&self.data_x[b]));
        self.sorted_index = Some(order);

        if use_errors {
            if self.data_e.is_none() {
                let synthetic = self
                    .data_y
                    .iter()
                    .map(|y| {
                        let e = y.abs().sqrt();
                        if e < MIN_SYNTHETIC_ERROR { 1.0 } else { e }
                    })
                    .collect();
                self.data_e = Some(synthetic);
            }
        } else {
            self.data_e = None;
        }

        debug!(
            problem = %self.name,
            points = self.data_x.len(),
            weighted = self.data_e.is_some(),
            "corrected problem data"
        );
        self.corrected = true;
    }
}
