use super::{Config, Solution, Status};

/// `1/φ`, the fraction of the bracket kept each iteration.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// An evaluated point, with NaN objectives mapped to `+∞`.
#[derive(Debug, Clone, Copy)]
pub(super) struct Probe {
    x: f64,
    value: f64,
}

impl Probe {
    pub(super) fn new(x: f64, value: f64) -> Self {
        let value = if value.is_nan() { f64::INFINITY } else { value };
        Self { x, value }
    }
}

/// The shrinking bracket and its two interior probes.
///
/// Invariant: `lo <= left.x <= right.x <= hi`.
#[derive(Debug)]
pub(super) struct State {
    lo: f64,
    hi: f64,
    left: Probe,
    right: Probe,
}

impl State {
    pub(super) fn new<E>(
        [a, b]: [f64; 2],
        eval: &mut impl FnMut(f64) -> Result<Probe, E>,
    ) -> Result<Self, E> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let span = hi - lo;
        let left = eval(hi - INV_PHI * span)?;
        let right = eval(lo + INV_PHI * span)?;
        Ok(Self {
            lo,
            hi,
            left,
            right,
        })
    }

    pub(super) fn is_converged(&self, config: &Config) -> bool {
        let mid = 0.5 * (self.lo + self.hi);
        (self.right.x - self.left.x).abs() <= config.abs_tol() + config.rel_tol() * mid.abs()
    }

    /// Drops the part of the bracket beyond the worse probe.
    pub(super) fn step<E>(
        &mut self,
        eval: &mut impl FnMut(f64) -> Result<Probe, E>,
    ) -> Result<(), E> {
        if self.left.value <= self.right.value {
            self.hi = self.right.x;
            self.right = self.left;
            self.left = eval(self.hi - INV_PHI * (self.hi - self.lo))?;
        } else {
            self.lo = self.left.x;
            self.left = self.right;
            self.right = eval(self.lo + INV_PHI * (self.hi - self.lo))?;
        }
        Ok(())
    }

    pub(super) fn into_solution(self, status: Status, iters: usize) -> Solution {
        let best = if self.left.value <= self.right.value {
            self.left
        } else {
            self.right
        };
        Solution {
            status,
            x: best.x,
            objective: best.value,
            iters,
        }
    }
}
