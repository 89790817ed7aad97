//! Process-wide exclusive access to the fitting engines.
//!
//! Some engines keep global state, and repeat timings assume no other fit is
//! running. The driver holds an [`EngineScope`] from the first `prepare()` of
//! a minimizer until its `cleanup()`, so two fits never interleave.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

static ENGINES: Mutex<()> = Mutex::new(());

/// Exclusive use of the engines, released on drop.
#[derive(Debug)]
pub struct EngineScope {
    software: String,
    _guard: MutexGuard<'static, ()>,
}

impl EngineScope {
    /// Blocks until no other scope is held.
    ///
    /// A lock poisoned by a panicking holder is recovered, since the guarded
    /// state is owned by each controller rather than by the lock.
    #[must_use]
    pub fn acquire(software: &str) -> Self {
        let guard = ENGINES.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(software, "acquired engine scope");
        Self {
            software: software.to_owned(),
            _guard: guard,
        }
    }

    #[must_use]
    pub fn software(&self) -> &str {
        &self.software
    }
}

impl Drop for EngineScope {
    fn drop(&mut self) {
        debug!(software = %self.software, "released engine scope");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
    };

    use super::*;

    #[test]
    fn scopes_are_exclusive() {
        static INSIDE: AtomicBool = AtomicBool::new(false);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _scope = EngineScope::acquire(&format!("worker-{i}"));
                        assert!(!INSIDE.swap(true, Ordering::SeqCst));
                        INSIDE.store(false, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker finished");
        }
    }

    #[test]
    fn recovers_from_poison() {
        let _ = thread::spawn(|| {
            let _scope = EngineScope::acquire("panicking");
            panic!("engine blew up");
        })
        .join();

        let scope = EngineScope::acquire("after");
        assert_eq!(scope.software(), "after");
    }
}
