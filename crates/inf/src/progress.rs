use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a long-running sweep.
///
/// Checked between blocks, never pre-empted mid-block. Cloning shares the same
/// underlying flag, so a caller can hold one handle and cancel from another thread
/// while the sweep driver polls [`CancellationToken::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A monotonically increasing block counter an operator publishes as it progresses.
///
/// `total` is `None` when the number of blocks is not known ahead of time (e.g. a
/// cost-distance sweep iterating to convergence).
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicU64,
    total: Option<u64>,
}

impl ProgressCounter {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            completed: AtomicU64::new(0),
            total,
        }
    }

    pub fn advance(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_shared_across_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn progress_counter_advances() {
        let counter = ProgressCounter::new(Some(4));
        assert_eq!(counter.completed(), 0);
        assert_eq!(counter.advance(), 1);
        assert_eq!(counter.advance(), 2);
        assert_eq!(counter.total(), Some(4));
    }
}
