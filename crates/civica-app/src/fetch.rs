//! Per-fetch cancellation scopes.
//!
//! Navigating away from a screen must not let an in-flight fetch apply
//! its completion side effect afterwards. A [`FetchScope`] belongs to a
//! mounted screen; each fetch captures a [`FetchGuard`] before awaiting
//! and checks it before touching flow state. Invalidation bumps the
//! scope's generation, which kills every guard captured before it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cancellation scope tied to a screen's lifetime.
#[derive(Debug, Clone, Default)]
pub struct FetchScope {
    generation: Arc<AtomicU64>,
}

impl FetchScope {
    /// Create a live scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a guard for one fetch.
    pub fn guard(&self) -> FetchGuard {
        FetchGuard {
            generation: Arc::clone(&self.generation),
            seen: self.generation.load(Ordering::Acquire),
        }
    }

    /// Invalidate all previously captured guards (screen unmounted or
    /// navigated away). Guards captured afterwards are live again.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Validity token for one fetch.
#[derive(Debug, Clone)]
pub struct FetchGuard {
    generation: Arc<AtomicU64>,
    seen: u64,
}

impl FetchGuard {
    /// Whether the completion side effect may still be applied.
    pub fn is_live(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_live_until_invalidated() {
        let scope = FetchScope::new();
        let guard = scope.guard();
        assert!(guard.is_live());

        scope.invalidate();
        assert!(!guard.is_live());
    }

    #[test]
    fn test_new_guard_after_invalidation_is_live() {
        let scope = FetchScope::new();
        let stale = scope.guard();
        scope.invalidate();

        let fresh = scope.guard();
        assert!(!stale.is_live());
        assert!(fresh.is_live());
    }

    #[test]
    fn test_invalidation_reaches_clones() {
        let scope = FetchScope::new();
        let guard = scope.guard();
        let clone = scope.clone();

        clone.invalidate();
        assert!(!guard.is_live());
    }
}
