//! Stale-result protection for views.
//!
//! A view captures a [`ViewScope`] when it is mounted. Every navigation bumps
//! the navigator's generation, so a response that resolves after the user
//! moved on is recognised and dropped instead of being applied to a view that
//! is no longer on screen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The generation a view was mounted in.
#[derive(Debug, Clone)]
pub struct ViewScope {
    generation: u64,
    current: Arc<AtomicU64>,
    path: String,
}

impl ViewScope {
    pub(crate) fn new(current: Arc<AtomicU64>, path: String) -> Self {
        let generation = current.load(Ordering::Acquire);
        Self {
            generation,
            current,
            path,
        }
    }

    /// Location the view was mounted for.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Generation captured at mount time.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no navigation happened since the view was mounted.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    /// Apply `value` with `apply` if the view is still current.
    ///
    /// Returns `None` (and drops `value`) when the view is stale.
    pub fn apply<T, R>(&self, value: T, apply: impl FnOnce(T) -> R) -> Option<R> {
        if self.is_current() {
            Some(apply(value))
        } else {
            tracing::debug!(
                path = %self.path,
                mounted = self.generation,
                current = self.current.load(Ordering::Acquire),
                "Dropping result for stale view"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_goes_stale_after_bump() {
        let counter = Arc::new(AtomicU64::new(3));
        let scope = ViewScope::new(counter.clone(), "/questionnaire/list".to_string());

        assert!(scope.is_current());
        assert_eq!(scope.apply(2, |n| n * 2), Some(4));

        counter.fetch_add(1, Ordering::AcqRel);

        assert!(!scope.is_current());
        assert_eq!(scope.apply(2, |n| n * 2), None);
        assert_eq!(scope.generation(), 3);
    }
}
