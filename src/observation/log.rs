//! Append-only observation log with a consumption baseline.
//!
//! # Responsibilities
//! - Record observations (captured requests, relay payloads) in arrival order
//! - Track how many observations the last successful wait consumed
//!
//! # Design Decisions
//! - The log is never truncated; the baseline only moves forward
//! - The baseline is advanced by `take_new_observation` alone

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Ordered log shared between the producer (dispatcher or relay) and waiters.
#[derive(Debug)]
pub struct CaptureLog<T> {
    entries: Mutex<Vec<T>>,
    baseline: AtomicUsize,
}

impl<T: Clone> CaptureLog<T> {
    /// Create an empty log with a zero baseline.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            baseline: AtomicUsize::new(0),
        }
    }

    /// Append an observation.
    pub fn push(&self, entry: T) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Number of observations recorded so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Log length at the last successful wait.
    pub fn baseline(&self) -> usize {
        self.baseline.load(Ordering::SeqCst)
    }

    /// Consume new observations if any arrived since the last success.
    ///
    /// Succeeds when the log is non-empty and the baseline is still zero, or
    /// when the log has grown past a non-zero baseline. On success the
    /// baseline becomes the current length, so observations that arrived
    /// together are consumed together.
    pub fn take_new_observation(&self) -> bool {
        let count = self.len();
        let baseline = self.baseline();
        let fresh = (baseline == 0 && count > 0) || (baseline > 0 && baseline < count);
        if fresh {
            self.baseline.store(count, Ordering::SeqCst);
        }
        fresh
    }
}

impl<T: Clone> Default for CaptureLog<T> {
    fn default() -> Self {
        Self::new()
    }
}
