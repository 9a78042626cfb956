//! Barrier Statistics - Write Barrier Monitoring
//!
//! Counters for barriered reference stores. Used for:
//! - Debugging barrier participation
//! - Estimating barrier pressure per workload
//!
//! Metrics tracked:
//! - Total barrier invocations
//! - Stores of the null object
//! - Self references (holder stores a reference to itself)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// WriteBarrierStats - snapshot of write barrier counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteBarrierStats {
    /// Total barrier invocations
    pub total_invocations: u64,
    /// Stores of the null object
    pub null_stores: u64,
    /// Stores where the value is the holder itself
    pub self_references: u64,
}

impl WriteBarrierStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge stats from another source (for aggregation across threads)
    #[inline]
    pub fn merge(&mut self, other: &WriteBarrierStats) {
        self.total_invocations += other.total_invocations;
        self.null_stores += other.null_stores;
        self.self_references += other.self_references;
    }

    /// Stores of a non-null reference
    #[inline]
    pub fn reference_stores(&self) -> u64 {
        self.total_invocations - self.null_stores
    }

    /// Null store rate (percentage)
    pub fn null_store_rate(&self) -> f64 {
        if self.total_invocations == 0 {
            0.0
        } else {
            (self.null_stores as f64 / self.total_invocations as f64) * 100.0
        }
    }
}

/// AtomicWriteBarrierStats - thread-safe counters
///
/// Relaxed increments only, so recording is safe from uninterruptible code.
#[derive(Debug)]
pub struct AtomicWriteBarrierStats {
    total_invocations: AtomicU64,
    null_stores: AtomicU64,
    self_references: AtomicU64,
}

impl AtomicWriteBarrierStats {
    #[inline]
    pub const fn new() -> Self {
        Self {
            total_invocations: AtomicU64::new(0),
            null_stores: AtomicU64::new(0),
            self_references: AtomicU64::new(0),
        }
    }

    /// Record barrier invocation
    #[inline(always)]
    pub fn record_invocation(&self) {
        self.total_invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record store of the null object
    #[inline(always)]
    pub fn record_null(&self) {
        self.null_stores.fetch_add(1, Ordering::Relaxed);
    }

    /// Record self reference
    #[inline(always)]
    pub fn record_self_reference(&self) {
        self.self_references.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> WriteBarrierStats {
        WriteBarrierStats {
            total_invocations: self.total_invocations.load(Ordering::Relaxed),
            null_stores: self.null_stores.load(Ordering::Relaxed),
            self_references: self.self_references.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.total_invocations.store(0, Ordering::Relaxed);
        self.null_stores.store(0, Ordering::Relaxed);
        self.self_references.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn total_invocations(&self) -> u64 {
        self.total_invocations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn null_store_count(&self) -> u64 {
        self.null_stores.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn self_reference_count(&self) -> u64 {
        self.self_references.load(Ordering::Relaxed)
    }
}

impl Default for AtomicWriteBarrierStats {
    fn default() -> Self {
        Self::new()
    }
}
