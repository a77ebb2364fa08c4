//! Shipping counters.
//!
//! The counters make the backpressure policy observable: under
//! [`OverflowPolicy::Drop`](crate::OverflowPolicy::Drop) the `dropped` count
//! is the number of records discarded on a full (or closed) queue. Counters
//! are updated with relaxed atomics; a snapshot is a consistent-enough view
//! for monitoring, not a transaction.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal counter set shared between a shipper handle and its worker.
#[derive(Debug, Default)]
pub struct ShipperMetrics {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl ShipperMetrics {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a pipeline's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Records accepted into the queue (log pipeline only).
    pub enqueued: u64,
    /// Records discarded before the transport: full queue under the drop
    /// policy, or any enqueue after shutdown.
    pub dropped: u64,
    /// Records the broker accepted.
    pub delivered: u64,
    /// Records lost to encoding or transport failures.
    pub failed: u64,
}
