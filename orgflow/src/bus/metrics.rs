//! Delivery metrics for the event bus.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for notification delivery outcomes.
///
/// Dropped counts cover both best-effort global copies and failed direct
/// sends; they are diagnostic only and carry no delivery guarantee.
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Number of notification copies placed into a mailbox.
    delivered: AtomicU64,
    /// Number of notification copies dropped or refused.
    dropped: AtomicU64,
}

impl BusMetrics {
    /// Records a successful delivery of one copy.
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one dropped or refused copy.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of delivered copies.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Returns the number of dropped copies.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the drop rate as a percentage.
    #[must_use]
    pub fn drop_rate(&self) -> f64 {
        let delivered = self.delivered();
        let dropped = self.dropped();
        let total = delivered + dropped;
        if total == 0 {
            0.0
        } else {
            (dropped as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default() {
        let metrics = BusMetrics::default();
        assert_eq!(metrics.delivered(), 0);
        assert_eq!(metrics.dropped(), 0);
        assert_eq!(metrics.drop_rate(), 0.0);
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = BusMetrics::default();

        metrics.record_delivered();
        metrics.record_delivered();
        metrics.record_dropped();

        assert_eq!(metrics.delivered(), 2);
        assert_eq!(metrics.dropped(), 1);
        assert!((metrics.drop_rate() - 33.333).abs() < 1.0);
    }
}
