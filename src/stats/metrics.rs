//! Statistics for a Live Link interface

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters, updated from the producer thread and the monitor task
#[derive(Debug)]
pub struct PublishStats {
    started_at: Instant,
    frames_queued: AtomicU64,
    dropped_not_connected: AtomicU64,
    dropped_queue_full: AtomicU64,
    frames_rejected: AtomicU64,
    schemas_advertised: AtomicU64,
    schemas_replayed: AtomicU64,
    connects: AtomicU64,
    disconnects: AtomicU64,
}

impl PublishStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            frames_queued: AtomicU64::new(0),
            dropped_not_connected: AtomicU64::new(0),
            dropped_queue_full: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            schemas_advertised: AtomicU64::new(0),
            schemas_replayed: AtomicU64::new(0),
            connects: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
        }
    }

    pub(crate) fn frame_queued(&self) {
        self.frames_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped_not_connected(&self) {
        self.dropped_not_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped_queue_full(&self) {
        self.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn schema_advertised(&self) {
        self.schemas_advertised.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connected(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn disconnected(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn schemas_replayed(&self, count: u64) {
        self.schemas_replayed.fetch_add(count, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed(),
            frames_queued: self.frames_queued.load(Ordering::Relaxed),
            dropped_not_connected: self.dropped_not_connected.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            schemas_advertised: self.schemas_advertised.load(Ordering::Relaxed),
            schemas_replayed: self.schemas_replayed.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
        }
    }
}

impl Default for PublishStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Interface-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Time since the stats were created
    pub uptime: Duration,
    /// Frames handed to the transport queue
    pub frames_queued: u64,
    /// Frames dropped because no consumer was connected
    pub dropped_not_connected: u64,
    /// Frames dropped because the queue was full
    pub dropped_queue_full: u64,
    /// Frames rejected by validation (unregistered subject, role mismatch)
    pub frames_rejected: u64,
    /// Schemas sent on registration while connected
    pub schemas_advertised: u64,
    /// Schemas re-sent on connection
    pub schemas_replayed: u64,
    /// Transitions into connected
    pub connects: u64,
    /// Transitions out of connected
    pub disconnects: u64,
}

impl StatsSnapshot {
    /// Total frames dropped for any reason
    pub fn frames_dropped(&self) -> u64 {
        self.dropped_not_connected + self.dropped_queue_full + self.frames_rejected
    }

    /// Frames queued per second of uptime
    pub fn frame_rate(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs > 0.0 {
            self.frames_queued as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PublishStats::new();
        stats.frame_queued();
        stats.frame_queued();
        stats.frame_dropped_not_connected();
        stats.frame_rejected();
        stats.schemas_replayed(3);
        stats.connected();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_queued, 2);
        assert_eq!(snap.frames_dropped(), 2);
        assert_eq!(snap.schemas_replayed, 3);
        assert_eq!(snap.connects, 1);
        assert_eq!(snap.disconnects, 0);
    }

    #[test]
    fn test_frame_rate_zero_uptime() {
        let snap = StatsSnapshot::default();
        assert_eq!(snap.frame_rate(), 0.0);
    }
}
