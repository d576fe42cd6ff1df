//! Reconnect backoff
//!
//! The delay for attempt `n` is `first × factor^n`, clamped to `max`. Each
//! attempt derives its delay from the attempt number alone.

use std::time::Duration;

/// Reconnect delay policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first reconnect attempt
    pub first: Duration,
    /// Upper bound on any delay
    pub max: Duration,
    /// Growth factor per attempt
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(5),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
        }
    }

    /// Delay for the given attempt (0-indexed)
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_growth() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(3), Duration::from_millis(800));
    }

    #[test]
    fn test_capped_at_max() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(10), Duration::from_secs(5));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_constant() {
        let policy = BackoffPolicy::constant(Duration::from_millis(50));
        assert_eq!(policy.next(0), Duration::from_millis(50));
        assert_eq!(policy.next(7), Duration::from_millis(50));
    }
}
