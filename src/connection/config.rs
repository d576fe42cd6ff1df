//! Interface configuration

use std::time::Duration;

/// Live Link interface configuration options
#[derive(Debug, Clone)]
pub struct LiveLinkConfig {
    /// Producer command queue depth; frames beyond it are dropped
    pub queue_capacity: usize,

    /// Longest `uninitialize` waits for the background monitor
    pub shutdown_timeout: Duration,

    /// Name of the background worker thread
    pub thread_name: String,
}

impl Default for LiveLinkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            shutdown_timeout: Duration::from_secs(1),
            thread_name: "livelink-worker".to_string(),
        }
    }
}

impl LiveLinkConfig {
    /// Set command queue depth
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set shutdown timeout
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Set worker thread name
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
