//! Connection state machine
//!
//! ```text
//!  Uninitialized ──initialize──► Initializing ──link up──► Connected
//!        ▲                            │                     │    ▲
//!        │                        link down            link down │
//!        │                            ▼                     ▼    │
//!        └────────uninitialize──── Disconnected ◄───────────┘  link up
//! ```
//!
//! Any state returns to `Uninitialized` on uninitialize.

use std::sync::atomic::{AtomicU8, Ordering};

/// Connection lifecycle state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// No interface running
    Uninitialized = 0,
    /// Interface running, no consumer seen yet
    Initializing = 1,
    /// A consumer is reachable
    Connected = 2,
    /// The consumer was lost
    Disconnected = 3,
}

impl LinkState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LinkState::Initializing,
            2 => LinkState::Connected,
            3 => LinkState::Disconnected,
            _ => LinkState::Uninitialized,
        }
    }

    /// Whether this state reports a live connection
    pub fn is_connected(self) -> bool {
        self == LinkState::Connected
    }

    /// Whether the interface is running
    pub fn is_initialized(self) -> bool {
        self != LinkState::Uninitialized
    }

    /// State after a link-up event, or `None` if the event is ignored
    pub fn on_link_up(self) -> Option<LinkState> {
        match self {
            LinkState::Initializing | LinkState::Disconnected => Some(LinkState::Connected),
            LinkState::Connected | LinkState::Uninitialized => None,
        }
    }

    /// State after a link-down event, or `None` if the event is ignored
    pub fn on_link_down(self) -> Option<LinkState> {
        match self {
            LinkState::Initializing | LinkState::Connected => Some(LinkState::Disconnected),
            LinkState::Disconnected | LinkState::Uninitialized => None,
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LinkState::Uninitialized => "uninitialized",
            LinkState::Initializing => "initializing",
            LinkState::Connected => "connected",
            LinkState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Atomic cell holding a [`LinkState`]
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: LinkState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> LinkState {
        LinkState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Unconditionally set the state, returning the previous one
    pub fn swap(&self, state: LinkState) -> LinkState {
        LinkState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }

    /// Apply a transition computed from the current state
    ///
    /// Returns `(from, to)` when the state changed. A concurrent uninitialize
    /// always wins: transitions are never applied out of `Uninitialized`.
    pub fn transition<F>(&self, next: F) -> Option<(LinkState, LinkState)>
    where
        F: Fn(LinkState) -> Option<LinkState>,
    {
        let mut current = self.load();
        loop {
            let to = next(current)?;
            match self.0.compare_exchange(
                current as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some((current, to)),
                Err(raw) => current = LinkState::from_u8(raw),
            }
        }
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(LinkState::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_up_transitions() {
        assert_eq!(LinkState::Initializing.on_link_up(), Some(LinkState::Connected));
        assert_eq!(LinkState::Disconnected.on_link_up(), Some(LinkState::Connected));
        assert_eq!(LinkState::Connected.on_link_up(), None);
        assert_eq!(LinkState::Uninitialized.on_link_up(), None);
    }

    #[test]
    fn test_link_down_transitions() {
        assert_eq!(LinkState::Initializing.on_link_down(), Some(LinkState::Disconnected));
        assert_eq!(LinkState::Connected.on_link_down(), Some(LinkState::Disconnected));
        assert_eq!(LinkState::Disconnected.on_link_down(), None);
        assert_eq!(LinkState::Uninitialized.on_link_down(), None);
    }

    #[test]
    fn test_cell_transition() {
        let cell = StateCell::new(LinkState::Initializing);

        let changed = cell.transition(LinkState::on_link_up);
        assert_eq!(changed, Some((LinkState::Initializing, LinkState::Connected)));
        assert!(cell.load().is_connected());

        // Repeated link up is ignored
        assert_eq!(cell.transition(LinkState::on_link_up), None);
        assert_eq!(cell.load(), LinkState::Connected);
    }

    #[test]
    fn test_uninitialized_is_sticky() {
        let cell = StateCell::default();
        assert_eq!(cell.transition(LinkState::on_link_up), None);
        assert_eq!(cell.transition(LinkState::on_link_down), None);
        assert!(!cell.load().is_initialized());

        assert_eq!(cell.swap(LinkState::Initializing), LinkState::Uninitialized);
        assert_eq!(cell.load(), LinkState::Initializing);
    }
}
