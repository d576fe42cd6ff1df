//! Connection lifecycle
//!
//! Tracks whether a consumer is reachable, replays registered schemas when
//! one connects, and notifies the producer when reachability changes.

pub mod config;
pub mod manager;
pub mod observer;
pub mod state;

pub use config::LiveLinkConfig;
pub use manager::{Command, ConnectionManager, Dispatch, DropReason};
pub use observer::{ConnectionCallback, Observer};
pub use state::{LinkState, StateCell};
