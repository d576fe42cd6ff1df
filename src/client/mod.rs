//! Producer-side client
//!
//! Provides the [`LiveLink`] interface a producer application drives:
//! - Lifecycle: initialize, uninitialize, connection queries and callback
//! - Subject declaration for every role
//! - Per-frame updates for every role

pub mod interface;

pub use interface::LiveLink;
