//! Transport links to a consumer
//!
//! A [`Transport`] opens a [`Link`]: an outbound message queue plus a stream
//! of [`LinkEvent`]s reporting when a consumer becomes reachable or is lost.
//! The connection manager only ever talks to this seam, so the same lifecycle
//! logic drives the in-memory bus used by tests and the TCP link.
//!
//! `open` is called from inside the background runtime; implementations may
//! spawn their I/O tasks onto it. Dropping the link's outbound sender closes
//! the link.

pub mod backoff;
pub mod memory;
pub mod tcp;

pub use backoff::BackoffPolicy;
pub use memory::{MemoryPeer, MemoryTransport};
pub use tcp::{TcpConfig, TcpTransport};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::protocol::Message;

/// Reachability change reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A consumer is reachable
    Up,
    /// The consumer was lost
    Down,
}

/// An open link to a consumer
#[derive(Debug)]
pub struct Link {
    /// Messages to deliver, in order
    pub outbound: mpsc::Sender<Message>,
    /// Reachability changes, in order
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
    /// I/O task that finishes once the link has been flushed and closed
    pub task: Option<JoinHandle<()>>,
}

/// Transport error types
#[derive(Debug, Error)]
pub enum TransportError {
    /// `open` was called outside a tokio runtime
    #[error("transport requires a tokio runtime")]
    NoRuntime,

    /// The transport refused to open a link
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// I/O error
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of links to a consumer
pub trait Transport: Send + Sync {
    /// Open a link for the named interface
    fn open(&self, interface: &str) -> Result<Link, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn open(&self, interface: &str) -> Result<Link, TransportError> {
        (**self).open(interface)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&self, interface: &str) -> Result<Link, TransportError> {
        (**self).open(interface)
    }
}
