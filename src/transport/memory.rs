//! In-process transport
//!
//! [`MemoryTransport`] simulates a consumer on the same process. The paired
//! [`MemoryPeer`] decides when the link is up or down and records every
//! message delivered to it, so tests can observe exactly what a consumer
//! would have received.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};

use crate::protocol::Message;

use super::{Link, LinkEvent, Transport, TransportError};

/// Default outbound queue depth for memory links
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Default)]
struct Shared {
    events: Mutex<Option<mpsc::UnboundedSender<LinkEvent>>>,
    received: Mutex<Vec<Message>>,
    arrived: Condvar,
    opens: AtomicUsize,
    open: AtomicBool,
    refuse: AtomicBool,
    stalled: AtomicBool,
    resumed: Notify,
}

impl Shared {
    fn received(&self) -> MutexGuard<'_, Vec<Message>> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn events(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<LinkEvent>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, msg: Message) {
        self.received().push(msg);
        self.arrived.notify_all();
    }

    /// Wait while the peer is stalled
    async fn wait_resumed(&self) {
        while self.stalled.load(Ordering::Acquire) {
            let resumed = self.resumed.notified();
            if !self.stalled.load(Ordering::Acquire) {
                break;
            }
            resumed.await;
        }
    }
}

/// Transport backed by an in-process peer
pub struct MemoryTransport {
    shared: Arc<Shared>,
    capacity: usize,
}

impl MemoryTransport {
    /// Create a transport and its controlling peer
    pub fn new() -> (Self, MemoryPeer) {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a transport with a custom outbound queue depth
    pub fn with_capacity(capacity: usize) -> (Self, MemoryPeer) {
        let shared = Arc::new(Shared::default());
        let transport = Self {
            shared: Arc::clone(&shared),
            capacity: capacity.max(1),
        };
        (transport, MemoryPeer { shared })
    }
}

impl Transport for MemoryTransport {
    fn open(&self, interface: &str) -> Result<Link, TransportError> {
        if self.shared.refuse.load(Ordering::Acquire) {
            return Err(TransportError::Unavailable(format!(
                "memory peer refused {}",
                interface
            )));
        }
        let handle = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (outbound, mut rx) = mpsc::channel(self.capacity);
        let (event_tx, events) = mpsc::unbounded_channel();
        *self.shared.events() = Some(event_tx);
        self.shared.opens.fetch_add(1, Ordering::Relaxed);
        self.shared.open.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let interface = interface.to_string();
        let task = handle.spawn(async move {
            loop {
                shared.wait_resumed().await;
                let Some(msg) = rx.recv().await else {
                    break;
                };
                shared.deliver(msg);
            }
            shared.open.store(false, Ordering::Release);
            shared.events().take();
            {
                let _received = shared.received();
                shared.arrived.notify_all();
            }
            tracing::debug!(interface = %interface, "Memory link closed");
        });

        Ok(Link {
            outbound,
            events,
            task: Some(task),
        })
    }
}

/// Consumer side of a [`MemoryTransport`]
#[derive(Clone)]
pub struct MemoryPeer {
    shared: Arc<Shared>,
}

impl MemoryPeer {
    /// Report the consumer as reachable; returns false if no link is open
    pub fn link_up(&self) -> bool {
        self.send(LinkEvent::Up)
    }

    /// Report the consumer as lost; returns false if no link is open
    pub fn link_down(&self) -> bool {
        self.send(LinkEvent::Down)
    }

    fn send(&self, event: LinkEvent) -> bool {
        self.shared
            .events()
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    /// Make subsequent `open` calls fail
    pub fn refuse_links(&self, refuse: bool) {
        self.shared.refuse.store(refuse, Ordering::Release);
    }

    /// Stop or resume draining the outbound queue
    ///
    /// A stalled peer behaves like a consumer that stopped reading: the
    /// outbound queue fills and the link's I/O task never finishes.
    pub fn stall(&self, stalled: bool) {
        self.shared.stalled.store(stalled, Ordering::Release);
        if !stalled {
            self.shared.resumed.notify_waiters();
        }
    }

    /// Whether a link is currently open
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }

    /// Number of links opened so far
    pub fn opens(&self) -> usize {
        self.shared.opens.load(Ordering::Relaxed)
    }

    /// Copy of every message received so far
    pub fn messages(&self) -> Vec<Message> {
        self.shared.received().clone()
    }

    /// Take and clear the received messages
    pub fn take_messages(&self) -> Vec<Message> {
        std::mem::take(&mut *self.shared.received())
    }

    /// Block until at least `count` messages have been received
    ///
    /// Returns false on timeout.
    pub fn wait_for_messages(&self, count: usize, timeout: Duration) -> bool {
        let guard = self.shared.received();
        let (guard, _) = self
            .shared
            .arrived
            .wait_timeout_while(guard, timeout, |received| received.len() < count)
            .unwrap_or_else(PoisonError::into_inner);
        guard.len() >= count
    }

    /// Block until the link has been closed by the producer
    pub fn wait_closed(&self, timeout: Duration) -> bool {
        let guard = self.shared.received();
        let _guard = self
            .shared
            .arrived
            .wait_timeout_while(guard, timeout, |_| self.is_open())
            .unwrap_or_else(PoisonError::into_inner);
        !self.is_open()
    }
}
