//! TCP transport
//!
//! Connects to a consumer listening on a socket address and streams framed
//! messages to it. The link survives consumer restarts: on EOF or an I/O
//! error it reports [`LinkEvent::Down`] and reconnects with backoff.
//!
//! ```text
//!   connect ──► hello ──► Up ──► pump messages ──► EOF / error ──► Down
//!      ▲                                                              │
//!      └──────────────────────── backoff ◄────────────────────────────┘
//! ```

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::protocol::constants::MAX_MESSAGE_SIZE;
use crate::protocol::{write_message, Message};
use crate::API_VERSION;

use super::backoff::BackoffPolicy;
use super::{Link, LinkEvent, Transport, TransportError};

/// TCP transport configuration
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Consumer address
    pub addr: SocketAddr,

    /// Give up on a single connect attempt after this long
    pub connect_timeout: Duration,

    /// Delay between reconnect attempts
    pub backoff: BackoffPolicy,

    /// Outbound queue depth
    pub queue_capacity: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Largest message that will be written
    pub max_message_size: usize,
}

impl TcpConfig {
    /// Create a config for the given consumer address
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(2),
            backoff: BackoffPolicy::default(),
            queue_capacity: 256,
            tcp_nodelay: true, // Frames are small and latency-sensitive
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set reconnect backoff
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set outbound queue depth
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set maximum message size
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Transport that streams to a TCP consumer
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a transport from a full configuration
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Transport with default settings for `addr`
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self::new(TcpConfig::new(addr))
    }

    pub fn config(&self) -> &TcpConfig {
        &self.config
    }
}

impl Transport for TcpTransport {
    fn open(&self, interface: &str) -> Result<Link, TransportError> {
        let handle = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (outbound, rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let (event_tx, events) = mpsc::unbounded_channel();

        let task = handle.spawn(run_link(
            self.config.clone(),
            interface.to_string(),
            rx,
            event_tx,
        ));

        Ok(Link {
            outbound,
            events,
            task: Some(task),
        })
    }
}

/// How a connected session ended
enum SessionEnd {
    /// The producer closed the link
    Closed,
    /// The consumer went away
    Lost,
}

async fn run_link(
    config: TcpConfig,
    interface: String,
    mut outbound: mpsc::Receiver<Message>,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    let mut attempt = 0u32;

    loop {
        match connect(&config).await {
            Ok(stream) => {
                attempt = 0;
                tracing::info!(
                    interface = %interface,
                    consumer = %config.addr,
                    "Connected to consumer"
                );

                match session(stream, &config, &interface, &mut outbound, &events).await {
                    SessionEnd::Closed => break,
                    SessionEnd::Lost => {
                        if events.send(LinkEvent::Down).is_err() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(
                    interface = %interface,
                    consumer = %config.addr,
                    attempt = attempt,
                    error = %e,
                    "Connect failed"
                );
            }
        }

        let delay = config.backoff.next(attempt);
        attempt = attempt.saturating_add(1);
        if !idle(&mut outbound, delay).await {
            break;
        }
    }

    tracing::debug!(interface = %interface, "TCP link closed");
}

async fn connect(config: &TcpConfig) -> io::Result<TcpStream> {
    let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(config.addr))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

    if config.tcp_nodelay {
        stream.set_nodelay(true)?;
    }
    Ok(stream)
}

/// Wait out a reconnect delay, discarding anything queued meanwhile
///
/// Returns false once the producer has closed the link.
async fn idle(outbound: &mut mpsc::Receiver<Message>, delay: Duration) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            msg = outbound.recv() => {
                if msg.is_none() {
                    return false;
                }
            }
        }
    }
}

async fn session(
    stream: TcpStream,
    config: &TcpConfig,
    interface: &str,
    outbound: &mut mpsc::Receiver<Message>,
    events: &mpsc::UnboundedSender<LinkEvent>,
) -> SessionEnd {
    let (mut reader, mut writer) = stream.into_split();

    let hello = Message::Hello {
        interface: interface.to_string(),
        version: API_VERSION,
    };
    if let Err(e) = write_message(&mut writer, &hello, config.max_message_size).await {
        tracing::debug!(interface = %interface, error = %e, "Hello failed");
        return SessionEnd::Lost;
    }

    if events.send(LinkEvent::Up).is_err() {
        return close(&mut writer, config, interface).await;
    }

    let mut scratch = [0u8; 512];
    loop {
        tokio::select! {
            msg = outbound.recv() => {
                let Some(msg) = msg else {
                    return close(&mut writer, config, interface).await;
                };

                match write_message(&mut writer, &msg, config.max_message_size).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                        tracing::warn!(
                            interface = %interface,
                            subject = msg.subject_name(),
                            error = %e,
                            "Message dropped"
                        );
                    }
                    Err(e) => {
                        tracing::info!(interface = %interface, error = %e, "Consumer lost");
                        return SessionEnd::Lost;
                    }
                }
            }
            read = reader.read(&mut scratch) => {
                match read {
                    Ok(0) => {
                        tracing::info!(interface = %interface, "Consumer closed connection");
                        return SessionEnd::Lost;
                    }
                    // Consumers have nothing to say yet; ignore
                    Ok(_) => {}
                    Err(e) => {
                        tracing::info!(interface = %interface, error = %e, "Consumer lost");
                        return SessionEnd::Lost;
                    }
                }
            }
        }
    }
}

async fn close(writer: &mut OwnedWriteHalf, config: &TcpConfig, interface: &str) -> SessionEnd {
    let goodbye = Message::Goodbye {
        interface: interface.to_string(),
    };
    let _ = write_message(writer, &goodbye, config.max_message_size).await;
    let _ = writer.shutdown().await;
    SessionEnd::Closed
}
