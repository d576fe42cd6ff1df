//! Connection manager
//!
//! Owns the background runtime for one interface. A single monitor task
//! serializes everything that reaches the transport:
//!
//! ```text
//!   producer thread                         monitor task
//!   ───────────────                         ────────────
//!   advertise / send_frame ──► commands ──┐
//!                                         ├──► select! ──► link.outbound
//!   transport ──────────────► link events ┘        │
//!                                                  └──► state, replay, callback
//! ```
//!
//! Link events are polled first, so the replay that follows a link-up always
//! precedes any frame queued after it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::protocol::Message;
use crate::registry::SubjectRegistry;
use crate::stats::PublishStats;
use crate::subject::{FrameUpdate, SubjectSchema};
use crate::transport::{Link, LinkEvent, Transport};

use super::config::LiveLinkConfig;
use super::observer::{ConnectionCallback, Observer};
use super::state::{LinkState, StateCell};

/// Work queued by the producer for the monitor
#[derive(Debug)]
pub enum Command {
    /// Send a newly registered or replaced schema
    Advertise(Arc<SubjectSchema>),
    /// Send a frame
    Frame(FrameUpdate),
}

impl Command {
    fn into_message(self) -> Message {
        match self {
            Command::Advertise(schema) => Message::Subject(schema),
            Command::Frame(frame) => Message::Frame(frame),
        }
    }
}

/// Why a command was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No consumer connected
    NotConnected,
    /// The command queue was full
    QueueFull,
}

/// Outcome of handing a command to the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Queued,
    Dropped(DropReason),
}

impl Dispatch {
    /// Whether the command reached the queue
    pub fn is_queued(&self) -> bool {
        *self == Dispatch::Queued
    }
}

/// State shared between the producer side and the monitor
struct Shared {
    state: StateCell,
    observer: Observer,
    registry: Arc<SubjectRegistry>,
    stats: Arc<PublishStats>,
}

/// A running interface
struct Active {
    interface: String,
    runtime: Runtime,
    commands: mpsc::Sender<Command>,
    monitor: JoinHandle<()>,
}

/// Lifecycle and dispatch for one Live Link interface
pub struct ConnectionManager {
    shared: Arc<Shared>,
    transport: Box<dyn Transport>,
    config: LiveLinkConfig,
    active: Mutex<Option<Active>>,
}

impl ConnectionManager {
    /// Create a manager; nothing runs until [`initialize`](Self::initialize)
    pub fn new(
        transport: Box<dyn Transport>,
        config: LiveLinkConfig,
        registry: Arc<SubjectRegistry>,
        stats: Arc<PublishStats>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: StateCell::default(),
                observer: Observer::new(),
                registry,
                stats,
            }),
            transport,
            config,
            active: Mutex::new(None),
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<Active>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration the manager was built with
    pub fn config(&self) -> &LiveLinkConfig {
        &self.config
    }

    /// Start the background context for `interface`
    ///
    /// Calling this while already initialized is a no-op.
    pub fn initialize(&self, interface: &str) -> Result<()> {
        if interface.is_empty() {
            return Err(Error::InvalidArgument("interface name is empty"));
        }

        let mut active = self.active();
        if let Some(current) = active.as_ref() {
            tracing::debug!(
                interface = %current.interface,
                requested = %interface,
                "Already initialized"
            );
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(self.config.thread_name.clone())
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let link = {
            let _guard = runtime.enter();
            self.transport.open(interface)
        };
        let link = match link {
            Ok(link) => link,
            Err(e) => {
                runtime.shutdown_background();
                tracing::warn!(interface = %interface, error = %e, "Transport failed to open");
                return Err(e.into());
            }
        };

        let (commands, rx) = mpsc::channel(self.config.queue_capacity.max(1));
        self.shared.state.swap(LinkState::Initializing);

        let monitor = runtime.spawn(run_monitor(
            Arc::clone(&self.shared),
            interface.to_string(),
            link,
            rx,
        ));

        *active = Some(Active {
            interface: interface.to_string(),
            runtime,
            commands,
            monitor,
        });

        tracing::info!(interface = %interface, "Interface initialized");
        Ok(())
    }

    /// Stop the background context and forget every subject
    ///
    /// Waits at most `shutdown_timeout` for the monitor to flush. No
    /// connection callback fires. Calling this while uninitialized is a no-op.
    pub fn uninitialize(&self) {
        let Active {
            interface,
            runtime,
            commands,
            monitor,
        } = {
            let mut active = self.active();
            let Some(current) = active.take() else {
                return;
            };
            self.shared.state.swap(LinkState::Uninitialized);
            self.shared.registry.clear();
            current
        };

        // Closing the queue lets the monitor drain and close the link
        drop(commands);

        if Handle::try_current().is_ok() {
            tracing::warn!(
                interface = %interface,
                "Uninitialize called from async context, not waiting for shutdown"
            );
            runtime.shutdown_background();
        } else {
            let timeout = self.config.shutdown_timeout;
            let finished = runtime.block_on(async { tokio::time::timeout(timeout, monitor).await });
            if finished.is_err() {
                tracing::warn!(
                    interface = %interface,
                    timeout_ms = timeout.as_millis() as u64,
                    "Monitor did not stop in time"
                );
            }
            runtime.shutdown_timeout(timeout);
        }

        tracing::info!(interface = %interface, "Interface uninitialized");
    }

    /// Name of the running interface
    pub fn interface_name(&self) -> Option<String> {
        self.active().as_ref().map(|active| active.interface.clone())
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.shared.state.load()
    }

    /// Whether a consumer is connected
    pub fn has_connection(&self) -> bool {
        self.state().is_connected()
    }

    /// Install the connection-change callback, replacing any previous one
    pub fn set_callback(&self, callback: ConnectionCallback) {
        self.shared.observer.set(callback);
    }

    /// Remove the connection-change callback
    pub fn clear_callback(&self) {
        self.shared.observer.clear();
    }

    /// Queue a schema for the consumer
    pub fn advertise(&self, schema: Arc<SubjectSchema>) -> Dispatch {
        let name = schema.name().to_string();
        let dispatch = self.dispatch(Command::Advertise(schema));
        match dispatch {
            Dispatch::Queued => self.shared.stats.schema_advertised(),
            Dispatch::Dropped(DropReason::QueueFull) => {
                tracing::warn!(subject = %name, "Schema not advertised, queue full");
            }
            // Replayed on the next connection
            Dispatch::Dropped(DropReason::NotConnected) => {}
        }
        dispatch
    }

    /// Queue a frame for the consumer; never blocks
    pub fn send_frame(&self, frame: FrameUpdate) -> Dispatch {
        let dispatch = self.dispatch(Command::Frame(frame));
        match dispatch {
            Dispatch::Queued => self.shared.stats.frame_queued(),
            Dispatch::Dropped(DropReason::NotConnected) => {
                self.shared.stats.frame_dropped_not_connected()
            }
            Dispatch::Dropped(DropReason::QueueFull) => {
                self.shared.stats.frame_dropped_queue_full();
                tracing::debug!("Frame dropped, queue full");
            }
        }
        dispatch
    }

    fn dispatch(&self, command: Command) -> Dispatch {
        if !self.has_connection() {
            return Dispatch::Dropped(DropReason::NotConnected);
        }

        let active = self.active();
        let Some(active) = active.as_ref() else {
            return Dispatch::Dropped(DropReason::NotConnected);
        };

        match active.commands.try_send(command) {
            Ok(()) => Dispatch::Queued,
            Err(TrySendError::Full(_)) => Dispatch::Dropped(DropReason::QueueFull),
            Err(TrySendError::Closed(_)) => Dispatch::Dropped(DropReason::NotConnected),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.uninitialize();
    }
}

async fn run_monitor(
    shared: Arc<Shared>,
    interface: String,
    link: Link,
    mut commands: mpsc::Receiver<Command>,
) {
    let Link {
        outbound,
        mut events,
        task,
    } = link;
    let mut events_open = true;
    // Schemas the consumer already received in this connection's replay
    let mut replayed: Vec<Arc<SubjectSchema>> = Vec::new();

    loop {
        tokio::select! {
            biased;

            event = events.recv(), if events_open => match event {
                Some(LinkEvent::Up) => {
                    if let Some(schemas) = on_link_up(&shared, &interface, &outbound).await {
                        replayed = schemas;
                    }
                }
                Some(LinkEvent::Down) => {
                    replayed.clear();
                    on_link_down(&shared, &interface);
                }
                None => {
                    tracing::warn!(
                        interface = %interface,
                        "Transport stopped reporting link events"
                    );
                    events_open = false;
                    replayed.clear();
                    on_link_down(&shared, &interface);
                }
            },

            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };

                if !shared.state.load().is_connected() {
                    // Schemas are replayed on the next connection
                    if let Command::Frame(_) = command {
                        shared.stats.frame_dropped_not_connected();
                    }
                    continue;
                }

                if let Command::Advertise(schema) = &command {
                    if replayed.iter().any(|sent| Arc::ptr_eq(sent, schema)) {
                        tracing::debug!(
                            interface = %interface,
                            subject = schema.name(),
                            "Schema already replayed"
                        );
                        continue;
                    }
                }

                let message = command.into_message();
                if outbound.send(message).await.is_err() {
                    tracing::debug!(interface = %interface, "Transport closed, message dropped");
                }
            }
        }
    }

    // Dropping the sender closes the link; wait for it to flush
    drop(outbound);
    if let Some(task) = task {
        let _ = task.await;
    }
    tracing::debug!(interface = %interface, "Monitor stopped");
}

/// Returns the replayed schemas, or `None` if the event was not a transition
async fn on_link_up(
    shared: &Shared,
    interface: &str,
    outbound: &mpsc::Sender<Message>,
) -> Option<Vec<Arc<SubjectSchema>>> {
    let Some((from, _)) = shared.state.transition(LinkState::on_link_up) else {
        tracing::debug!(interface = %interface, "Link up ignored");
        return None;
    };

    shared.stats.connected();

    // State is already Connected: anything registered after this snapshot is
    // advertised through the command queue instead.
    let schemas = shared.registry.snapshot();
    let count = schemas.len();
    for schema in &schemas {
        if outbound.send(Message::Subject(Arc::clone(schema))).await.is_err() {
            tracing::debug!(interface = %interface, "Transport closed during replay");
            break;
        }
    }
    shared.stats.schemas_replayed(count as u64);

    tracing::info!(
        interface = %interface,
        from = %from,
        subjects = count,
        "Consumer connected"
    );

    notify(shared);
    Some(schemas)
}

fn on_link_down(shared: &Shared, interface: &str) {
    let Some((from, _)) = shared.state.transition(LinkState::on_link_down) else {
        tracing::debug!(interface = %interface, "Link down ignored");
        return;
    };

    if from == LinkState::Connected {
        shared.stats.disconnected();
        tracing::info!(interface = %interface, "Consumer disconnected");
        notify(shared);
    } else {
        tracing::debug!(interface = %interface, from = %from, "No consumer reachable");
    }
}

fn notify(shared: &Shared) {
    // Caller-initiated teardown never notifies
    if shared.state.load().is_initialized() {
        shared.observer.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{AnimationStatic, LightStatic, StaticData, Transform, ROOT_PARENT};
    use crate::subject::Properties;
    use crate::transport::{MemoryPeer, MemoryTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(2);

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    fn setup() -> (ConnectionManager, MemoryPeer, Arc<SubjectRegistry>, Arc<AtomicUsize>) {
        let (transport, peer) = MemoryTransport::new();
        setup_with(transport, peer, LiveLinkConfig::default())
    }

    fn setup_with(
        transport: MemoryTransport,
        peer: MemoryPeer,
        config: LiveLinkConfig,
    ) -> (ConnectionManager, MemoryPeer, Arc<SubjectRegistry>, Arc<AtomicUsize>) {
        let registry = Arc::new(SubjectRegistry::new());
        let manager = ConnectionManager::new(
            Box::new(transport),
            config,
            Arc::clone(&registry),
            Arc::new(PublishStats::new()),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        manager.set_callback(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        (manager, peer, registry, calls)
    }

    fn subject_messages(peer: &MemoryPeer) -> Vec<String> {
        peer.messages()
            .iter()
            .filter_map(|msg| match msg {
                Message::Subject(schema) => Some(schema.name().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initialize_rejects_empty_name() {
        let (manager, _peer, _, _) = setup();
        assert!(matches!(
            manager.initialize(""),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(manager.state(), LinkState::Uninitialized);
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let (manager, peer, _, _) = setup();
        manager.initialize("maya").unwrap();
        manager.initialize("other").unwrap();

        assert_eq!(peer.opens(), 1);
        assert_eq!(manager.interface_name().as_deref(), Some("maya"));
        assert_eq!(manager.state(), LinkState::Initializing);
    }

    #[test]
    fn test_transport_failure_reported() {
        let (manager, peer, _, _) = setup();
        peer.refuse_links(true);

        let err = manager.initialize("maya").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(manager.state(), LinkState::Uninitialized);
        assert!(manager.interface_name().is_none());
    }

    #[test]
    fn test_callback_once_per_transition() {
        let (manager, peer, _, calls) = setup();
        manager.initialize("maya").unwrap();

        // Initializing -> Disconnected does not change has_connection
        peer.link_down();
        peer.link_up();
        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 1));
        assert!(manager.has_connection());

        // Repeated link up is not a transition
        peer.link_up();
        peer.link_down();
        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 2));
        assert!(!manager.has_connection());

        peer.link_down();
        peer.link_up();
        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 3));

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_replay_once_per_connection() {
        let (manager, peer, registry, calls) = setup();
        manager.initialize("maya").unwrap();

        let skeleton = AnimationStatic::new().with_bone("root", ROOT_PARENT);
        registry.register(
            SubjectSchema::new("actor", Properties::none(), StaticData::Animation(skeleton))
                .unwrap(),
        );
        registry.register(
            SubjectSchema::new(
                "lamp",
                Properties::none(),
                StaticData::Light(LightStatic::new()),
            )
            .unwrap(),
        );

        peer.link_up();
        assert!(peer.wait_for_messages(2, WAIT));
        assert_eq!(subject_messages(&peer), vec!["actor", "lamp"]);
        peer.take_messages();

        peer.link_down();
        peer.link_up();
        // No-op re-check while connected
        peer.link_up();

        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 3));
        assert!(peer.wait_for_messages(2, WAIT));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(subject_messages(&peer), vec!["actor", "lamp"]);
    }

    #[test]
    fn test_frames_dropped_when_not_connected() {
        let (manager, peer, registry, calls) = setup();
        let (schema, _) = registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );
        let frame = || {
            FrameUpdate::encode(&schema, 0.0, None, None, Transform::identity().into()).unwrap()
        };

        assert_eq!(
            manager.send_frame(frame()),
            Dispatch::Dropped(DropReason::NotConnected)
        );

        manager.initialize("maya").unwrap();
        assert_eq!(
            manager.send_frame(frame()),
            Dispatch::Dropped(DropReason::NotConnected)
        );

        peer.link_up();
        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 1));
        assert!(manager.send_frame(frame()).is_queued());

        // Replay then the frame
        assert!(peer.wait_for_messages(2, WAIT));
        let messages = peer.messages();
        assert!(matches!(messages[0], Message::Subject(_)));
        assert!(matches!(messages[1], Message::Frame(_)));
    }

    #[test]
    fn test_uninitialize_without_callback() {
        let (manager, peer, registry, calls) = setup();
        manager.initialize("maya").unwrap();
        registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );
        peer.link_up();
        assert!(wait_until(|| manager.has_connection()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        manager.uninitialize();
        assert!(!manager.has_connection());
        assert_eq!(manager.state(), LinkState::Uninitialized);
        assert!(registry.is_empty());
        assert!(peer.wait_closed(WAIT));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second call is a no-op
        manager.uninitialize();
    }

    #[test]
    fn test_reinitialize_after_uninitialize() {
        let (manager, peer, _, _) = setup();
        manager.initialize("maya").unwrap();
        manager.uninitialize();

        manager.initialize("maya").unwrap();
        assert_eq!(peer.opens(), 2);
        peer.link_up();
        assert!(wait_until(|| manager.has_connection()));
    }

    #[test]
    fn test_zero_queue_capacity_initializes() {
        let (transport, peer) = MemoryTransport::new();
        let config = LiveLinkConfig {
            queue_capacity: 0,
            ..LiveLinkConfig::default()
        };
        let (manager, peer, registry, _) = setup_with(transport, peer, config);
        let (schema, _) = registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );

        manager.initialize("maya").unwrap();
        peer.link_up();
        assert!(wait_until(|| manager.has_connection()));

        let frame =
            FrameUpdate::encode(&schema, 0.0, None, None, Transform::identity().into()).unwrap();
        assert!(manager.send_frame(frame).is_queued());
        assert!(peer.wait_for_messages(2, WAIT));
    }

    #[test]
    fn test_stalled_consumer_never_blocks_producer() {
        let (transport, peer) = MemoryTransport::with_capacity(1);
        let config = LiveLinkConfig::default().queue_capacity(1);
        let (manager, peer, registry, _) = setup_with(transport, peer, config);
        let (schema, _) = registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );

        peer.stall(true);
        manager.initialize("maya").unwrap();
        peer.link_up();
        assert!(wait_until(|| manager.has_connection()));

        let started = Instant::now();
        let dispatches: Vec<Dispatch> = (0..20)
            .map(|i| {
                let frame = FrameUpdate::encode(
                    &schema,
                    i as f64,
                    None,
                    None,
                    Transform::identity().into(),
                )
                .unwrap();
                manager.send_frame(frame)
            })
            .collect();
        assert!(started.elapsed() < Duration::from_millis(500));

        // Replay fills the link, the monitor holds one frame, the queue one more
        let full = dispatches
            .iter()
            .filter(|d| **d == Dispatch::Dropped(DropReason::QueueFull))
            .count();
        assert!(full >= 17, "only {} frames hit a full queue", full);
        assert_eq!(manager.shared.stats.snapshot().dropped_queue_full, full as u64);

        // A schema that cannot be queued is still replayed later
        let (lamp, _) = registry.register(
            SubjectSchema::new(
                "lamp",
                Properties::none(),
                StaticData::Light(LightStatic::new()),
            )
            .unwrap(),
        );
        assert_eq!(
            manager.advertise(lamp),
            Dispatch::Dropped(DropReason::QueueFull)
        );
        assert_eq!(manager.shared.stats.snapshot().schemas_advertised, 0);

        peer.stall(false);
        peer.link_down();
        peer.link_up();
        assert!(wait_until(|| subject_messages(&peer).contains(&"lamp".to_string())));
    }

    #[test]
    fn test_uninitialize_bounded_with_stalled_consumer() {
        let timeout = Duration::from_millis(200);
        let (transport, peer) = MemoryTransport::with_capacity(1);
        let config = LiveLinkConfig::default()
            .queue_capacity(1)
            .shutdown_timeout(timeout);
        let (manager, peer, registry, calls) = setup_with(transport, peer, config);
        let (schema, _) = registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );

        peer.stall(true);
        manager.initialize("maya").unwrap();
        peer.link_up();
        assert!(wait_until(|| manager.has_connection()));
        for i in 0..5 {
            let frame = FrameUpdate::encode(
                &schema,
                i as f64,
                None,
                None,
                Transform::identity().into(),
            )
            .unwrap();
            manager.send_frame(frame);
        }

        let started = Instant::now();
        manager.uninitialize();
        let elapsed = started.elapsed();

        assert!(elapsed < timeout * 3, "uninitialize took {:?}", elapsed);
        assert_eq!(manager.state(), LinkState::Uninitialized);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_advertise_after_replay_not_resent() {
        let (manager, peer, registry, calls) = setup();
        manager.initialize("maya").unwrap();

        // Registered just before the link came up: the replay carries it and
        // the advertise queued by the registering thread arrives afterwards.
        let (schema, _) = registry.register(
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap(),
        );
        peer.link_up();
        assert!(wait_until(|| calls.load(Ordering::SeqCst) == 1));
        assert!(manager.advertise(Arc::clone(&schema)).is_queued());

        // A real replacement is still advertised
        let (replaced, _) = registry.register(
            SubjectSchema::new(
                "circle",
                Properties::new(["radius"]).unwrap(),
                StaticData::Transform,
            )
            .unwrap(),
        );
        assert!(manager.advertise(replaced).is_queued());

        assert!(peer.wait_for_messages(2, WAIT));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(subject_messages(&peer), vec!["circle", "circle"]);
        match &peer.messages()[1] {
            Message::Subject(sent) => assert_eq!(sent.properties().len(), 1),
            other => panic!("expected subject message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_uninitialize_inside_runtime_returns() {
        let (manager, _peer, _, _) = setup();
        manager.initialize("maya").unwrap();

        manager.uninitialize();
        assert_eq!(manager.state(), LinkState::Uninitialized);
    }
}
