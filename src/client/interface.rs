//! Producer-facing Live Link interface
//!
//! [`LiveLink`] is the single entry point a producer application uses. All
//! methods are synchronous and safe to call from any thread; none of them
//! block on the network.
//!
//! # Example
//! ```no_run
//! use livelink_rs::{LiveLink, Transform, API_VERSION};
//!
//! # fn example() -> livelink_rs::Result<()> {
//! if LiveLink::version() != API_VERSION {
//!     return Ok(());
//! }
//!
//! let link = LiveLink::tcp("127.0.0.1:11111".parse().unwrap());
//! link.initialize("my-tool")?;
//! link.set_transform_structure("circle", None)?;
//!
//! let mut xform = Transform::identity();
//! xform.translation = [200.0, 0.0, 100.0];
//! link.update_transform_frame("circle", 0.0, None, None, &xform)?;
//!
//! link.uninitialize()?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use crate::connection::{ConnectionManager, Dispatch, LinkState, LiveLinkConfig};
use crate::error::{Error, Result, StatusCode};
use crate::registry::{Registration, SubjectRegistry, SubjectStats};
use crate::role::{
    Animation, AnimationStatic, Camera, CameraStatic, FrameData, Light, LightStatic, StaticData,
    Transform,
};
use crate::stats::{PublishStats, StatsSnapshot};
use crate::subject::{Metadata, Properties, PropertyValues, SubjectSchema};
use crate::transport::{TcpTransport, Transport};
use crate::API_VERSION;

/// A producer-side Live Link interface
///
/// Dropping the interface uninitializes it.
pub struct LiveLink {
    registry: Arc<SubjectRegistry>,
    stats: Arc<PublishStats>,
    manager: ConnectionManager,
}

impl LiveLink {
    /// Create an interface over the given transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, LiveLinkConfig::default())
    }

    /// Create an interface with custom configuration
    pub fn with_config(transport: impl Transport + 'static, config: LiveLinkConfig) -> Self {
        let registry = Arc::new(SubjectRegistry::new());
        let stats = Arc::new(PublishStats::new());
        let manager = ConnectionManager::new(
            Box::new(transport),
            config,
            Arc::clone(&registry),
            Arc::clone(&stats),
        );

        Self {
            registry,
            stats,
            manager,
        }
    }

    /// Create an interface that streams to a TCP consumer at `addr`
    pub fn tcp(addr: SocketAddr) -> Self {
        Self::new(TcpTransport::with_addr(addr))
    }

    /// Interface version; callers should refuse to run on a mismatch
    pub fn version() -> i32 {
        API_VERSION
    }

    // ---- Lifecycle ----

    /// Start the interface under `interface_name`
    ///
    /// Succeeds once the background context is running; a consumer may
    /// connect at any later time. A second call while initialized is a no-op.
    pub fn initialize(&self, interface_name: &str) -> Result<()> {
        self.manager.initialize(interface_name)
    }

    /// Stop the interface and forget every registered subject
    ///
    /// Always succeeds; calling it while uninitialized is a no-op.
    pub fn uninitialize(&self) -> Result<()> {
        self.manager.uninitialize();
        Ok(())
    }

    /// Install the connection-change callback, replacing any previous one
    ///
    /// The callback runs on the background worker each time
    /// [`has_connection`](Self::has_connection) changes because a consumer
    /// connected or was lost.
    pub fn set_connection_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.manager.set_callback(Arc::new(callback));
    }

    /// Remove the connection-change callback
    pub fn clear_connection_callback(&self) {
        self.manager.clear_callback();
    }

    /// Whether a consumer is currently connected
    pub fn has_connection(&self) -> bool {
        self.manager.has_connection()
    }

    /// `Ok` when connected, `NotConnected` otherwise
    pub fn connection_status(&self) -> StatusCode {
        if self.has_connection() {
            StatusCode::Ok
        } else {
            StatusCode::NotConnected
        }
    }

    /// Name passed to [`initialize`](Self::initialize), while initialized
    pub fn interface_name(&self) -> Option<String> {
        self.manager.interface_name()
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.manager.state()
    }

    /// Snapshot of the publish counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Per-subject bookkeeping, or `None` if `subject` is not registered
    pub fn subject_stats(&self, subject: &str) -> Option<SubjectStats> {
        self.registry.subject_stats(subject)
    }

    // ---- Structures ----

    /// Declare or replace a subject of any role
    ///
    /// `None` properties means the subject has none. A changed schema is
    /// advertised immediately when connected and replayed on every later
    /// connection.
    pub fn set_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
        static_data: StaticData,
    ) -> Result<Registration> {
        if subject.is_empty() {
            return Err(Error::InvalidArgument("subject name is empty"));
        }

        let properties = properties.cloned().unwrap_or_default();
        let schema = SubjectSchema::new(subject, properties, static_data)?;
        let (schema, registration) = self.registry.register(schema);

        if registration.is_changed() && self.has_connection() {
            self.manager.advertise(schema);
        }

        Ok(registration)
    }

    /// Declare a subject carrying only property values
    pub fn set_generic_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
    ) -> Result<Registration> {
        self.set_structure(subject, properties, StaticData::Generic)
    }

    /// Declare a skeletal subject
    pub fn set_animation_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
        skeleton: &AnimationStatic,
    ) -> Result<Registration> {
        self.set_structure(subject, properties, StaticData::Animation(skeleton.clone()))
    }

    /// Declare a subject driven by a single transform
    pub fn set_transform_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
    ) -> Result<Registration> {
        self.set_structure(subject, properties, StaticData::Transform)
    }

    /// Declare a camera subject with its lens capabilities
    pub fn set_camera_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
        lens: &CameraStatic,
    ) -> Result<Registration> {
        self.set_structure(subject, properties, StaticData::Camera(lens.clone()))
    }

    /// Declare a light subject with its supported features
    pub fn set_light_structure(
        &self,
        subject: &str,
        properties: Option<&Properties>,
        light: &LightStatic,
    ) -> Result<Registration> {
        self.set_structure(subject, properties, StaticData::Light(light.clone()))
    }

    // ---- Frames ----

    /// Push one frame for a registered subject
    ///
    /// Returns an error when the frame is rejected (unknown subject, role
    /// mismatch). An accepted frame is fire-and-forget: the returned
    /// [`Dispatch`] says whether it was queued or dropped for lack of a
    /// consumer or queue space.
    pub fn update_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        data: FrameData,
    ) -> Result<Dispatch> {
        let frame = self
            .registry
            .encode_frame(subject, world_time, metadata, values, data)
            .map_err(|e| {
                self.stats.frame_rejected();
                tracing::warn!(subject = %subject, error = %e, "Frame rejected");
                Error::from(e)
            })?;

        let dispatch = self.manager.send_frame(frame);
        tracing::trace!(subject = %subject, world_time = world_time, dispatch = ?dispatch, "Frame");
        Ok(dispatch)
    }

    /// Push property values for a generic subject
    pub fn update_generic_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
    ) -> Result<Dispatch> {
        self.update_frame(subject, world_time, metadata, values, FrameData::Generic)
    }

    /// Push bone transforms for a skeletal subject
    ///
    /// Missing bones are sent as identity, extra bones are ignored.
    pub fn update_animation_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        frame: &Animation,
    ) -> Result<Dispatch> {
        self.update_frame(subject, world_time, metadata, values, frame.clone().into())
    }

    /// Push a transform frame
    pub fn update_transform_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        frame: &Transform,
    ) -> Result<Dispatch> {
        self.update_frame(subject, world_time, metadata, values, (*frame).into())
    }

    /// Push a camera frame
    pub fn update_camera_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        frame: &Camera,
    ) -> Result<Dispatch> {
        self.update_frame(subject, world_time, metadata, values, frame.clone().into())
    }

    /// Push a light frame
    pub fn update_light_frame(
        &self,
        subject: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        frame: &Light,
    ) -> Result<Dispatch> {
        self.update_frame(subject, world_time, metadata, values, frame.clone().into())
    }
}
