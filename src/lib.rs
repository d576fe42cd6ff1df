//! # livelink-rs
//!
//! Producer-side Live Link interface. A producer application declares named
//! subjects, each with a role and a static schema, then pushes per-frame
//! updates. The crate encodes schemas and frames, keeps every declared
//! subject so a consumer that connects late still receives the schemas, and
//! manages the connection lifecycle on a background worker while the
//! producer thread keeps emitting frames.
//!
//! ## Roles
//!
//! | Role      | Static data      | Per-frame data |
//! |-----------|------------------|----------------|
//! | Generic   | properties only  | property values |
//! | Animation | bone hierarchy   | bone transforms |
//! | Transform | properties only  | transform |
//! | Camera    | lens capabilities | transform + lens |
//! | Light     | light capabilities | transform + light |
//!
//! ## Architecture
//!
//! ```text
//!   producer thread ──► LiveLink ──► SubjectRegistry (schemas, replay order)
//!                          │
//!                          ▼
//!                  ConnectionManager ──► monitor task ──► Transport ──► consumer
//!                  (state, callback)     (background runtime)
//! ```
//!
//! ## Example
//! ```no_run
//! use livelink_rs::{LiveLink, MemoryTransport, Transform};
//!
//! let (transport, _peer) = MemoryTransport::new();
//! let link = LiveLink::new(transport);
//! link.initialize("example").unwrap();
//! link.set_transform_structure("circle", None).unwrap();
//! link.update_transform_frame("circle", 0.0, None, None, &Transform::identity())
//!     .unwrap();
//! link.uninitialize().unwrap();
//! ```

pub mod amf;
pub mod client;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod role;
pub mod stats;
pub mod subject;
pub mod transport;

/// Interface version reported by [`LiveLink::version`]
pub const API_VERSION: i32 = 1;

pub use client::LiveLink;
pub use connection::{Dispatch, DropReason, LinkState, LiveLinkConfig};
pub use error::{Error, Result, StatusCode};
pub use registry::Registration;
pub use role::{
    Animation, AnimationStatic, Bone, Camera, CameraStatic, FrameData, Light, LightKind,
    LightStatic, ProjectionMode, Role, StaticData, Transform, ROOT_PARENT,
};
pub use stats::StatsSnapshot;
pub use subject::{FrameRate, FrameUpdate, Metadata, Properties, PropertyValues, SubjectSchema};
pub use transport::{BackoffPolicy, MemoryPeer, MemoryTransport, TcpConfig, TcpTransport, Transport};
