//! Subject description and per-frame encoding
//!
//! A subject is a named stream of frames. Its [`SubjectSchema`] is declared
//! once and fixes the role, property names and static data; each
//! [`FrameUpdate`] is then validated and normalized against that schema.

pub mod error;
pub mod frame;
pub mod metadata;
pub mod properties;
pub mod schema;

pub use error::{FrameError, PropertyError, SchemaError};
pub use frame::FrameUpdate;
pub use metadata::{FrameRate, Metadata};
pub use properties::{Alignment, Properties, PropertyValues};
pub use schema::SubjectSchema;
