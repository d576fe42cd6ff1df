//! Error types
//!
//! Every producer-facing call returns a status signal; nothing unwinds across
//! the API boundary. Module-level errors convert into [`Error`], which maps
//! onto the integer [`StatusCode`] surface of the interface.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::subject::{FrameError, PropertyError, SchemaError};
use crate::transport::TransportError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for Live Link operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was empty or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Property set could not be built
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Static schema failed validation
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Frame was rejected and dropped
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Transport could not open the link
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Wire encoding failed
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The background runtime could not be started
    #[error("failed to start background runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    /// Integer status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) | Error::Property(_) | Error::Schema(_) => {
                StatusCode::InvalidArgument
            }
            Error::Registry(RegistryError::NotFound(_)) => StatusCode::NotRegistered,
            Error::Frame(FrameError::NotRegistered(_)) => StatusCode::NotRegistered,
            Error::Frame(FrameError::RoleMismatch { .. }) => StatusCode::RoleMismatch,
            Error::Transport(_) | Error::Protocol(_) | Error::Runtime(_) => {
                StatusCode::TransportFailure
            }
        }
    }
}

/// Integer result codes exposed by the interface
///
/// `Ok` is `0`. `NotConnected` is reserved for connection queries and is never
/// produced by a failed `initialize`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok = 0,
    NotConnected = 1,
    InvalidArgument = 2,
    NotRegistered = 3,
    RoleMismatch = 4,
    TransportFailure = 5,
}

impl StatusCode {
    /// Collapse a result into its status code
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => StatusCode::Ok,
            Err(e) => e.status(),
        }
    }

    /// Raw integer value
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// AMF0 decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmfError {
    #[error("unexpected end of AMF data")]
    UnexpectedEof,
    #[error("invalid UTF-8 in AMF string")]
    InvalidUtf8,
    #[error("unknown AMF0 marker: {0:#04x}")]
    UnknownMarker(u8),
    #[error("invalid AMF object end marker")]
    InvalidObjectEnd,
    #[error("AMF nesting too deep")]
    NestingTooDeep,
}

/// Wire protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Encoded message exceeds the configured limit
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Message body could not be decoded
    #[error("malformed message: {0}")]
    Amf(#[from] AmfError),

    /// Message decoded but does not follow the command layout
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn status_codes_follow_error_kind() {
        let e = Error::from(FrameError::NotRegistered("circle".into()));
        assert_eq!(e.status(), StatusCode::NotRegistered);

        let e = Error::from(FrameError::RoleMismatch {
            subject: "circle".into(),
            registered: Role::Transform,
            supplied: Role::Camera,
        });
        assert_eq!(e.status(), StatusCode::RoleMismatch);

        let e = Error::InvalidArgument("subject name");
        assert_eq!(e.status().code(), 2);
    }

    #[test]
    fn status_of_result() {
        let ok: Result<()> = Ok(());
        assert_eq!(StatusCode::of(&ok), StatusCode::Ok);
        assert_eq!(StatusCode::Ok.code(), 0);

        let err: Result<()> = Err(Error::from(PropertyError::Duplicate("x".into())));
        assert_eq!(StatusCode::of(&err), StatusCode::InvalidArgument);
    }

    #[test]
    fn error_display_messages() {
        let e = ProtocolError::MessageTooLarge {
            size: 1000,
            max: 500,
        };
        assert!(e.to_string().contains("1000"));
        assert!(e.to_string().contains("500"));

        let e = Error::from(FrameError::NotRegistered("circle".into()));
        assert!(e.to_string().contains("circle"));
    }
}
