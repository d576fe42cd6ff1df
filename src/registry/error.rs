//! Registry error types

use thiserror::Error;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No subject registered under this name
    #[error("subject not found: {0}")]
    NotFound(String),
}
