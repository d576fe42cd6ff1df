//! Errors raised while declaring a subject or encoding its frames

use thiserror::Error;

use crate::role::Role;

/// Invalid property set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("property name at index {index} is empty")]
    EmptyName { index: usize },

    #[error("duplicate property name: {0}")]
    Duplicate(String),
}

/// Invalid subject schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("subject name is empty")]
    EmptySubjectName,

    #[error("bone {bone} has invalid parent index {parent}")]
    InvalidParent { bone: String, parent: i32 },
}

/// Frame rejected before dispatch; the frame is dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("subject not registered: {0}")]
    NotRegistered(String),

    #[error("subject {subject} is registered as {registered}, frame is {supplied}")]
    RoleMismatch {
        subject: String,
        registered: Role,
        supplied: Role,
    },
}
