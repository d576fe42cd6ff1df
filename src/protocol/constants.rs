//! Live Link wire protocol constants

/// Length prefix size in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum encoded message size (1 MiB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

// Command names
pub const CMD_HELLO: &str = "hello";
pub const CMD_SUBJECT: &str = "subject";
pub const CMD_FRAME: &str = "frame";
pub const CMD_GOODBYE: &str = "goodbye";
