//! Live Link wire protocol
//!
//! Every message is a big-endian `u32` length followed by an AMF0 body:
//!
//! ```text
//! +----------------+-------------------+---------------------------+
//! | length (u32 BE)| command (string)  | body (object)             |
//! +----------------+-------------------+---------------------------+
//! ```
//!
//! Commands, in the order a consumer normally sees them:
//!
//! - `hello {interface, version}`: sent once per connection
//! - `subject {subject, role, properties, static}`: a schema (advertise or replay)
//! - `frame {subject, role, worldTime, metadata, propertyValues?, data}`
//! - `goodbye {interface}`: sent when the producer closes the link

pub mod constants;
pub mod framing;
pub mod message;

pub use framing::{encode_message, read_message, write_message};
pub use message::{Message, RawMessage};
