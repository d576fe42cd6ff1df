//! AMF (Action Message Format) values and the AMF0 codec
//!
//! Every message on the Live Link wire is a sequence of AMF0 values: a
//! command name followed by an object body.

pub mod amf0;
pub mod value;

pub use amf0::{Amf0Decoder, Amf0Encoder};
pub use value::{AmfValue, ObjectBuilder};
