//! Subject registry
//!
//! The registry owns every declared subject's schema. The producer thread
//! registers and updates subjects by name; the background monitor snapshots
//! the registry to replay schemas when a consumer connects.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<SubjectRegistry>
//!                   ┌──────────────────────────┐
//!                   │ subjects: HashMap<Name,  │
//!                   │   SubjectEntry {         │
//!                   │     schema: Arc<..>,     │
//!                   │     sequence,            │
//!                   │   }                      │
//!                   │ >                        │
//!                   └─────────────┬────────────┘
//!                                 │
//!              ┌──────────────────┴─────────────────┐
//!              │                                    │
//!              ▼                                    ▼
//!        [Producer thread]                  [Monitor task]
//!        register() / encode_frame()        snapshot() on link up
//!              │                                    │
//!              └──► command queue ──► transport ◄───┘
//! ```
//!
//! Schemas are shared as `Arc<SubjectSchema>`, so a replay snapshot never
//! copies static data.

pub mod entry;
pub mod error;
pub mod store;

pub use entry::{SubjectEntry, SubjectStats};
pub use error::RegistryError;
pub use store::{Registration, SubjectRegistry};
