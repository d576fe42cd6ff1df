//! Per-subject registry entry

use std::sync::Arc;
use std::time::Instant;

use crate::subject::SubjectSchema;

/// Entry for a single subject in the registry
#[derive(Debug)]
pub struct SubjectEntry {
    /// Current schema, shared with replay snapshots
    pub schema: Arc<SubjectSchema>,

    /// Registration order; replays follow it
    pub sequence: u64,

    /// When the current schema was registered
    pub registered_at: Instant,

    /// World time of the last accepted frame
    pub last_world_time: Option<f64>,

    /// Frames accepted since the current schema was registered
    pub frames: u64,
}

impl SubjectEntry {
    pub(super) fn new(schema: SubjectSchema, sequence: u64) -> Self {
        Self {
            schema: Arc::new(schema),
            sequence,
            registered_at: Instant::now(),
            last_world_time: None,
            frames: 0,
        }
    }

    /// Record an accepted frame; returns the previous world time when the new
    /// one goes backwards
    pub(super) fn record_frame(&mut self, world_time: f64) -> Option<f64> {
        let regressed = self.last_world_time.filter(|last| world_time < *last);
        self.last_world_time = Some(world_time);
        self.frames += 1;
        regressed
    }
}

/// Statistics for a subject
#[derive(Debug, Clone)]
pub struct SubjectStats {
    /// Registered role
    pub role: crate::role::Role,
    /// Frames accepted since registration
    pub frames: u64,
    /// World time of the last accepted frame
    pub last_world_time: Option<f64>,
    /// Time since the current schema was registered
    pub age: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::StaticData;
    use crate::subject::Properties;

    #[test]
    fn test_record_frame_detects_regression() {
        let schema =
            SubjectSchema::new("circle", Properties::none(), StaticData::Transform).unwrap();
        let mut entry = SubjectEntry::new(schema, 0);

        assert_eq!(entry.record_frame(1.0), None);
        assert_eq!(entry.record_frame(2.0), None);
        assert_eq!(entry.record_frame(1.5), Some(2.0));
        assert_eq!(entry.frames, 3);
        assert_eq!(entry.last_world_time, Some(1.5));
    }
}
