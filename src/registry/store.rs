//! Subject registry implementation
//!
//! The single source of truth for which subjects exist and what their schemas
//! are. Snapshots drive the replay a consumer receives when it (re)connects.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::role::FrameData;
use crate::subject::{FrameError, FrameUpdate, Metadata, PropertyValues, SubjectSchema};

use super::entry::{SubjectEntry, SubjectStats};
use super::error::RegistryError;

/// Outcome of [`SubjectRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First registration under this name
    Inserted,
    /// An existing schema was replaced
    Replaced { previous: crate::role::Role },
    /// An identical schema was already registered
    Unchanged,
}

impl Registration {
    /// Whether the consumer needs to see the schema again
    pub fn is_changed(&self) -> bool {
        !matches!(self, Registration::Unchanged)
    }
}

#[derive(Default)]
struct Inner {
    subjects: HashMap<String, SubjectEntry>,
    next_sequence: u64,
}

/// Registry of all declared subjects
///
/// Thread-safe via `RwLock`; the producer thread writes while the background
/// monitor takes snapshots for replay.
#[derive(Default)]
pub struct SubjectRegistry {
    inner: RwLock<Inner>,
}

impl SubjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register or replace a subject's schema
    ///
    /// A replacement keeps the subject's position in replay order but resets
    /// its frame bookkeeping.
    pub fn register(&self, schema: SubjectSchema) -> (Arc<SubjectSchema>, Registration) {
        let mut inner = self.write();

        if let Some(entry) = inner.subjects.get_mut(schema.name()) {
            if *entry.schema == schema {
                tracing::debug!(subject = schema.name(), "Subject re-registered unchanged");
                return (Arc::clone(&entry.schema), Registration::Unchanged);
            }

            let previous = entry.schema.role();
            let sequence = entry.sequence;
            *entry = SubjectEntry::new(schema, sequence);

            tracing::info!(
                subject = entry.schema.name(),
                role = %entry.schema.role(),
                previous = %previous,
                "Subject replaced"
            );
            return (Arc::clone(&entry.schema), Registration::Replaced { previous });
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let entry = SubjectEntry::new(schema, sequence);
        let schema = Arc::clone(&entry.schema);
        tracing::info!(
            subject = schema.name(),
            role = %schema.role(),
            properties = schema.properties().len(),
            "Subject registered"
        );
        inner.subjects.insert(schema.name().to_string(), entry);

        (schema, Registration::Inserted)
    }

    /// Current schema for a subject
    pub fn lookup(&self, name: &str) -> Result<Arc<SubjectSchema>, RegistryError> {
        self.read()
            .subjects
            .get(name)
            .map(|entry| Arc::clone(&entry.schema))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Validate and encode a frame against the subject's current schema
    ///
    /// World time going backwards is logged but the frame is still produced.
    pub fn encode_frame(
        &self,
        name: &str,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        data: FrameData,
    ) -> Result<FrameUpdate, FrameError> {
        let mut inner = self.write();
        let entry = inner
            .subjects
            .get_mut(name)
            .ok_or_else(|| FrameError::NotRegistered(name.to_string()))?;

        let frame = FrameUpdate::encode(&entry.schema, world_time, metadata, values, data)?;

        if let Some(previous) = entry.record_frame(world_time) {
            tracing::warn!(
                subject = name,
                world_time = world_time,
                previous = previous,
                "World time went backwards"
            );
        }

        Ok(frame)
    }

    /// All schemas in registration order
    pub fn snapshot(&self) -> Vec<Arc<SubjectSchema>> {
        let inner = self.read();
        let mut entries: Vec<&SubjectEntry> = inner.subjects.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries
            .into_iter()
            .map(|entry| Arc::clone(&entry.schema))
            .collect()
    }

    /// Get subject statistics
    pub fn subject_stats(&self, name: &str) -> Option<SubjectStats> {
        self.read().subjects.get(name).map(|entry| SubjectStats {
            role: entry.schema.role(),
            frames: entry.frames,
            last_world_time: entry.last_world_time,
            age: entry.registered_at.elapsed(),
        })
    }

    /// Drop every subject
    pub fn clear(&self) {
        let mut inner = self.write();
        let removed = inner.subjects.len();
        inner.subjects.clear();
        inner.next_sequence = 0;
        tracing::debug!(removed = removed, "Registry cleared");
    }

    /// Get total number of subjects
    pub fn len(&self) -> usize {
        self.read().subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{Camera, CameraStatic, Light, LightStatic, Role, StaticData, Transform};
    use crate::subject::Properties;

    fn schema(name: &str, static_data: StaticData) -> SubjectSchema {
        SubjectSchema::new(name, Properties::none(), static_data).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = SubjectRegistry::new();

        let (_, outcome) = registry.register(schema("circle", StaticData::Transform));
        assert_eq!(outcome, Registration::Inserted);

        let found = registry.lookup("circle").unwrap();
        assert_eq!(found.role(), Role::Transform);

        assert_eq!(
            registry.lookup("square"),
            Err(RegistryError::NotFound("square".into()))
        );
    }

    #[test]
    fn test_update_before_registration() {
        let registry = SubjectRegistry::new();
        let result =
            registry.encode_frame("ghost", 0.0, None, None, Transform::identity().into());
        assert_eq!(result, Err(FrameError::NotRegistered("ghost".into())));
    }

    #[test]
    fn test_reregister_replaces_role() {
        let registry = SubjectRegistry::new();
        registry.register(schema("thing", StaticData::Transform));

        let camera = StaticData::Camera(CameraStatic::new());
        let (_, outcome) = registry.register(schema("thing", camera));
        assert_eq!(
            outcome,
            Registration::Replaced {
                previous: Role::Transform
            }
        );
        assert_eq!(registry.len(), 1);

        // Old payload type is now a mismatch
        let result =
            registry.encode_frame("thing", 0.0, None, None, Transform::identity().into());
        assert!(matches!(result, Err(FrameError::RoleMismatch { .. })));

        let result = registry.encode_frame("thing", 0.0, None, None, Camera::new().into());
        assert!(result.is_ok());
    }

    #[test]
    fn test_identical_registration_unchanged() {
        let registry = SubjectRegistry::new();
        registry.register(schema("lamp", StaticData::Light(LightStatic::new())));

        let (_, outcome) = registry.register(schema("lamp", StaticData::Light(LightStatic::new())));
        assert_eq!(outcome, Registration::Unchanged);
        assert!(!outcome.is_changed());
    }

    #[test]
    fn test_snapshot_registration_order() {
        let registry = SubjectRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(schema(name, StaticData::Generic));
        }
        // Replacement keeps position
        registry.register(schema("a", StaticData::Transform));

        let names: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_frame_bookkeeping() {
        let registry = SubjectRegistry::new();
        registry.register(schema("lamp", StaticData::Light(LightStatic::new())));

        registry
            .encode_frame("lamp", 2.0, None, None, Light::new().into())
            .unwrap();
        // Backwards world time still delivers
        registry
            .encode_frame("lamp", 1.0, None, None, Light::new().into())
            .unwrap();

        let stats = registry.subject_stats("lamp").unwrap();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.last_world_time, Some(1.0));
        assert_eq!(stats.role, Role::Light);
    }

    #[test]
    fn test_clear() {
        let registry = SubjectRegistry::new();
        registry.register(schema("a", StaticData::Generic));
        registry.register(schema("b", StaticData::Generic));
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
        assert!(registry.lookup("a").is_err());
    }
}
