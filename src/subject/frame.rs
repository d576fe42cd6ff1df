//! Frame encoding
//!
//! A [`FrameUpdate`] is built from a per-frame snapshot and validated against
//! the subject's registered schema. Validation only rejects a role mismatch;
//! count mismatches are resolved so that something is always delivered:
//!
//! - property values: missing slots are zero, excess values are ignored
//! - animation bones: missing bones are identity, excess bones are ignored
//!
//! Omitted property values stay omitted; the consumer keeps its last values.

use crate::amf::AmfValue;
use crate::role::{FrameData, StaticData};

use super::error::FrameError;
use super::metadata::Metadata;
use super::properties::{Alignment, PropertyValues};
use super::schema::SubjectSchema;

/// A single encoded frame for one subject
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    subject: String,
    world_time: f64,
    metadata: Option<Metadata>,
    property_values: Option<Vec<f32>>,
    data: FrameData,
}

impl FrameUpdate {
    /// Validate a frame against `schema` and normalize it to the schema's shape
    pub fn encode(
        schema: &SubjectSchema,
        world_time: f64,
        metadata: Option<&Metadata>,
        values: Option<&PropertyValues>,
        data: FrameData,
    ) -> Result<Self, FrameError> {
        if data.role() != schema.role() {
            return Err(FrameError::RoleMismatch {
                subject: schema.name().to_string(),
                registered: schema.role(),
                supplied: data.role(),
            });
        }

        let expected = schema.properties().len();
        let property_values = values.map(|values| {
            let (aligned, alignment) = values.align(expected);
            if alignment != Alignment::Exact {
                tracing::debug!(
                    subject = schema.name(),
                    expected = expected,
                    supplied = values.len(),
                    alignment = ?alignment,
                    "Property values aligned to schema"
                );
            }
            aligned
        });

        let data = match (data, schema.static_data()) {
            (FrameData::Animation(frame), StaticData::Animation(skeleton))
                if frame.transforms.len() != skeleton.bone_count() =>
            {
                tracing::debug!(
                    subject = schema.name(),
                    bones = skeleton.bone_count(),
                    supplied = frame.transforms.len(),
                    "Bone transforms aligned to skeleton"
                );
                FrameData::Animation(frame.aligned_to(skeleton.bone_count()))
            }
            (data, _) => data,
        };

        Ok(Self {
            subject: schema.name().to_string(),
            world_time,
            metadata: metadata.cloned(),
            property_values,
            data,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Values aligned to the schema's properties, `None` when omitted
    pub fn property_values(&self) -> Option<&[f32]> {
        self.property_values.as_deref()
    }

    pub fn data(&self) -> &FrameData {
        &self.data
    }

    /// Encode as the body of a `frame` message
    ///
    /// `propertyValues` is left out entirely when the producer omitted them.
    pub fn to_amf(&self) -> AmfValue {
        let mut body = AmfValue::object()
            .with("subject", self.subject.as_str())
            .with("role", self.data.role().as_str())
            .with("worldTime", self.world_time)
            .with("metadata", self.metadata.as_ref().map(Metadata::to_amf));

        if let Some(values) = &self.property_values {
            let values: Vec<AmfValue> = values.iter().map(|v| (*v).into()).collect();
            body = body.with("propertyValues", values);
        }

        body.with("data", self.data.to_amf()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{Animation, AnimationStatic, Camera, Role, Transform, ROOT_PARENT};
    use crate::subject::Properties;

    fn transform_schema(props: Properties) -> SubjectSchema {
        SubjectSchema::new("circle", props, StaticData::Transform).unwrap()
    }

    #[test]
    fn test_transform_frame_payload() {
        let schema = transform_schema(Properties::none());
        let mut xform = Transform::identity();
        xform.translation = [200.0, 0.0, 100.0];

        let frame = FrameUpdate::encode(&schema, 16.0, None, None, xform.into()).unwrap();
        let value = frame.to_amf();

        assert_eq!(
            value.get("data").and_then(|d| d.get_numbers("translation")),
            Some(vec![200.0, 0.0, 100.0])
        );
        assert!(value.get("propertyValues").is_none());
        assert!(value.get("metadata").unwrap().is_null());
        assert_eq!(value.get_number("worldTime"), Some(16.0));
    }

    #[test]
    fn test_role_mismatch_rejected() {
        let schema = transform_schema(Properties::none());
        let result = FrameUpdate::encode(&schema, 0.0, None, None, Camera::new().into());

        assert_eq!(
            result,
            Err(FrameError::RoleMismatch {
                subject: "circle".into(),
                registered: Role::Transform,
                supplied: Role::Camera,
            })
        );
    }

    #[test]
    fn test_missing_property_values_zero_filled() {
        let schema = transform_schema(Properties::new(["a", "b", "c"]).unwrap());
        let values = PropertyValues::new(vec![7.0]);

        let frame = FrameUpdate::encode(
            &schema,
            0.0,
            None,
            Some(&values),
            Transform::identity().into(),
        )
        .unwrap();
        assert_eq!(frame.property_values(), Some(&[7.0, 0.0, 0.0][..]));
        assert_eq!(
            frame.to_amf().get_numbers("propertyValues"),
            Some(vec![7.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_omitted_property_values_stay_omitted() {
        let schema = SubjectSchema::new(
            "lens",
            Properties::new(["a", "b"]).unwrap(),
            StaticData::Generic,
        )
        .unwrap();
        let frame = FrameUpdate::encode(&schema, 0.0, None, None, FrameData::Generic).unwrap();

        assert_eq!(frame.property_values(), None);
        assert!(frame.to_amf().get("propertyValues").is_none());
    }

    #[test]
    fn test_empty_property_values_still_sent() {
        let schema = transform_schema(Properties::none());
        let values = PropertyValues::new(Vec::<f32>::new());
        let frame = FrameUpdate::encode(
            &schema,
            0.0,
            None,
            Some(&values),
            Transform::identity().into(),
        )
        .unwrap();

        assert_eq!(frame.property_values(), Some(&[][..]));
        assert_eq!(frame.to_amf().get_numbers("propertyValues"), Some(vec![]));
    }

    #[test]
    fn test_animation_bones_aligned() {
        let skeleton = AnimationStatic::new()
            .with_bone("root", ROOT_PARENT)
            .with_bone("spine", 0);
        let static_data = StaticData::Animation(skeleton);
        let schema = SubjectSchema::new("actor", Properties::none(), static_data).unwrap();

        let frame = FrameUpdate::encode(&schema, 0.0, None, None, Animation::new().into()).unwrap();
        match frame.data() {
            FrameData::Animation(anim) => {
                assert_eq!(anim.transforms, vec![Transform::identity(); 2]);
            }
            other => panic!("expected animation frame, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_carried() {
        let schema = SubjectSchema::new("props", Properties::none(), StaticData::Generic).unwrap();
        let mut meta = Metadata::new();
        meta.frame_number = 12;

        let frame =
            FrameUpdate::encode(&schema, 1.0, Some(&meta), None, FrameData::Generic).unwrap();
        assert_eq!(frame.metadata().map(|m| m.frame_number), Some(12));
        assert_eq!(
            frame.to_amf().get("metadata").and_then(|m| m.get_number("frameNumber")),
            Some(12.0)
        );
    }
}
