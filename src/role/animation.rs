//! Animation role payload
//!
//! Static data is a bone hierarchy: each bone has a name and the index of its
//! parent (`-1` for a root). Frames carry one local transform per bone,
//! index-aligned to the hierarchy.

use crate::amf::AmfValue;
use crate::subject::SchemaError;

use super::transform::Transform;

/// Parent index of a root bone
pub const ROOT_PARENT: i32 = -1;

/// A single bone in the skeleton hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub name: String,
    pub parent: i32,
}

/// Skeleton hierarchy for an Animation subject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationStatic {
    pub bones: Vec<Bone>,
}

impl AnimationStatic {
    /// Empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone and return its index
    pub fn push_bone(&mut self, name: impl Into<String>, parent: i32) -> usize {
        self.bones.push(Bone {
            name: name.into(),
            parent,
        });
        self.bones.len() - 1
    }

    /// Builder form of [`push_bone`](Self::push_bone)
    pub fn with_bone(mut self, name: impl Into<String>, parent: i32) -> Self {
        self.push_bone(name, parent);
        self
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Check that every parent is a root marker or an earlier bone
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (index, bone) in self.bones.iter().enumerate() {
            let valid = bone.parent == ROOT_PARENT
                || (bone.parent >= 0 && (bone.parent as usize) < index);
            if !valid {
                return Err(SchemaError::InvalidParent {
                    bone: bone.name.clone(),
                    parent: bone.parent,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        let names: Vec<AmfValue> = self.bones.iter().map(|b| b.name.as_str().into()).collect();
        let parents: Vec<AmfValue> = self.bones.iter().map(|b| b.parent.into()).collect();
        AmfValue::object()
            .with("boneNames", names)
            .with("boneParents", parents)
            .build()
    }
}

/// Per-frame bone transforms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub transforms: Vec<Transform>,
}

impl Animation {
    /// Empty frame; every bone falls back to identity when sent
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame with `bone_count` identity transforms
    pub fn with_bone_count(bone_count: usize) -> Self {
        Self {
            transforms: vec![Transform::identity(); bone_count],
        }
    }

    /// Resize to the skeleton: missing bones become identity, extra bones are dropped
    pub(crate) fn aligned_to(&self, bone_count: usize) -> Self {
        let mut transforms = self.transforms.clone();
        transforms.resize(bone_count, Transform::identity());
        Self { transforms }
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        let transforms: Vec<AmfValue> = self.transforms.iter().map(Transform::to_amf).collect();
        AmfValue::object().with("transforms", transforms).build()
    }
}
