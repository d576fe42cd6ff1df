//! Transform role payload
//!
//! The Transform role has no static data beyond its property set; each frame
//! carries a single translation/rotation/scale.

use crate::amf::AmfValue;

/// Translation, rotation (quaternion `x, y, z, w`) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale
    pub const fn identity() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Identity rotation and scale at the given translation
    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        AmfValue::object()
            .with("translation", self.translation)
            .with("rotation", self.rotation)
            .with("scale", self.scale)
            .build()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_defaults() {
        let xform = Transform::default();
        assert_eq!(xform.translation, [0.0, 0.0, 0.0]);
        assert_eq!(xform.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(xform.scale, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_partial_overwrite_keeps_identity() {
        let mut xform = Transform::identity();
        xform.translation[2] = 100.0;

        assert_eq!(xform.translation, [0.0, 0.0, 100.0]);
        assert_eq!(xform.rotation, Transform::identity().rotation);
        assert_eq!(xform.scale, Transform::identity().scale);
    }

    #[test]
    fn test_encoding() {
        let value = Transform::from_translation([200.0, 0.0, 100.0]).to_amf();
        assert_eq!(value.get_numbers("translation"), Some(vec![200.0, 0.0, 100.0]));
        assert_eq!(value.get_numbers("rotation"), Some(vec![0.0, 0.0, 0.0, 1.0]));
        assert_eq!(value.get_numbers("scale"), Some(vec![1.0, 1.0, 1.0]));
    }
}
