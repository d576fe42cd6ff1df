//! Subject roles and their payloads
//!
//! A role decides the shape of a subject's static data and of every frame
//! sent for it. The five roles share registry, validation and dispatch logic;
//! only the payload types below are role-specific.
//!
//! | Role      | Static data        | Frame data   |
//! |-----------|--------------------|--------------|
//! | Generic   | none               | none         |
//! | Animation | [`AnimationStatic`] | [`Animation`] |
//! | Transform | none               | [`Transform`] |
//! | Camera    | [`CameraStatic`]    | [`Camera`]    |
//! | Light     | [`LightStatic`]     | [`Light`]     |

pub mod animation;
pub mod camera;
pub mod light;
pub mod transform;

pub use animation::{Animation, AnimationStatic, Bone, ROOT_PARENT};
pub use camera::{Camera, CameraStatic, ProjectionMode};
pub use light::{Light, LightKind, LightStatic};
pub use transform::Transform;

use crate::amf::AmfValue;

/// Semantic category of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Generic,
    Animation,
    Transform,
    Camera,
    Light,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Generic => "generic",
            Role::Animation => "animation",
            Role::Transform => "transform",
            Role::Camera => "camera",
            Role::Light => "light",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific static data registered with a subject
#[derive(Debug, Clone, PartialEq)]
pub enum StaticData {
    Generic,
    Animation(AnimationStatic),
    Transform,
    Camera(CameraStatic),
    Light(LightStatic),
}

impl StaticData {
    pub fn role(&self) -> Role {
        match self {
            StaticData::Generic => Role::Generic,
            StaticData::Animation(_) => Role::Animation,
            StaticData::Transform => Role::Transform,
            StaticData::Camera(_) => Role::Camera,
            StaticData::Light(_) => Role::Light,
        }
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        match self {
            StaticData::Generic | StaticData::Transform => AmfValue::Null,
            StaticData::Animation(skeleton) => skeleton.to_amf(),
            StaticData::Camera(lens) => lens.to_amf(),
            StaticData::Light(light) => light.to_amf(),
        }
    }
}

/// Role-specific payload of a single frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameData {
    Generic,
    Animation(Animation),
    Transform(Transform),
    Camera(Camera),
    Light(Light),
}

impl FrameData {
    pub fn role(&self) -> Role {
        match self {
            FrameData::Generic => Role::Generic,
            FrameData::Animation(_) => Role::Animation,
            FrameData::Transform(_) => Role::Transform,
            FrameData::Camera(_) => Role::Camera,
            FrameData::Light(_) => Role::Light,
        }
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        match self {
            FrameData::Generic => AmfValue::Null,
            FrameData::Animation(frame) => frame.to_amf(),
            FrameData::Transform(xform) => xform.to_amf(),
            FrameData::Camera(camera) => camera.to_amf(),
            FrameData::Light(light) => light.to_amf(),
        }
    }
}

impl From<Animation> for FrameData {
    fn from(frame: Animation) -> Self {
        FrameData::Animation(frame)
    }
}

impl From<Transform> for FrameData {
    fn from(xform: Transform) -> Self {
        FrameData::Transform(xform)
    }
}

impl From<Camera> for FrameData {
    fn from(camera: Camera) -> Self {
        FrameData::Camera(camera)
    }
}

impl From<Light> for FrameData {
    fn from(light: Light) -> Self {
        FrameData::Light(light)
    }
}
