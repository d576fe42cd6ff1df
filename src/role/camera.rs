//! Camera role payload

use crate::amf::AmfValue;

use super::transform::Transform;

/// Camera projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "orthographic",
        }
    }
}

/// Lens and sensor description sent once at setup
///
/// The `is_*_supported` flags tell the consumer which per-frame fields are
/// meaningful for this camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraStatic {
    pub is_field_of_view_supported: bool,
    pub is_aspect_ratio_supported: bool,
    pub is_focal_length_supported: bool,
    pub is_projection_mode_supported: bool,
    pub is_aperture_supported: bool,
    pub is_focus_distance_supported: bool,
    /// Sensor width in millimetres
    pub film_back_width: f32,
    /// Sensor height in millimetres
    pub film_back_height: f32,
    pub min_focal_length: f32,
    pub max_focal_length: f32,
}

impl CameraStatic {
    /// Zeroed descriptor with every feature unsupported
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        AmfValue::object()
            .with("isFieldOfViewSupported", self.is_field_of_view_supported)
            .with("isAspectRatioSupported", self.is_aspect_ratio_supported)
            .with("isFocalLengthSupported", self.is_focal_length_supported)
            .with("isProjectionModeSupported", self.is_projection_mode_supported)
            .with("isApertureSupported", self.is_aperture_supported)
            .with("isFocusDistanceSupported", self.is_focus_distance_supported)
            .with("filmBackWidth", self.film_back_width)
            .with("filmBackHeight", self.film_back_height)
            .with("minFocalLength", self.min_focal_length)
            .with("maxFocalLength", self.max_focal_length)
            .build()
    }
}

/// Per-frame camera values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    /// Horizontal field of view in degrees
    pub field_of_view: f32,
    pub aspect_ratio: f32,
    /// Focal length in millimetres
    pub focal_length: f32,
    /// f-stop
    pub aperture: f32,
    pub focus_distance: f32,
    pub projection_mode: ProjectionMode,
}

impl Camera {
    /// Identity transform, zeroed lens values, perspective projection
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        AmfValue::object()
            .with("transform", self.transform.to_amf())
            .with("fieldOfView", self.field_of_view)
            .with("aspectRatio", self.aspect_ratio)
            .with("focalLength", self.focal_length)
            .with("aperture", self.aperture)
            .with("focusDistance", self.focus_distance)
            .with("projectionMode", self.projection_mode.as_str())
            .build()
    }
}
