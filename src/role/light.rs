//! Light role payload

use crate::amf::AmfValue;

use super::transform::Transform;

/// Kind of light source described by a Light subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightKind {
    #[default]
    Point,
    Spot,
    Directional,
    Rect,
}

impl LightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightKind::Point => "point",
            LightKind::Spot => "spot",
            LightKind::Directional => "directional",
            LightKind::Rect => "rect",
        }
    }
}

/// Light description sent once at setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightStatic {
    pub kind: LightKind,
    pub is_temperature_supported: bool,
    pub is_intensity_supported: bool,
    pub is_light_color_supported: bool,
    pub is_inner_cone_angle_supported: bool,
    pub is_outer_cone_angle_supported: bool,
    pub is_attenuation_radius_supported: bool,
    pub is_source_length_supported: bool,
    pub is_source_radius_supported: bool,
    pub is_soft_source_radius_supported: bool,
}

impl LightStatic {
    /// Point light with every feature unsupported
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        AmfValue::object()
            .with("kind", self.kind.as_str())
            .with("isTemperatureSupported", self.is_temperature_supported)
            .with("isIntensitySupported", self.is_intensity_supported)
            .with("isLightColorSupported", self.is_light_color_supported)
            .with("isInnerConeAngleSupported", self.is_inner_cone_angle_supported)
            .with("isOuterConeAngleSupported", self.is_outer_cone_angle_supported)
            .with("isAttenuationRadiusSupported", self.is_attenuation_radius_supported)
            .with("isSourceLengthSupported", self.is_source_length_supported)
            .with("isSourceRadiusSupported", self.is_source_radius_supported)
            .with("isSoftSourceRadiusSupported", self.is_soft_source_radius_supported)
            .build()
    }
}

/// Per-frame light values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Light {
    pub transform: Transform,
    /// Color temperature in Kelvin
    pub temperature: f32,
    pub intensity: f32,
    /// RGBA
    pub light_color: [u8; 4],
    /// Degrees
    pub inner_cone_angle: f32,
    /// Degrees
    pub outer_cone_angle: f32,
    pub attenuation_radius: f32,
    pub source_radius: f32,
    pub soft_source_radius: f32,
    pub source_length: f32,
}

impl Light {
    /// Identity transform with all light values zeroed
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn to_amf(&self) -> AmfValue {
        AmfValue::object()
            .with("transform", self.transform.to_amf())
            .with("temperature", self.temperature)
            .with("intensity", self.intensity)
            .with("lightColor", self.light_color)
            .with("innerConeAngle", self.inner_cone_angle)
            .with("outerConeAngle", self.outer_cone_angle)
            .with("attenuationRadius", self.attenuation_radius)
            .with("sourceRadius", self.source_radius)
            .with("softSourceRadius", self.soft_source_radius)
            .with("sourceLength", self.source_length)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zeroed() {
        let light = Light::new();
        assert_eq!(light.transform, Transform::identity());
        assert_eq!(light.intensity, 0.0);
        assert_eq!(light.light_color, [0, 0, 0, 0]);

        let descriptor = LightStatic::new();
        assert_eq!(descriptor.kind, LightKind::Point);
        assert!(!descriptor.is_intensity_supported);
    }

    #[test]
    fn test_frame_encoding() {
        let light = Light {
            intensity: 5000.0,
            light_color: [255, 128, 0, 255],
            outer_cone_angle: 44.0,
            ..Light::new()
        };
        let value = light.to_amf();

        assert_eq!(value.get_number("intensity"), Some(5000.0));
        assert_eq!(value.get_numbers("lightColor"), Some(vec![255.0, 128.0, 0.0, 255.0]));
        assert_eq!(value.get_number("outerConeAngle"), Some(44.0));
    }

    #[test]
    fn test_static_encoding() {
        let descriptor = LightStatic {
            kind: LightKind::Spot,
            is_outer_cone_angle_supported: true,
            ..LightStatic::new()
        };
        let value = descriptor.to_amf();
        assert_eq!(value.get_string("kind"), Some("spot"));
        assert_eq!(
            value.get("isOuterConeAngleSupported").and_then(AmfValue::as_bool),
            Some(true)
        );
    }
}
