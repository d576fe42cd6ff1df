//! Optional per-frame metadata

use std::collections::BTreeMap;

use crate::amf::amf0::MAX_KEY_LEN;
use crate::amf::AmfValue;

/// Frame rate as a rational number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: i32,
    pub denominator: i32,
}

impl FrameRate {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frames per second, or `None` for a zero denominator
    pub fn as_f64(&self) -> Option<f64> {
        (self.denominator != 0).then(|| self.numerator as f64 / self.denominator as f64)
    }
}

/// Auxiliary fields attached to a frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub frame_number: i32,
    pub frame_rate: FrameRate,
    pub tags: BTreeMap<String, String>,
}

impl Metadata {
    /// All-zero metadata with no tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string tag, replacing any previous value
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Encode for a `frame` body
    ///
    /// Tags whose key is empty or longer than an AMF0 key allows cannot be
    /// sent intact; they are dropped with a warning.
    pub(crate) fn to_amf(&self) -> AmfValue {
        let mut tags = BTreeMap::new();
        for (key, value) in &self.tags {
            if key.is_empty() || key.len() > MAX_KEY_LEN {
                tracing::warn!(
                    key_len = key.len(),
                    max = MAX_KEY_LEN,
                    "Metadata tag dropped, key cannot be encoded"
                );
                continue;
            }
            tags.insert(key.clone(), AmfValue::from(value.as_str()));
        }

        AmfValue::object()
            .with("frameNumber", self.frame_number)
            .with("frameRateNumerator", self.frame_rate.numerator)
            .with("frameRateDenominator", self.frame_rate.denominator)
            .with("tags", AmfValue::Object(tags))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let meta = Metadata::new();
        assert_eq!(meta.frame_number, 0);
        assert_eq!(meta.frame_rate, FrameRate::default());
        assert!(meta.tags.is_empty());
        assert_eq!(meta.frame_rate.as_f64(), None);
    }

    #[test]
    fn test_encoding_with_tags() {
        let mut meta = Metadata::new();
        meta.frame_number = 42;
        meta.frame_rate = FrameRate::new(30000, 1001);
        meta.set_tag("take", "7");

        let value = meta.to_amf();
        assert_eq!(value.get_number("frameNumber"), Some(42.0));
        assert_eq!(value.get("tags").and_then(|t| t.get_string("take")), Some("7"));
        assert!((meta.frame_rate.as_f64().unwrap() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_unencodable_tag_keys_dropped() {
        let mut meta = Metadata::new();
        meta.set_tag("", "empty");
        meta.set_tag("k".repeat(MAX_KEY_LEN + 1), "huge");
        meta.set_tag("k".repeat(MAX_KEY_LEN), "fits");
        meta.set_tag("take", "7");

        let value = meta.to_amf();
        let tags = value.get("tags").and_then(AmfValue::as_object).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(value.get("tags").and_then(|t| t.get_string("take")), Some("7"));
        assert!(tags.contains_key(&"k".repeat(MAX_KEY_LEN)));
        assert!(!tags.contains_key(""));
    }
}
