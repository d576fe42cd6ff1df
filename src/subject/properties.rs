//! Named float properties
//!
//! A [`Properties`] set is fixed when a subject is registered. Every frame
//! then carries a parallel list of values; see [`PropertyValues::align`] for
//! how count mismatches are resolved.

use std::collections::HashSet;

use super::error::PropertyError;

/// Ordered, unique property names attached to a subject's schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    names: Vec<String>,
}

impl Properties {
    /// Build a property set, rejecting empty or duplicate names
    pub fn new<I, S>(names: I) -> Result<Self, PropertyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(names.len());

        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(PropertyError::EmptyName { index });
            }
            if !seen.insert(name.as_str()) {
                return Err(PropertyError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// The empty property set
    pub fn none() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of aligning per-frame values to a property set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Value count matched the property count
    Exact,
    /// This many trailing values were missing and sent as zero
    ZeroFilled(usize),
    /// This many excess values were ignored
    Truncated(usize),
}

/// Per-frame property values, positionally aligned to [`Properties`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyValues {
    values: Vec<f32>,
}

impl PropertyValues {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resize to `count` values: missing slots are zero, excess values dropped
    pub fn align(&self, count: usize) -> (Vec<f32>, Alignment) {
        let supplied = self.values.len();
        let mut aligned = self.values.clone();
        aligned.resize(count, 0.0);

        let alignment = if supplied < count {
            Alignment::ZeroFilled(count - supplied)
        } else if supplied > count {
            Alignment::Truncated(supplied - count)
        } else {
            Alignment::Exact
        };

        (aligned, alignment)
    }
}

impl From<Vec<f32>> for PropertyValues {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_names() {
        let props = Properties::new(["focus", "iris", "zoom"]).unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props.names()[1], "iris");
        assert!(Properties::none().is_empty());
    }

    #[test]
    fn test_duplicate_name_reported() {
        let result = Properties::new(["focus", "iris", "focus"]);
        assert_eq!(result, Err(PropertyError::Duplicate("focus".into())));
    }

    #[test]
    fn test_empty_name_reported() {
        let result = Properties::new(vec!["a".to_string(), String::new()]);
        assert_eq!(result, Err(PropertyError::EmptyName { index: 1 }));
    }

    #[test]
    fn test_align_zero_fills_missing() {
        let values = PropertyValues::new(vec![0.5]);
        let (aligned, alignment) = values.align(3);
        assert_eq!(aligned, vec![0.5, 0.0, 0.0]);
        assert_eq!(alignment, Alignment::ZeroFilled(2));
    }

    #[test]
    fn test_align_ignores_excess() {
        let values = PropertyValues::new(vec![1.0, 2.0, 3.0]);
        let (aligned, alignment) = values.align(1);
        assert_eq!(aligned, vec![1.0]);
        assert_eq!(alignment, Alignment::Truncated(2));
    }

    #[test]
    fn test_align_exact() {
        let values = PropertyValues::from(vec![1.0, 2.0]);
        assert_eq!(values.align(2), (vec![1.0, 2.0], Alignment::Exact));
    }
}
