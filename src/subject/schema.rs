//! Static subject schema

use crate::amf::AmfValue;
use crate::role::{Role, StaticData};

use super::error::SchemaError;
use super::properties::Properties;

/// The one-time description of a subject: name, role, properties and
/// role-specific static data
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSchema {
    name: String,
    properties: Properties,
    static_data: StaticData,
}

impl SubjectSchema {
    /// Validate and build a schema
    pub fn new(
        name: impl Into<String>,
        properties: Properties,
        static_data: StaticData,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptySubjectName);
        }
        if let StaticData::Animation(skeleton) = &static_data {
            skeleton.validate()?;
        }

        Ok(Self {
            name,
            properties,
            static_data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.static_data.role()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn static_data(&self) -> &StaticData {
        &self.static_data
    }

    /// Encode as the body of a `subject` message
    pub fn to_amf(&self) -> AmfValue {
        let names: Vec<AmfValue> = self
            .properties
            .names()
            .iter()
            .map(|n| n.as_str().into())
            .collect();

        AmfValue::object()
            .with("subject", self.name.as_str())
            .with("role", self.role().as_str())
            .with("properties", names)
            .with("static", self.static_data.to_amf())
            .build()
    }
}
