// Schema definition types.
//
// A Schema describes the fields of one collection. Document stores remain
// schemaless; backends use these definitions only for what they can enforce
// (unique/secondary indexes at connect time).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field types supported by the schema system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

/// A single field definition within a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    /// The field's data type.
    pub field_type: FieldType,
    /// Whether the field is required (non-nullable).
    #[serde(default)]
    pub required: bool,
    /// Whether the field must be unique across documents.
    #[serde(default)]
    pub unique: bool,
    /// Whether the field carries a secondary index.
    #[serde(default)]
    pub index: bool,
    /// Default value for the field (as JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl SchemaField {
    /// Create a required string field.
    pub fn required_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: true,
            unique: false,
            index: false,
            default_value: None,
        }
    }

    /// Create an optional string field.
    pub fn optional_string() -> Self {
        Self {
            required: false,
            ..Self::required_string()
        }
    }

    /// Create an optional number field.
    pub fn number() -> Self {
        Self {
            field_type: FieldType::Number,
            required: false,
            ..Self::required_string()
        }
    }

    /// Create a boolean field with a default value.
    pub fn boolean(default: bool) -> Self {
        Self {
            field_type: FieldType::Boolean,
            required: false,
            default_value: Some(serde_json::Value::Bool(default)),
            ..Self::required_string()
        }
    }

    /// Create a required date field.
    pub fn date() -> Self {
        Self {
            field_type: FieldType::Date,
            ..Self::required_string()
        }
    }

    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A complete collection schema — a named-field map.
///
/// BTreeMap keeps field iteration (and so index creation) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: BTreeMap<String, SchemaField>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field definition, builder-style.
    pub fn field(mut self, name: &str, field: SchemaField) -> Self {
        self.fields.insert(name.to_string(), field);
        self
    }

    /// Fields that need an index: unique or explicitly indexed, excluding
    /// the store's own id field.
    pub fn indexed_fields(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.fields
            .iter()
            .filter(|(name, field)| (field.unique || field.index) && name.as_str() != "_id")
            .map(|(name, field)| (name.as_str(), field))
    }
}
