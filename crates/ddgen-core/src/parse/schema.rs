use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::Reference;

/// Schema position in the document: a `$ref` or an inline schema.
pub type SchemaRef = Reference<Box<Schema>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// `type: string` or the 3.1 form `type: [string, "null"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeKeyword {
    One(JsonType),
    Many(Vec<JsonType>),
}

impl TypeKeyword {
    pub fn primary(&self) -> Option<JsonType> {
        match self {
            TypeKeyword::One(ty) => Some(*ty),
            TypeKeyword::Many(types) => types.iter().copied().find(|ty| *ty != JsonType::Null),
        }
    }
}

/// The JSON Schema keywords block inputs and outputs are derived from.
/// `oneOf`/`anyOf` unions are not modelled and read as untyped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub types: Option<TypeKeyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<OpenMap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

/// `additionalProperties`: a flag or the schema of the map values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenMap {
    Flag(bool),
    Values(SchemaRef),
}
