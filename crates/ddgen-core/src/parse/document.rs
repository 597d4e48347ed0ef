//! Serde model of the parts of an OpenAPI 3.x document block generation
//! reads. Servers, security schemes, callbacks and links are skipped while
//! deserializing.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::schema::SchemaRef;
use crate::ir::HttpMethod;

/// A document fragment that did not match the model. The raw value is kept
/// so the document still serializes unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    pub raw: Value,
    pub reason: String,
}

/// A fragment decoded on its own, so a bad entry stays local to the
/// operation or schema that holds it instead of failing the whole document.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    Valid(T),
    Malformed(Malformed),
}

impl<T: DeserializeOwned> Lenient<T> {
    fn decode(raw: Value) -> Self {
        match T::deserialize(&raw) {
            Ok(value) => Lenient::Valid(value),
            Err(err) => Lenient::Malformed(Malformed {
                raw,
                reason: err.to_string(),
            }),
        }
    }
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(value) => Some(value),
            Lenient::Malformed(_) => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Lenient::decode)
    }
}

impl<T: Serialize> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Lenient::Valid(value) => value.serialize(serializer),
            Lenient::Malformed(bad) => bad.raw.serialize(serializer),
        }
    }
}

/// A `$ref` pointer, an inline definition, or an inline entry that failed
/// to decode.
///
/// Any object carrying a string `$ref` is a pointer, sibling keys are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<T> {
    Pointer { target: String },
    Inline(T),
    Malformed(Malformed),
}

impl<T> Reference<T> {
    pub fn pointer(target: impl Into<String>) -> Self {
        Reference::Pointer {
            target: target.into(),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Reference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if let Some(target) = raw.get("$ref").and_then(Value::as_str) {
            return Ok(Reference::pointer(target));
        }
        Ok(match Lenient::<T>::decode(raw) {
            Lenient::Valid(value) => Reference::Inline(value),
            Lenient::Malformed(bad) => Reference::Malformed(bad),
        })
    }
}

impl<T: Serialize> Serialize for Reference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reference::Pointer { target } => {
                let mut pointer = serde_json::Map::new();
                pointer.insert("$ref".to_string(), Value::String(target.clone()));
                pointer.serialize(serializer)
            }
            Reference::Inline(value) => value.serialize(serializer),
            Reference::Malformed(bad) => bad.raw.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, Lenient<PathItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// Entry of the document-level `tags` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reusable definitions addressed by `#/components/<section>/<name>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaRef>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Reference<Parameter>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, Reference<RequestBody>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Reference<Response>>,
}

/// Operations under one path template. `options`, `head` and `trace` are
/// never turned into blocks and are not modelled. Each operation decodes
/// on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// Shared by every operation below; an operation entry with the same
    /// name and location wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Reference<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Lenient<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Lenient<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Lenient<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Lenient<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Lenient<Operation>>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Lenient<Operation>> {
        let slot = match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Put => &self.put,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Patch => &self.patch,
        };
        slot.as_ref()
    }

    /// Declared operations, always in get, post, put, delete, patch order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Lenient<Operation>)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| Some((method, self.operation(method)?)))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Reference<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Reference<RequestBody>>,
    /// Keyed by status code as written in the document (`"200"`, `"default"`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Reference<Response>>,
}

/// Where a parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

impl RequestBody {
    /// Schema of the JSON entry, or of the first declared media type.
    pub fn preferred_schema(&self) -> Option<&SchemaRef> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .or_else(|| self.content.values().next())?
            .schema
            .as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    pub fn json(&self) -> Option<&MediaType> {
        self.content.get(JSON_MEDIA_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

const JSON_MEDIA_TYPE: &str = "application/json";
