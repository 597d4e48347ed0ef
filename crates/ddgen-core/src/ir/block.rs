use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::operations::HttpMethod;

/// Everything needed to render one block and to execute it at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// PascalCase identifier, also the file stem.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Block category; the resource name.
    pub category: String,
    pub inputs: Vec<InputField>,
    pub request: RequestPlan,
    pub output: OutputSpec,
    pub emit: EmitShape,
    /// Lowercase phrase used in error messages: `Failed to <this>: ...`.
    pub operation_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl BlockDefinition {
    pub fn inputs_at(&self, location: InputLocation) -> impl Iterator<Item = &InputField> {
        self.inputs.iter().filter(move |f| f.location == location)
    }

    pub fn input(&self, key: &str) -> Option<&InputField> {
        self.inputs.iter().find(|f| f.key == key)
    }
}

/// Where an input value is placed in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLocation {
    Path,
    Query,
    Header,
    Body,
}

impl InputLocation {
    /// Suffix used to disambiguate clashing identifiers.
    pub fn suffix(&self) -> &'static str {
        match self {
            InputLocation::Path => "Path",
            InputLocation::Query => "Query",
            InputLocation::Header => "Header",
            InputLocation::Body => "Body",
        }
    }
}

/// Conversion applied to a value before it goes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    #[default]
    None,
    /// Arrays are sent as one comma-separated query value.
    JoinComma,
}

impl ValueTransform {
    fn is_none(&self) -> bool {
        matches!(self, ValueTransform::None)
    }
}

/// One configurable input of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    /// camelCase identifier, unique within the block.
    pub key: String,
    /// Name on the wire: path placeholder, query key, header or body property.
    pub wire_name: String,
    pub label: String,
    pub description: String,
    pub required: bool,
    pub location: InputLocation,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Used when the caller leaves the input unset.
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "ValueTransform::is_none")]
    pub transform: ValueTransform,
}

impl InputField {
    /// The host type descriptor, with the example merged in.
    pub fn type_json(&self) -> Value {
        let mut value = self.field_type.to_json();
        if let (Some(example), Value::Object(map)) = (&self.example, &mut value) {
            map.insert("example".to_string(), example.clone());
        }
        value
    }
}

/// How the outbound request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPlan {
    pub method: HttpMethod,
    /// Path template with `{placeholder}` segments, relative to the base URL.
    pub path: String,
    /// Present for POST, PUT and PATCH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyEnvelope>,
}

/// Shape of the request body built from body inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyEnvelope {
    /// Body inputs become the top-level properties.
    Flat,
    /// Body inputs are wrapped as `{data: {type, attributes}}`.
    JsonApi { resource_type: String },
}

/// The block's single output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub description: String,
    pub field_type: FieldType,
}

/// What the emitted event looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmitShape {
    /// The response body as-is.
    Raw,
    /// `{result, operation}`.
    Wrapped { operation: String },
}

/// Host type descriptor for inputs and outputs.
///
/// Serializes to the JSON-Schema-like literal the host expects
/// (`{"type": "string", "enum": [...]}` and so on).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String {
        enum_values: Vec<Value>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array {
        items: Box<FieldType>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    /// Open map with homogeneous values.
    Map {
        values: Box<FieldType>,
    },
    /// Fixed shape; an empty property list is a bare `{type: object}`.
    Object {
        properties: IndexMap<String, FieldType>,
        required: Vec<String>,
    },
}

impl FieldType {
    pub fn string() -> Self {
        FieldType::String {
            enum_values: Vec::new(),
        }
    }

    pub fn any_object() -> Self {
        FieldType::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "string",
            FieldType::Number { .. } => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array { .. } => "array",
            FieldType::Map { .. } | FieldType::Object { .. } => "object",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(self.type_name()));
        match self {
            FieldType::String { enum_values } => {
                if !enum_values.is_empty() {
                    map.insert("enum".to_string(), Value::Array(enum_values.clone()));
                }
            }
            FieldType::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    map.insert("minimum".to_string(), number_value(*min));
                }
                if let Some(max) = maximum {
                    map.insert("maximum".to_string(), number_value(*max));
                }
            }
            FieldType::Boolean => {}
            FieldType::Array {
                items,
                min_items,
                max_items,
            } => {
                map.insert("items".to_string(), items.to_json());
                if let Some(min) = min_items {
                    map.insert("minItems".to_string(), json!(min));
                }
                if let Some(max) = max_items {
                    map.insert("maxItems".to_string(), json!(max));
                }
            }
            FieldType::Map { values } => {
                map.insert("additionalProperties".to_string(), values.to_json());
            }
            FieldType::Object {
                properties,
                required,
            } => {
                if !properties.is_empty() {
                    let props = properties
                        .iter()
                        .map(|(name, ty)| (name.clone(), ty.to_json()))
                        .collect::<Map<_, _>>();
                    map.insert("properties".to_string(), Value::Object(props));
                }
                if !required.is_empty() {
                    map.insert("required".to_string(), json!(required));
                }
            }
        }
        Value::Object(map)
    }

    pub fn from_json(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("type descriptor must be an object, got {value}"))?;
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or("type descriptor is missing `type`")?;
        let u64_field = |key: &str| obj.get(key).and_then(Value::as_u64);
        let f64_field = |key: &str| obj.get(key).and_then(Value::as_f64);

        match type_name {
            "string" => Ok(FieldType::String {
                enum_values: obj
                    .get("enum")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            }),
            "number" | "integer" => Ok(FieldType::Number {
                minimum: f64_field("minimum"),
                maximum: f64_field("maximum"),
            }),
            "boolean" => Ok(FieldType::Boolean),
            "array" => {
                let items = match obj.get("items") {
                    Some(items) => FieldType::from_json(items)?,
                    None => FieldType::string(),
                };
                Ok(FieldType::Array {
                    items: Box::new(items),
                    min_items: u64_field("minItems"),
                    max_items: u64_field("maxItems"),
                })
            }
            "object" => {
                if let Some(values) = obj.get("additionalProperties") {
                    return Ok(FieldType::Map {
                        values: Box::new(FieldType::from_json(values)?),
                    });
                }
                let mut properties = IndexMap::new();
                if let Some(props) = obj.get("properties").and_then(Value::as_object) {
                    for (name, ty) in props {
                        properties.insert(name.clone(), FieldType::from_json(ty)?);
                    }
                }
                let required = obj
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(FieldType::Object {
                    properties,
                    required,
                })
            }
            other => Err(format!("unknown type `{other}`")),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldType::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Whole numbers print without a fractional part.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        json!(n as i64)
    } else {
        json!(n)
    }
}
