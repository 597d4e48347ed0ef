use indexmap::IndexMap;
use serde_json::Value;

/// A ref-free schema. Built by the resolver from the document's `Schema`
/// tree; every `$ref` has already been replaced by its target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub example: Option<Value>,
    pub default_value: Option<Value>,
}

/// The structural shape of a schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaKind {
    String {
        enum_values: Vec<Value>,
        format: Option<String>,
    },
    Number {
        integer: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array {
        items: Option<Box<SchemaNode>>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Object {
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
        additional: Option<AdditionalNode>,
    },
    /// No usable `type` (composition-only schemas, bare `{}`).
    #[default]
    Untyped,
}

/// Value schema of an open map.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalNode {
    /// `additionalProperties: true`
    Any,
    Schema(Box<SchemaNode>),
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// `{type: string}`
    pub fn string() -> Self {
        Self::new(SchemaKind::String {
            enum_values: Vec::new(),
            format: None,
        })
    }

    /// `{type: object}` with no declared shape; stands in for unresolvable refs.
    pub fn empty_object() -> Self {
        Self::new(SchemaKind::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
            additional: None,
        })
    }

    /// Declared properties, empty for non-objects.
    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Whether `name` is listed in this object's `required` array.
    pub fn is_required(&self, name: &str) -> bool {
        match &self.kind {
            SchemaKind::Object { required, .. } => required.iter().any(|r| r == name),
            _ => false,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, SchemaKind::Array { .. })
    }
}
