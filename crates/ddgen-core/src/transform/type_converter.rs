use indexmap::IndexMap;

use crate::ir::{AdditionalNode, FieldType, SchemaKind, SchemaNode};

/// Type descriptor for a top-level input field.
///
/// Differs from [`simple_type`] only for shapeless objects, which become an
/// open map of strings so the host renders a key/value editor.
pub fn input_field_type(schema: &SchemaNode) -> FieldType {
    match &schema.kind {
        SchemaKind::Object {
            properties,
            additional: None,
            ..
        } if properties.is_empty() => FieldType::Map {
            values: Box::new(FieldType::string()),
        },
        _ => simple_type(schema),
    }
}

/// Structural translation of a resolved schema into a host type descriptor.
pub fn simple_type(schema: &SchemaNode) -> FieldType {
    match &schema.kind {
        SchemaKind::String { enum_values, .. } => FieldType::String {
            enum_values: enum_values.clone(),
        },
        SchemaKind::Number {
            minimum, maximum, ..
        } => FieldType::Number {
            minimum: *minimum,
            maximum: *maximum,
        },
        SchemaKind::Boolean => FieldType::Boolean,
        SchemaKind::Array {
            items,
            min_items,
            max_items,
        } => FieldType::Array {
            items: Box::new(
                items
                    .as_deref()
                    .map(simple_type)
                    .unwrap_or_else(FieldType::string),
            ),
            min_items: *min_items,
            max_items: *max_items,
        },
        SchemaKind::Object {
            additional: Some(additional),
            ..
        } => FieldType::Map {
            values: Box::new(match additional {
                AdditionalNode::Any => FieldType::string(),
                AdditionalNode::Schema(inner) => simple_type(inner),
            }),
        },
        SchemaKind::Object {
            properties,
            required,
            additional: None,
        } => FieldType::Object {
            properties: properties
                .iter()
                .map(|(name, prop)| (name.clone(), simple_type(prop)))
                .collect::<IndexMap<_, _>>(),
            required: required.clone(),
        },
        SchemaKind::Untyped => FieldType::string(),
    }
}
