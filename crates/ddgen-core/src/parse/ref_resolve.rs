use std::collections::HashSet;

use indexmap::IndexMap;
use log::warn;

use super::document::{Components, OpenApiSpec, Parameter, Reference, RequestBody, Response};
use super::schema::{JsonType, OpenMap, Schema, SchemaRef};
use crate::error::ResolveError;
use crate::ir::{AdditionalNode, SchemaKind, SchemaNode};

/// A definition that can live under `#/components/<SECTION>/`.
pub trait Reusable: Clone {
    const SECTION: &'static str;

    fn table(components: &Components) -> &IndexMap<String, Reference<Self>>;
}

impl Reusable for Parameter {
    const SECTION: &'static str = "parameters";

    fn table(components: &Components) -> &IndexMap<String, Reference<Self>> {
        &components.parameters
    }
}

impl Reusable for RequestBody {
    const SECTION: &'static str = "requestBodies";

    fn table(components: &Components) -> &IndexMap<String, Reference<Self>> {
        &components.request_bodies
    }
}

impl Reusable for Response {
    const SECTION: &'static str = "responses";

    fn table(components: &Components) -> &IndexMap<String, Reference<Self>> {
        &components.responses
    }
}

/// Turns document schemas into ref-free [`SchemaNode`] trees and follows
/// pointers to parameters, request bodies and responses.
///
/// Schema pointers never fail: an unknown target or a cycle becomes an
/// empty `{type: object}` and a warning. Other pointers return a
/// [`ResolveError`] so the caller can drop the operation that used them.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
    in_progress: Vec<String>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
            in_progress: Vec::new(),
        }
    }

    pub fn resolve_schema(&mut self, schema: &SchemaRef) -> SchemaNode {
        let target = match schema {
            Reference::Inline(inline) => return self.convert(inline),
            Reference::Pointer { target } => target.as_str(),
            Reference::Malformed(bad) => {
                warn!("Malformed schema replaced by an empty object: {}", bad.reason);
                return SchemaNode::empty_object();
            }
        };
        if self.in_progress.iter().any(|seen| seen == target) {
            warn!("Circular schema reference cut at {target}");
            return SchemaNode::empty_object();
        }
        let found = component_name(target, "schemas").and_then(|name| {
            self.components
                .and_then(|c| c.schemas.get(name))
                .ok_or_else(|| ResolveError::RefTargetNotFound(target.to_string()))
        });
        match found {
            Ok(next) => {
                self.in_progress.push(target.to_string());
                let node = self.resolve_schema(next);
                self.in_progress.pop();
                node
            }
            Err(err) => {
                warn!("Cannot resolve schema reference: {err}");
                SchemaNode::empty_object()
            }
        }
    }

    /// Follow a pointer chain to an inline definition.
    pub fn follow<T: Reusable>(&self, item: &Reference<T>) -> Result<T, ResolveError> {
        let mut visited = HashSet::new();
        let mut current = item;
        loop {
            let target = match current {
                Reference::Inline(inline) => return Ok(inline.clone()),
                Reference::Malformed(bad) => {
                    return Err(ResolveError::Malformed(bad.reason.clone()));
                }
                Reference::Pointer { target } => target,
            };
            if !visited.insert(target.as_str()) {
                return Err(ResolveError::CircularRef(target.clone()));
            }
            let name = component_name(target, T::SECTION)?;
            current = self
                .components
                .and_then(|c| T::table(c).get(name))
                .ok_or_else(|| ResolveError::RefTargetNotFound(target.clone()))?;
        }
    }

    fn convert(&mut self, schema: &Schema) -> SchemaNode {
        let kind = match schema.types.as_ref().and_then(|t| t.primary()) {
            Some(JsonType::String) => string_kind(schema),
            Some(JsonType::Integer) => SchemaKind::Number {
                integer: true,
                minimum: schema.minimum,
                maximum: schema.maximum,
            },
            Some(JsonType::Number) => SchemaKind::Number {
                integer: false,
                minimum: schema.minimum,
                maximum: schema.maximum,
            },
            Some(JsonType::Boolean) => SchemaKind::Boolean,
            Some(JsonType::Array) => SchemaKind::Array {
                items: schema
                    .items
                    .as_ref()
                    .map(|items| Box::new(self.resolve_schema(items))),
                min_items: schema.min_items,
                max_items: schema.max_items,
            },
            Some(JsonType::Object) => self.object_kind(schema),
            Some(JsonType::Null) => SchemaKind::Untyped,
            None if !schema.all_of.is_empty() => self.merged_kind(schema),
            None if !schema.properties.is_empty() => self.object_kind(schema),
            None if !schema.enum_values.is_empty() => string_kind(schema),
            None => SchemaKind::Untyped,
        };
        SchemaNode {
            kind,
            description: schema.description.clone(),
            example: schema.example.clone(),
            default_value: schema.default_value.clone(),
        }
    }

    fn object_kind(&mut self, schema: &Schema) -> SchemaKind {
        let properties = schema
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), self.resolve_schema(prop)))
            .collect();
        let additional = match &schema.additional_properties {
            Some(OpenMap::Flag(true)) => Some(AdditionalNode::Any),
            Some(OpenMap::Values(values)) => {
                Some(AdditionalNode::Schema(Box::new(self.resolve_schema(values))))
            }
            Some(OpenMap::Flag(false)) | None => None,
        };
        SchemaKind::Object {
            properties,
            required: schema.required.clone(),
            additional,
        }
    }

    /// `allOf` without a `type`: a lone member is taken as is, otherwise
    /// the object members' properties are merged in order.
    fn merged_kind(&mut self, schema: &Schema) -> SchemaKind {
        let mut members: Vec<SchemaKind> = schema
            .all_of
            .iter()
            .map(|member| self.resolve_schema(member).kind)
            .collect();
        if members.len() == 1 && schema.properties.is_empty() {
            return members.remove(0);
        }
        members.push(self.object_kind(schema));

        let mut merged = IndexMap::new();
        let mut merged_required: Vec<String> = Vec::new();
        let mut merged_additional = None;
        for member in members {
            let SchemaKind::Object {
                properties,
                required,
                additional,
            } = member
            else {
                continue;
            };
            merged.extend(properties);
            for name in required {
                if !merged_required.contains(&name) {
                    merged_required.push(name);
                }
            }
            merged_additional = merged_additional.or(additional);
        }
        SchemaKind::Object {
            properties: merged,
            required: merged_required,
            additional: merged_additional,
        }
    }
}

fn string_kind(schema: &Schema) -> SchemaKind {
    SchemaKind::String {
        enum_values: schema.enum_values.clone(),
        format: schema.format.clone(),
    }
}

/// `#/components/schemas/Monitor` in section `schemas` yields `Monitor`.
fn component_name<'r>(pointer: &'r str, section: &str) -> Result<&'r str, ResolveError> {
    let invalid = || ResolveError::InvalidRefFormat(pointer.to_string());
    let (found, name) = pointer
        .strip_prefix("#/components/")
        .and_then(|rest| rest.split_once('/'))
        .ok_or_else(invalid)?;
    if found != section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "{pointer} points into '{found}', expected '{section}'"
        )));
    }
    Ok(name)
}
