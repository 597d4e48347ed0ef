use std::collections::HashSet;

use indexmap::IndexMap;

use super::naming::{
    action_for, block_name, clean_text, humanize_field_name, humanize_text,
    normalize_resource_name, operation_id_display_name, parameter_to_camel_case,
};
use super::type_converter::{input_field_type, simple_type};
use crate::ir::{
    BlockDefinition, BlockGenerationConfig, BodyEnvelope, EmitShape, FieldType, HttpMethod,
    InputField, InputLocation, OperationParam, OutputSpec, RequestPlan, SchemaKind, SchemaNode,
    ValueTransform,
};
use crate::parse::ParameterLocation;

/// Identifiers an input key must not shadow in the rendered block: locals
/// of the generated handler plus JavaScript reserved words.
const RESERVED_IDENTIFIERS: &[&str] = &[
    "apiKey", "appKey", "attributes", "baseUrl", "errorText", "events", "input",
    "queryParams", "queryString", "requestPayload", "response", "result", "url", "urlBase",
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "await", "implements", "interface", "package", "private", "protected", "public",
    "arguments", "eval",
];

/// Build the block definition for one extracted operation. Pure: the same
/// config always yields the same definition.
pub fn build_block(config: &BlockGenerationConfig) -> BlockDefinition {
    let category = normalize_resource_name(&config.resource_name);
    let single_item = config.targets_single_item();
    let action = action_for(config.method, single_item);

    let display_name = config
        .summary
        .as_deref()
        .or(config.description.as_deref())
        .map(clean_text)
        .or_else(|| config.operation_id.as_deref().map(operation_id_display_name))
        .unwrap_or_else(|| format!("{action} {category}"));

    let description = config
        .description
        .as_deref()
        .or(config.summary.as_deref())
        .map(clean_text)
        .unwrap_or_else(|| {
            format!("{action} {} using the Datadog API", category.to_lowercase())
        });

    let mut inputs = InputCollector::default();
    for param in config
        .path_params
        .iter()
        .chain(&config.query_params)
        .chain(&config.header_params)
    {
        inputs.push_param(param);
    }

    let body = if config.method.has_body() {
        let envelope = match &config.request_body {
            Some(schema) => match json_api_attributes(schema) {
                Some((resource_type, attributes)) => {
                    inputs.push_properties(attributes);
                    BodyEnvelope::JsonApi { resource_type }
                }
                None => {
                    inputs.push_properties(schema);
                    BodyEnvelope::Flat
                }
            },
            None => BodyEnvelope::Flat,
        };
        Some(envelope)
    } else {
        None
    };

    let (emit, output_type) = match &config.response {
        Some(schema) => (EmitShape::Raw, simple_type(schema)),
        None => (
            EmitShape::Wrapped {
                operation: emit_verb(config.method).to_string(),
            },
            default_output_type(),
        ),
    };

    BlockDefinition {
        name: block_name(
            config.operation_id.as_deref(),
            config.method,
            &config.path,
            &config.resource_name,
        ),
        display_name,
        description,
        category: category.clone(),
        inputs: inputs.fields,
        request: RequestPlan {
            method: config.method,
            path: config.path.clone(),
            body,
        },
        output: OutputSpec {
            name: output_name(config.method, single_item, &category),
            description: output_description(
                config.method,
                single_item,
                &config.resource_name.to_lowercase(),
            ),
            field_type: output_type,
        },
        emit,
        operation_description: operation_description(config),
        operation_id: config.operation_id.clone(),
    }
}

/// `{result: object, operation: string}`, `result` required.
pub fn default_output_type() -> FieldType {
    let mut properties = IndexMap::new();
    properties.insert("result".to_string(), FieldType::any_object());
    properties.insert("operation".to_string(), FieldType::string());
    FieldType::Object {
        properties,
        required: vec!["result".to_string()],
    }
}

fn emit_verb(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "get",
        HttpMethod::Post => "create",
        HttpMethod::Put | HttpMethod::Patch => "update",
        HttpMethod::Delete => "delete",
    }
}

fn output_name(method: HttpMethod, single_item: bool, resource: &str) -> String {
    match method {
        HttpMethod::Get if single_item => format!("{resource} Details"),
        HttpMethod::Get => format!("{resource} List"),
        HttpMethod::Post => format!("Created {resource}"),
        HttpMethod::Put | HttpMethod::Patch => format!("Updated {resource}"),
        HttpMethod::Delete => "Delete Result".to_string(),
    }
}

fn output_description(method: HttpMethod, single_item: bool, resource: &str) -> String {
    match method {
        HttpMethod::Get if single_item => format!("The retrieved {resource} object"),
        HttpMethod::Get => format!("List of {resource} objects"),
        HttpMethod::Post => format!("The created {resource} object"),
        HttpMethod::Put | HttpMethod::Patch => format!("The updated {resource} object"),
        HttpMethod::Delete => "Result of the delete operation".to_string(),
    }
}

/// Lowercase phrase for `Failed to <phrase>: ...` errors.
fn operation_description(config: &BlockGenerationConfig) -> String {
    if let Some(summary) = &config.summary {
        return clean_text(summary).to_lowercase();
    }
    let resource = humanize_text(&config.resource_name).to_lowercase();
    let verb = match config.method {
        HttpMethod::Get if config.targets_single_item() => "get",
        HttpMethod::Get => "list",
        HttpMethod::Post if config.path.contains("search") => "search",
        HttpMethod::Post => "create",
        HttpMethod::Put | HttpMethod::Patch => "update",
        HttpMethod::Delete => "delete",
    };
    format!("{verb} {resource}")
}

/// Detect a JSON:API request envelope: the body's only property is `data`,
/// an object holding exactly an `attributes` object and a `type` fixed by a
/// single-value enum. Returns the type value and the attributes schema.
fn json_api_attributes(body: &SchemaNode) -> Option<(String, &SchemaNode)> {
    let props = body.properties()?;
    if props.len() != 1 {
        return None;
    }
    let data = props.get("data")?.properties()?;
    if data.len() != 2 {
        return None;
    }
    let attributes = data.get("attributes")?;
    attributes.properties()?;
    let resource_type = match &data.get("type")?.kind {
        SchemaKind::String { enum_values, .. } if enum_values.len() == 1 => {
            enum_values[0].as_str()?.to_string()
        }
        _ => return None,
    };
    Some((resource_type, attributes))
}

/// Accumulates input fields in order, keeping identifiers unique.
#[derive(Default)]
struct InputCollector {
    fields: Vec<InputField>,
    used: HashSet<String>,
}

impl InputCollector {
    fn push_param(&mut self, param: &OperationParam) {
        let location = match param.location {
            ParameterLocation::Path => InputLocation::Path,
            ParameterLocation::Query => InputLocation::Query,
            ParameterLocation::Header => InputLocation::Header,
            ParameterLocation::Cookie => return,
        };
        let transform = if location == InputLocation::Query && param.schema.is_array() {
            ValueTransform::JoinComma
        } else {
            ValueTransform::None
        };
        self.push(
            &param.name,
            param.description.as_deref(),
            &param.schema,
            param.required,
            location,
            transform,
        );
    }

    fn push_properties(&mut self, schema: &SchemaNode) {
        let Some(props) = schema.properties() else {
            return;
        };
        for (name, prop) in props {
            self.push(
                name,
                None,
                prop,
                schema.is_required(name),
                InputLocation::Body,
                ValueTransform::None,
            );
        }
    }

    fn push(
        &mut self,
        wire_name: &str,
        description: Option<&str>,
        schema: &SchemaNode,
        required: bool,
        location: InputLocation,
        transform: ValueTransform,
    ) {
        let label = humanize_field_name(wire_name);
        let description = description
            .or(schema.description.as_deref())
            .map(clean_text)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("{label} parameter"));
        let key = self.unique_key(parameter_to_camel_case(wire_name), location);
        self.fields.push(InputField {
            key,
            wire_name: wire_name.to_string(),
            label,
            description,
            required,
            location,
            field_type: input_field_type(schema),
            example: schema.example.clone().filter(|v| !v.is_null()),
            default_value: schema.default_value.clone().filter(|v| !v.is_null()),
            transform,
        });
    }

    fn unique_key(&mut self, key: String, location: InputLocation) -> String {
        let taken = |k: &str, used: &HashSet<String>| {
            used.contains(k) || RESERVED_IDENTIFIERS.contains(&k)
        };
        let key = if taken(&key, &self.used) {
            let suffixed = format!("{key}{}", location.suffix());
            let mut candidate = suffixed.clone();
            let mut counter = 1;
            while taken(&candidate, &self.used) {
                candidate = format!("{suffixed}{counter}");
                counter += 1;
            }
            candidate
        } else {
            key
        };
        self.used.insert(key.clone());
        key
    }
}
