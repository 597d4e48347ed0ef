use ddgen_core::ir::{
    BlockDefinition, BodyEnvelope, EmitShape, HttpMethod, InputField, InputLocation,
    ValueTransform,
};
use minijinja::Environment;
use serde::Serialize;

use crate::error::GeneratorError;
use crate::type_mapper::{field_type_to_ts, json_literal};

#[derive(Serialize)]
struct InputContext<'a> {
    key: &'a str,
    label: &'a str,
    description: &'a str,
    type_literal: String,
    required: bool,
    default_literal: Option<String>,
}

#[derive(Serialize)]
struct WireBinding<'a> {
    key: &'a str,
    wire: &'a str,
    required: bool,
    join: bool,
}

#[derive(Serialize)]
struct BodyContext<'a> {
    /// Object the body fields are assigned into.
    target: &'static str,
    fields: Vec<WireBinding<'a>>,
    resource_type: Option<&'a str>,
}

#[derive(Serialize)]
struct BlockContext<'a> {
    name: &'a str,
    display_name: &'a str,
    description: &'a str,
    category: &'a str,
    inputs: Vec<InputContext<'a>>,
    input_keys: String,
    input_types: String,
    url_path: String,
    query: Vec<WireBinding<'a>>,
    headers: Vec<WireBinding<'a>>,
    body: Option<BodyContext<'a>>,
    method: &'static str,
    operation_description: &'a str,
    no_content: &'static str,
    emit_operation: Option<&'a str>,
    output_name: &'a str,
    output_description: &'a str,
    output_type: String,
}

/// Emit `<Name>.ts` for one block definition.
pub fn emit_block(env: &Environment<'_>, def: &BlockDefinition) -> Result<String, GeneratorError> {
    let tmpl = env.get_template("block.ts.j2")?;

    let inputs = def
        .inputs
        .iter()
        .map(|field| InputContext {
            key: &field.key,
            label: &field.label,
            description: &field.description,
            type_literal: json_literal(&field.type_json(), 10),
            required: field.required,
            default_literal: field.default_value.as_ref().map(|v| json_literal(v, 10)),
        })
        .collect();

    let input_keys = def
        .inputs
        .iter()
        .map(|f| f.key.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let input_types = def
        .inputs
        .iter()
        .map(|f| {
            let optional = if f.required { "" } else { "?" };
            format!("{}{optional}: {}", f.key, field_type_to_ts(&f.field_type))
        })
        .collect::<Vec<_>>()
        .join("; ");

    let body = def.request.body.as_ref().map(|envelope| BodyContext {
        target: match envelope {
            BodyEnvelope::Flat => "requestPayload",
            BodyEnvelope::JsonApi { .. } => "attributes",
        },
        fields: bindings(def.inputs_at(InputLocation::Body)),
        resource_type: match envelope {
            BodyEnvelope::Flat => None,
            BodyEnvelope::JsonApi { resource_type } => Some(resource_type),
        },
    });

    let ctx = BlockContext {
        name: &def.name,
        display_name: &def.display_name,
        description: &def.description,
        category: &def.category,
        inputs,
        input_keys,
        input_types,
        url_path: url_path(def),
        query: bindings(def.inputs_at(InputLocation::Query)),
        headers: bindings(def.inputs_at(InputLocation::Header)),
        body,
        method: def.request.method.as_str(),
        operation_description: &def.operation_description,
        no_content: if def.request.method == HttpMethod::Delete {
            "{ deleted: true }"
        } else {
            "{}"
        },
        emit_operation: match &def.emit {
            EmitShape::Raw => None,
            EmitShape::Wrapped { operation } => Some(operation),
        },
        output_name: &def.output.name,
        output_description: &def.output.description,
        output_type: json_literal(&def.output.field_type.to_json(), 6),
    };

    Ok(tmpl.render(ctx)?)
}

fn bindings<'a>(fields: impl Iterator<Item = &'a InputField>) -> Vec<WireBinding<'a>> {
    fields
        .map(|f| WireBinding {
            key: &f.key,
            wire: &f.wire_name,
            required: f.required,
            join: f.transform == ValueTransform::JoinComma,
        })
        .collect()
}

/// Path template with each `{placeholder}` replaced by `${identifier}`.
fn url_path(def: &BlockDefinition) -> String {
    def.inputs_at(InputLocation::Path)
        .fold(def.request.path.clone(), |path, field| {
            path.replace(&format!("{{{}}}", field.wire_name), &format!("${{{}}}", field.key))
        })
        .replace('`', "\\`")
}

#[cfg(test)]
mod tests {
    use ddgen_core::ir::{FieldType, OutputSpec, RequestPlan};
    use serde_json::json;

    use super::*;
    use crate::emitters::environment;

    fn field(key: &str, wire: &str, location: InputLocation, required: bool) -> InputField {
        InputField {
            key: key.to_string(),
            wire_name: wire.to_string(),
            label: key.to_string(),
            description: format!("{key} parameter"),
            required,
            location,
            field_type: FieldType::string(),
            example: None,
            default_value: None,
            transform: ValueTransform::None,
        }
    }

    fn definition(method: HttpMethod, path: &str, inputs: Vec<InputField>) -> BlockDefinition {
        BlockDefinition {
            name: "GetMonitorV1".to_string(),
            display_name: "Get a monitor's details".to_string(),
            description: "Get details about the `monitor`.".to_string(),
            category: "Monitor".to_string(),
            inputs,
            request: RequestPlan {
                method,
                path: path.to_string(),
                body: method.has_body().then_some(BodyEnvelope::Flat),
            },
            output: OutputSpec {
                name: "Monitor Details".to_string(),
                description: "The retrieved monitor object".to_string(),
                field_type: FieldType::any_object(),
            },
            emit: EmitShape::Raw,
            operation_description: "get a monitor's details".to_string(),
            operation_id: Some("GetMonitor".to_string()),
        }
    }

    #[test]
    fn test_get_block_substitutes_path_and_query() {
        let mut tags = field("monitorTags", "monitor_tags", InputLocation::Query, false);
        tags.transform = ValueTransform::JoinComma;
        let def = definition(
            HttpMethod::Get,
            "/api/v1/monitor/{monitor_id}",
            vec![
                field("monitorId", "monitor_id", InputLocation::Path, true),
                tags,
            ],
        );
        let env = environment().unwrap();
        let out = emit_block(&env, &def).unwrap();

        assert!(out.contains("export const GetMonitorV1: AppBlock = {"));
        assert!(out.contains(r#"name: "Get a monitor's details","#));
        assert!(out.contains("description: `Get details about the \\`monitor\\`.`,"));
        assert!(out.contains("const urlBase = `${baseUrl}/api/v1/monitor/${monitorId}`;"));
        assert!(out.contains(
            r#"if (monitorTags !== undefined) queryParams.append("monitor_tags", Array.isArray(monitorTags) ? monitorTags.join(",") : String(monitorTags));"#
        ));
        assert!(out.contains(
            "const { monitorId, monitorTags } = input.event.inputConfig as { monitorId: string; monitorTags?: string };"
        ));
        assert!(out.contains(r#"method: "GET","#));
        assert!(out.contains(
            "throw new Error(`Failed to get a monitor's details: ${response.status} ${response.statusText} - ${errorText}`);"
        ));
        assert!(out.contains("const result = response.status === 204 ? {} : await response.json();"));
        assert!(out.contains("await events.emit(result);"));
        assert!(!out.contains("body: JSON.stringify"));
    }

    #[test]
    fn test_post_block_builds_flat_payload() {
        let mut def = definition(
            HttpMethod::Post,
            "/api/v1/events",
            vec![
                field("title", "title", InputLocation::Body, true),
                field("alertType", "alert_type", InputLocation::Body, false),
                field("xTrace", "X-Trace", InputLocation::Header, false),
            ],
        );
        def.emit = EmitShape::Wrapped {
            operation: "create".to_string(),
        };
        let env = environment().unwrap();
        let out = emit_block(&env, &def).unwrap();

        assert!(out.contains("const url = `${baseUrl}/api/v1/events`;"));
        assert!(out.contains("const requestPayload: Record<string, unknown> = {};"));
        assert!(out.contains(r#"requestPayload["title"] = title;"#));
        assert!(out.contains(
            r#"if (alertType !== undefined) requestPayload["alert_type"] = alertType;"#
        ));
        assert!(out.contains(
            r#"...(xTrace !== undefined && { "X-Trace": String(xTrace) }),"#
        ));
        assert!(out.contains("body: JSON.stringify(requestPayload),"));
        assert!(out.contains(r#"operation: "create","#));
    }

    #[test]
    fn test_json_api_envelope_and_delete_no_content() {
        let mut def = definition(
            HttpMethod::Post,
            "/api/v2/incidents",
            vec![field("title", "title", InputLocation::Body, true)],
        );
        def.request.body = Some(BodyEnvelope::JsonApi {
            resource_type: "incidents".to_string(),
        });
        let env = environment().unwrap();
        let out = emit_block(&env, &def).unwrap();
        assert!(out.contains("const attributes: Record<string, unknown> = {};"));
        assert!(out.contains(r#"attributes["title"] = title;"#));
        assert!(out.contains(
            r#"const requestPayload = { data: { type: "incidents", attributes } };"#
        ));

        let delete = definition(HttpMethod::Delete, "/api/v1/monitor", Vec::new());
        let out = emit_block(&env, &delete).unwrap();
        assert!(out.contains("response.status === 204 ? { deleted: true } :"));
        assert!(!out.contains("inputConfig"));
    }

    #[test]
    fn test_input_type_literal_is_indented_json() {
        let mut f = field("priority", "priority", InputLocation::Body, false);
        f.field_type = FieldType::Number {
            minimum: Some(1.0),
            maximum: Some(5.0),
        };
        f.example = Some(json!(3));
        let def = definition(HttpMethod::Put, "/api/v1/monitor", vec![f]);
        let env = environment().unwrap();
        let out = emit_block(&env, &def).unwrap();
        assert!(out.contains(
            "          type: {\n            \"type\": \"number\",\n            \"minimum\": 1,\n            \"maximum\": 5,\n            \"example\": 3\n          },"
        ));
    }

    #[test]
    fn test_declared_default_is_rendered() {
        let mut page_size = field("pageSize", "page_size", InputLocation::Query, false);
        page_size.default_value = Some(json!(100));
        let def = definition(
            HttpMethod::Get,
            "/api/v1/monitor",
            vec![page_size, field("name", "name", InputLocation::Query, false)],
        );
        let env = environment().unwrap();
        let out = emit_block(&env, &def).unwrap();
        assert!(out.contains("          required: false,\n          default: 100,\n        },"));
        assert_eq!(out.matches("\n          default: ").count(), 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let def = definition(
            HttpMethod::Get,
            "/api/v1/monitor/{monitor_id}",
            vec![field("monitorId", "monitor_id", InputLocation::Path, true)],
        );
        let env = environment().unwrap();
        assert_eq!(emit_block(&env, &def).unwrap(), emit_block(&env, &def).unwrap());
    }
}
