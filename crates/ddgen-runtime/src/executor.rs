use std::time::Duration;

use ddgen_core::ir::{BodyEnvelope, EmitShape, InputField, InputLocation, ValueTransform};
use ddgen_core::{BlockDefinition, HttpMethod};
use log::{debug, info};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value, json};
use url::Url;

use crate::alert::value_text;
use crate::config::HostConfig;
use crate::error::RuntimeError;
use crate::host::EventSink;

/// Runs a block definition as one outbound Datadog call followed by one
/// emitted event.
pub struct BlockExecutor {
    client: Client,
    config: HostConfig,
}

impl BlockExecutor {
    pub fn new(config: HostConfig) -> Result<Self, RuntimeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: HostConfig) -> Self {
        Self { client, config }
    }

    /// Execute `definition` with caller-supplied `inputs`, keyed by input
    /// identifier. Returns the emitted payload.
    pub async fn invoke(
        &self,
        definition: &BlockDefinition,
        inputs: &Map<String, Value>,
        sink: &dyn EventSink,
    ) -> Result<Value, RuntimeError> {
        if let Some(missing) = definition
            .inputs
            .iter()
            .find(|f| f.required && provided(inputs, f).is_none())
        {
            return Err(RuntimeError::MissingInput {
                block: definition.name.clone(),
                input: missing.key.clone(),
            });
        }

        let url = self.request_url(definition, inputs)?;
        let method = to_reqwest_method(definition.request.method);
        debug!("{} {method} {url}", definition.name);

        let mut request = self
            .client
            .request(method, url)
            .header("DD-API-KEY", &self.config.api_key)
            .header("DD-APPLICATION-KEY", &self.config.app_key)
            .header("Content-Type", "application/json");
        for field in definition.inputs_at(InputLocation::Header) {
            if let Some(value) = provided(inputs, field) {
                request = request.header(field.wire_name.as_str(), value_text(value));
            }
        }
        if let Some(envelope) = &definition.request.body {
            let payload = request_payload(definition, envelope, inputs);
            request = request.body(payload.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Api {
                operation: definition.operation_description.clone(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let result = if status == StatusCode::NO_CONTENT {
            if definition.request.method == HttpMethod::Delete {
                json!({ "deleted": true })
            } else {
                json!({})
            }
        } else {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(RuntimeError::InvalidResponse)?
        };

        let payload = match &definition.emit {
            EmitShape::Raw => result,
            EmitShape::Wrapped { operation } => json!({
                "result": result,
                "operation": operation,
            }),
        };
        sink.emit(payload.clone()).await?;
        info!("{} completed with status {}", definition.name, status.as_u16());
        Ok(payload)
    }

    /// Base URL plus the path template with values substituted and the
    /// defined query parameters appended.
    fn request_url(
        &self,
        definition: &BlockDefinition,
        inputs: &Map<String, Value>,
    ) -> Result<Url, RuntimeError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| RuntimeError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;

        let path_fields: Vec<&InputField> = definition.inputs_at(InputLocation::Path).collect();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                RuntimeError::InvalidUrl(format!("{} cannot be a base URL", self.config.base_url))
            })?;
            segments.pop_if_empty();
            for segment in definition.request.path.split('/').filter(|s| !s.is_empty()) {
                let resolved = path_fields.iter().fold(segment.to_string(), |seg, field| {
                    match provided(inputs, field) {
                        Some(value) => {
                            seg.replace(&format!("{{{}}}", field.wire_name), &value_text(value))
                        }
                        None => seg,
                    }
                });
                segments.push(&resolved);
            }
        }

        let pairs: Vec<(&str, String)> = definition
            .inputs_at(InputLocation::Query)
            .filter_map(|field| {
                provided(inputs, field).map(|value| (field.wire_name.as_str(), query_value(field, value)))
            })
            .collect();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name, &value);
            }
        }
        Ok(url)
    }
}

/// The caller's value for `field`, treating `null` as absent, else the
/// field's declared default.
fn provided<'a>(inputs: &'a Map<String, Value>, field: &'a InputField) -> Option<&'a Value> {
    inputs
        .get(&field.key)
        .filter(|v| !v.is_null())
        .or(field.default_value.as_ref())
}

fn query_value(field: &InputField, value: &Value) -> String {
    match (field.transform, value) {
        (ValueTransform::JoinComma, Value::Array(items)) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        _ => value_text(value),
    }
}

fn request_payload(
    definition: &BlockDefinition,
    envelope: &BodyEnvelope,
    inputs: &Map<String, Value>,
) -> Value {
    let fields: Map<String, Value> = definition
        .inputs_at(InputLocation::Body)
        .filter_map(|field| {
            provided(inputs, field).map(|value| (field.wire_name.clone(), value.clone()))
        })
        .collect();
    match envelope {
        BodyEnvelope::Flat => Value::Object(fields),
        BodyEnvelope::JsonApi { resource_type } => json!({
            "data": {
                "type": resource_type,
                "attributes": fields,
            }
        }),
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}
