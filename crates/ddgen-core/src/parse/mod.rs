//! Loading OpenAPI documents and following their `$ref` pointers.

pub mod document;
pub mod ref_resolve;
pub mod schema;

pub use document::{
    Components, Lenient, Malformed, MediaType, OpenApiSpec, Operation, Parameter,
    ParameterLocation, PathItem, Reference, RequestBody, Response,
};
pub use ref_resolve::RefResolver;
pub use schema::{JsonType, Schema, SchemaRef};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.yaml` and `.yml` locations are YAML, everything else JSON.
    pub fn from_location(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        match lower.rsplit_once('.') {
            Some((_, "yaml" | "yml")) => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Decode a document and reject anything that is not OpenAPI 3.x.
pub fn from_str(input: &str, format: DocumentFormat) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = match format {
        DocumentFormat::Yaml => serde_yaml_ng::from_str(input)?,
        DocumentFormat::Json => serde_json::from_str(input)?,
    };
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi));
    }
    Ok(spec)
}

pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    from_str(input, DocumentFormat::Yaml)
}

pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    from_str(input, DocumentFormat::Json)
}
