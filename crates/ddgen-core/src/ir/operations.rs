use std::fmt;

use serde::{Deserialize, Serialize};

use super::schemas::SchemaNode;
use crate::parse::ParameterLocation;

/// HTTP methods blocks are generated for, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Fixed iteration order used when walking a path item.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Parse a method name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value))
    }

    /// POST, PUT and PATCH carry a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved path/query/header parameter of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParam {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: SchemaNode,
}

impl OperationParam {
    /// A parameter present in the path template but never declared.
    pub fn synthesized_path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Path,
            required: true,
            description: Some(format!("Path parameter: {name}")),
            schema: SchemaNode::string(),
        }
    }
}

/// Normalized description of one `(path, method)` pair that survived the
/// filters. Produced by the schema parser, consumed once by the block builder.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGenerationConfig {
    pub resource_name: String,
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub path_params: Vec<OperationParam>,
    pub query_params: Vec<OperationParam>,
    pub header_params: Vec<OperationParam>,
    pub request_body: Option<SchemaNode>,
    pub response: Option<SchemaNode>,
}

impl BlockGenerationConfig {
    /// Whether the path addresses a single item (contains a `{placeholder}`).
    pub fn targets_single_item(&self) -> bool {
        self.path.contains('{')
    }
}
