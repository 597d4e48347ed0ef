use std::collections::BTreeSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;

use super::naming::resource_name;
use crate::error::ExtractError;
use crate::ir::{BlockGenerationConfig, HttpMethod, OperationParam, SchemaNode};
use crate::parse::{
    Lenient, OpenApiSpec, Operation, Parameter, ParameterLocation, PathItem, RefResolver,
};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Headers supplied by the host configuration rather than the caller.
const AUTH_HEADERS: &[&str] = &["authorization", "dd-api-key", "dd-application-key"];

/// Response codes scanned, in order, for a JSON response body.
const SUCCESS_CODES: &[&str] = &["200", "201", "202", "204"];

/// Which operations to turn into blocks. Every non-empty list must accept
/// an operation for it to survive; an empty list accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    /// Matched as `/<resource>` inside the lowercased path.
    pub resources: Vec<String>,
    /// Upper-case method names, exact match.
    pub methods: Vec<String>,
    /// Case-insensitive substring of any operation tag.
    pub tags: Vec<String>,
    /// Case-insensitive substring of the operationId.
    pub operations: Vec<String>,
    /// Case-insensitive substring of the path; matching paths are skipped.
    pub exclude: Vec<String>,
}

impl OperationFilter {
    /// True when no selecting filter (resource, method, tag, operation) is set.
    /// Exclusions do not count.
    pub fn is_unfiltered(&self) -> bool {
        self.resources.is_empty()
            && self.methods.is_empty()
            && self.tags.is_empty()
            && self.operations.is_empty()
    }

    fn excludes(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.exclude
            .iter()
            .any(|pattern| path.contains(&pattern.to_lowercase()))
    }

    fn accepts_path(&self, path: &str) -> bool {
        if self.resources.is_empty() {
            return true;
        }
        let path = path.to_lowercase();
        self.resources
            .iter()
            .any(|r| path.contains(&format!("/{}", r.to_lowercase())))
    }

    fn accepts_method(&self, method: HttpMethod) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m == method.as_str())
    }

    fn accepts_tags(&self, op: &Operation) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags.iter().any(|filter| {
            let filter = filter.to_lowercase();
            op.tags.iter().any(|tag| tag.to_lowercase().contains(&filter))
        })
    }

    fn accepts_operation_id(&self, op: &Operation) -> bool {
        if self.operations.is_empty() {
            return true;
        }
        let Some(id) = op.operation_id.as_deref() else {
            return false;
        };
        let id = id.to_lowercase();
        self.operations
            .iter()
            .any(|filter| id.contains(&filter.to_lowercase()))
    }
}

/// Walks an OpenAPI document and produces one [`BlockGenerationConfig`] per
/// operation that passes an [`OperationFilter`].
pub struct SchemaParser<'a> {
    spec: &'a OpenApiSpec,
}

impl<'a> SchemaParser<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self { spec }
    }

    /// Extract configs in document path order, methods in
    /// get/post/put/delete/patch order. Operations that fail to extract are
    /// logged and dropped.
    pub fn extract_operations(&self, filter: &OperationFilter) -> Vec<BlockGenerationConfig> {
        let mut resolver = RefResolver::new(self.spec);
        let mut configs = Vec::new();

        for (path, entry) in &self.spec.paths {
            if filter.excludes(path) || !filter.accepts_path(path) {
                continue;
            }
            let item = match entry {
                Lenient::Valid(item) => item,
                Lenient::Malformed(bad) => {
                    warn!("Skipping malformed path item {path}: {}", bad.reason);
                    continue;
                }
            };
            for (method, slot) in item.operations() {
                if !filter.accepts_method(method) {
                    continue;
                }
                let op = match slot {
                    Lenient::Valid(op) => op,
                    Lenient::Malformed(bad) => {
                        let err = ExtractError::Malformed {
                            method: method.to_string(),
                            path: path.clone(),
                            reason: bad.reason.clone(),
                        };
                        warn!("Failed to create block config for {err}");
                        continue;
                    }
                };
                if !filter.accepts_tags(op) || !filter.accepts_operation_id(op) {
                    continue;
                }
                match build_config(&mut resolver, path, item, method, op) {
                    Ok(config) => {
                        debug!("Extracted {method} {path}");
                        configs.push(config);
                    }
                    Err(err) => warn!("Failed to create block config for {err}"),
                }
            }
        }

        configs
    }

    /// Sorted, de-duplicated tags across all operations.
    pub fn available_tags(&self) -> Vec<String> {
        self.all_operations()
            .flat_map(|op| op.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, de-duplicated operationIds across all operations.
    pub fn available_operation_ids(&self) -> Vec<String> {
        self.all_operations()
            .filter_map(|op| op.operation_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn all_operations(&self) -> impl Iterator<Item = &'a Operation> {
        self.spec
            .paths
            .values()
            .filter_map(Lenient::valid)
            .flat_map(|item| item.operations().filter_map(|(_, op)| op.valid()))
    }
}

fn build_config(
    resolver: &mut RefResolver<'_>,
    path: &str,
    item: &PathItem,
    method: HttpMethod,
    op: &Operation,
) -> Result<BlockGenerationConfig, ExtractError> {
    if path.matches('{').count() != path.matches('}').count() {
        return Err(ExtractError::MalformedPath {
            method: method.to_string(),
            path: path.to_string(),
        });
    }
    let resolve_err = |source| ExtractError::Resolve {
        method: method.to_string(),
        path: path.to_string(),
        source,
    };

    // Path-level parameters first; an operation entry with the same
    // name and location replaces it in place.
    let mut declared: IndexMap<(ParameterLocation, String), Parameter> = IndexMap::new();
    for param in item.parameters.iter().chain(op.parameters.iter()) {
        let param = resolver.follow(param).map_err(resolve_err)?;
        declared.insert((param.location, param.name.clone()), param);
    }

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut header_params = Vec::new();
    for param in declared.values() {
        match param.location {
            ParameterLocation::Path => path_params.push(to_operation_param(resolver, param)),
            ParameterLocation::Query => query_params.push(to_operation_param(resolver, param)),
            ParameterLocation::Header
                if !AUTH_HEADERS.contains(&param.name.to_lowercase().as_str()) =>
            {
                header_params.push(to_operation_param(resolver, param))
            }
            _ => {}
        }
    }

    for caps in PLACEHOLDER_RE.captures_iter(path) {
        let name = &caps[1];
        if !path_params.iter().any(|p: &OperationParam| p.name == name) {
            path_params.push(OperationParam::synthesized_path(name));
        }
    }

    let request_body = match &op.request_body {
        Some(body) => {
            let body = resolver.follow(body).map_err(resolve_err)?;
            body.preferred_schema()
                .map(|schema| resolver.resolve_schema(schema))
        }
        None => None,
    };

    let mut response = None;
    for code in SUCCESS_CODES {
        let Some(resp) = op.responses.get(*code) else {
            continue;
        };
        let resp = resolver.follow(resp).map_err(resolve_err)?;
        if let Some(media) = resp.json() {
            response = Some(match &media.schema {
                Some(schema) => resolver.resolve_schema(schema),
                None => SchemaNode::empty_object(),
            });
            break;
        }
    }

    Ok(BlockGenerationConfig {
        resource_name: resource_name(op.operation_id.as_deref(), path, &op.tags),
        path: path.to_string(),
        method,
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        path_params,
        query_params,
        header_params,
        request_body,
        response,
    })
}

fn to_operation_param(resolver: &mut RefResolver<'_>, param: &Parameter) -> OperationParam {
    let mut schema = match &param.schema {
        Some(schema) => resolver.resolve_schema(schema),
        None => SchemaNode::string(),
    };
    if schema.example.is_none() {
        schema.example = param.example.clone();
    }
    OperationParam {
        name: param.name.clone(),
        location: param.location,
        required: param.required || param.location == ParameterLocation::Path,
        description: param.description.clone(),
        schema,
    }
}
