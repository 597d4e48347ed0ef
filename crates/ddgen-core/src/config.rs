use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DATADOG_V1_SCHEMA_URL: &str = "https://raw.githubusercontent.com/DataDog/datadog-api-client-go/master/.generator/schemas/v1/openapi.yaml";
pub const DATADOG_V2_SCHEMA_URL: &str = "https://raw.githubusercontent.com/DataDog/datadog-api-client-go/master/.generator/schemas/v2/openapi.yaml";

/// Top-level project configuration loaded from `.ddgen.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DdgenConfig {
    pub output: String,
    /// Schema documents processed in order when no explicit source is given.
    pub sources: Vec<SchemaSource>,
    pub default_filter: DefaultFilter,
    pub exclude: Vec<String>,
    /// Write `generation-report.md`.
    pub report: bool,
    /// Write `blocks.manifest.json`.
    pub manifest: bool,
}

impl Default for DdgenConfig {
    fn default() -> Self {
        Self {
            output: "./blocks".to_string(),
            sources: vec![
                SchemaSource {
                    version: "V1".to_string(),
                    url: DATADOG_V1_SCHEMA_URL.to_string(),
                },
                SchemaSource {
                    version: "V2".to_string(),
                    url: DATADOG_V2_SCHEMA_URL.to_string(),
                },
            ],
            default_filter: DefaultFilter::default(),
            exclude: Vec::new(),
            report: true,
            manifest: false,
        }
    }
}

/// One schema document and the version tag appended to its block names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaSource {
    #[serde(default)]
    pub version: String,
    pub url: String,
}

impl SchemaSource {
    /// A single explicit source; the version tag comes from a `/v1/` or
    /// `/v2/` path segment, otherwise it is empty.
    pub fn explicit(location: &str) -> Self {
        let version = if location.contains("/v1/") {
            "V1"
        } else if location.contains("/v2/") {
            "V2"
        } else {
            ""
        };
        Self {
            version: version.to_string(),
            url: location.to_string(),
        }
    }
}

/// Filter applied when the caller selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultFilter {
    pub resources: Vec<String>,
}

impl Default for DefaultFilter {
    fn default() -> Self {
        Self {
            resources: vec!["monitor".to_string(), "events".to_string()],
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".ddgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<DdgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(config))
}
