use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("only OpenAPI 3.x documents are supported, got {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("reference cycle through {0}")]
    CircularRef(String),

    #[error("unsupported reference {0}")]
    InvalidRefFormat(String),

    #[error("nothing defined at {0}")]
    RefTargetNotFound(String),

    #[error("malformed definition: {0}")]
    Malformed(String),
}

/// Failure to turn one operation into a generation config. The parser logs
/// these and drops the operation rather than aborting the whole document.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{method} {path}: {source}")]
    Resolve {
        method: String,
        path: String,
        #[source]
        source: ResolveError,
    },

    #[error("{method} {path}: malformed path template")]
    MalformedPath { method: String, path: String },

    #[error("{method} {path}: malformed operation: {reason}")]
    Malformed {
        method: String,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
