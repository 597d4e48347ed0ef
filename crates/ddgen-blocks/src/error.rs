use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to serialize block manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
