use std::path::Path;

use ddgen_core::BlockDefinition;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Block definitions written by the generator as `blocks.manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockManifest {
    pub blocks: Vec<BlockDefinition>,
}

impl BlockManifest {
    pub fn from_json(content: &str) -> Result<Self, RuntimeError> {
        serde_json::from_str(content).map_err(RuntimeError::ManifestParse)
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn get(&self, name: &str) -> Option<&BlockDefinition> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }
}
