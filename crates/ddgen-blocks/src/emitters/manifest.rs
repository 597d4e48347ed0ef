use ddgen_core::BlockDefinition;
use serde::Serialize;

use crate::error::GeneratorError;
use crate::generator::GeneratedBlock;

pub const MANIFEST_FILE_NAME: &str = "blocks.manifest.json";

#[derive(Serialize)]
struct Manifest<'a> {
    blocks: Vec<&'a BlockDefinition>,
}

/// Emit `blocks.manifest.json`, the definitions the runtime executor loads.
pub fn emit_manifest(blocks: &[GeneratedBlock]) -> Result<String, GeneratorError> {
    let manifest = Manifest {
        blocks: blocks.iter().map(|b| &b.definition).collect(),
    };
    let mut out = serde_json::to_string_pretty(&manifest)?;
    out.push('\n');
    Ok(out)
}
