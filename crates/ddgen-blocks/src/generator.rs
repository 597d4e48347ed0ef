use ddgen_core::{BlockDefinition, HttpMethod};
use log::{debug, info, warn};
use minijinja::Environment;

use crate::emitters;
use crate::emitters::manifest::MANIFEST_FILE_NAME;
use crate::error::GeneratorError;
use crate::registry::NameRegistry;

/// A file to be written, relative to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// One rendered block together with the definition it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBlock {
    pub name: String,
    pub file_name: String,
    pub content: String,
    pub category: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub operation_id: Option<String>,
    pub definition: BlockDefinition,
}

/// Which optional artifacts accompany the block files and index.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub report: bool,
    pub manifest: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            report: true,
            manifest: false,
        }
    }
}

/// Renders block definitions into TypeScript sources.
pub struct BlockGenerator {
    env: Environment<'static>,
}

impl BlockGenerator {
    pub fn new() -> Result<Self, GeneratorError> {
        Ok(Self {
            env: emitters::environment()?,
        })
    }

    /// Render a definition under its current name.
    pub fn render(&self, definition: BlockDefinition) -> Result<GeneratedBlock, GeneratorError> {
        let content = emitters::block::emit_block(&self.env, &definition)?;
        Ok(GeneratedBlock {
            name: definition.name.clone(),
            file_name: format!("{}.ts", definition.name),
            content,
            category: definition.category.clone(),
            http_method: definition.request.method,
            path: definition.request.path.clone(),
            operation_id: definition.operation_id.clone(),
            definition,
        })
    }

    /// Name and render every definition from one schema source. A block that
    /// fails to render is logged and left out.
    ///
    /// The registry carries the names claimed by earlier sources and is
    /// handed back with this source's names added.
    pub fn generate_source(
        &self,
        definitions: Vec<BlockDefinition>,
        version: &str,
        mut registry: NameRegistry,
    ) -> (Vec<GeneratedBlock>, NameRegistry) {
        let mut blocks = Vec::with_capacity(definitions.len());
        for mut definition in definitions {
            let name = registry.claim(&definition.name, version);
            if name != format!("{}{version}", definition.name) {
                info!(
                    "Block name {}{version} already taken, using {name}",
                    definition.name
                );
            }
            definition.name = name;
            debug!(
                "Rendering {} ({} {})",
                definition.name, definition.request.method, definition.request.path
            );
            let name = definition.name.clone();
            match self.render(definition) {
                Ok(block) => blocks.push(block),
                Err(err) => warn!("Skipping block {name}: {err}"),
            }
        }
        (blocks, registry)
    }

    /// Every output file: one per block, the index, then the optional report
    /// and manifest.
    pub fn emit_output(
        &self,
        blocks: &[GeneratedBlock],
        options: OutputOptions,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let mut files: Vec<GeneratedFile> = blocks
            .iter()
            .map(|b| GeneratedFile {
                path: b.file_name.clone(),
                content: b.content.clone(),
            })
            .collect();

        let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
        files.push(GeneratedFile {
            path: "index.ts".to_string(),
            content: emitters::index::emit_index(&self.env, &names)?,
        });

        if options.report {
            files.push(GeneratedFile {
                path: "generation-report.md".to_string(),
                content: emitters::report::emit_report(&self.env, blocks)?,
            });
        }
        if options.manifest {
            files.push(GeneratedFile {
                path: MANIFEST_FILE_NAME.to_string(),
                content: emitters::manifest::emit_manifest(blocks)?,
            });
        }
        Ok(files)
    }
}
