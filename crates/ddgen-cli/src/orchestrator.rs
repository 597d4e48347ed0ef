use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ddgen_blocks::{BlockGenerator, GeneratedBlock, GeneratedFile, NameRegistry, OutputOptions};
use ddgen_core::config::{DdgenConfig, SchemaSource};
use ddgen_core::{OperationFilter, SchemaParser, build_block};
use log::{debug, info, warn};

use crate::loader::SchemaLoader;

/// One generation run, after CLI flags have been merged over the config file.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: PathBuf,
    /// A single schema URL or file; `None` processes the configured sources.
    pub source: Option<String>,
    pub filter: OperationFilter,
    pub report: bool,
    pub manifest: bool,
}

#[derive(Debug, Default)]
pub struct GenerationSummary {
    pub block_names: Vec<String>,
    pub files: Vec<PathBuf>,
}

/// Split a comma-separated flag value, trimming items and dropping empty ones.
pub fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn build_filter(
    resources: Option<&str>,
    methods: Option<&str>,
    tags: Option<&str>,
    operations: Option<&str>,
    exclude: Option<&str>,
) -> OperationFilter {
    OperationFilter {
        resources: split_csv(resources),
        methods: split_csv(methods)
            .into_iter()
            .map(|m| m.to_uppercase())
            .collect(),
        tags: split_csv(tags),
        operations: split_csv(operations),
        exclude: split_csv(exclude),
    }
}

/// The filter actually applied: the configured default resources when the
/// caller selected nothing, plus the configured exclusions.
fn effective_filter(filter: &OperationFilter, config: &DdgenConfig) -> OperationFilter {
    let mut effective = filter.clone();
    if effective.is_unfiltered() {
        info!(
            "No filters specified, defaulting to resources: {}",
            config.default_filter.resources.join(", ")
        );
        effective.resources = config.default_filter.resources.clone();
    }
    for pattern in &config.exclude {
        if !effective.exclude.contains(pattern) {
            effective.exclude.push(pattern.clone());
        }
    }
    effective
}

/// Run every schema source through parse, build and render, then write the
/// output directory.
pub async fn generate(
    loader: &dyn SchemaLoader,
    config: &DdgenConfig,
    options: &GenerateOptions,
) -> Result<GenerationSummary> {
    let filter = effective_filter(&options.filter, config);
    let (sources, explicit) = match &options.source {
        Some(location) => (vec![SchemaSource::explicit(location)], true),
        None => (config.sources.clone(), false),
    };

    let generator = BlockGenerator::new()?;
    let mut registry = NameRegistry::new();
    let mut blocks: Vec<GeneratedBlock> = Vec::new();
    let mut failed = 0;

    for source in &sources {
        let label = if source.version.is_empty() {
            source.url.clone()
        } else {
            format!("{} ({})", source.url, source.version)
        };
        info!("Processing schema {label}");

        let spec = match loader.load(&source.url).await {
            Ok(spec) => spec,
            Err(e) if explicit => return Err(e),
            Err(e) => {
                warn!("Failed to process {label}: {e:#}");
                failed += 1;
                continue;
            }
        };

        let parser = SchemaParser::new(&spec);
        let configs = parser.extract_operations(&filter);
        info!("Found {} operations in {label}", configs.len());
        if configs.is_empty() {
            warn!(
                "No operations found matching the filters in {label}. Available tags: {}",
                parser.available_tags().join(", ")
            );
            debug!(
                "Available operationIds: {}",
                parser.available_operation_ids().join(", ")
            );
            continue;
        }

        let definitions = configs.iter().map(build_block).collect();
        let (generated, updated) =
            generator.generate_source(definitions, &source.version, registry);
        registry = updated;
        for block in &generated {
            info!(
                "  Generated {} ({} {})",
                block.name, block.http_method, block.path
            );
        }
        blocks.extend(generated);
    }

    if failed == sources.len() {
        bail!("no schema source could be loaded");
    }
    if blocks.is_empty() {
        warn!("No blocks were generated");
        return Ok(GenerationSummary::default());
    }

    let files = generator.emit_output(
        &blocks,
        OutputOptions {
            report: options.report,
            manifest: options.manifest,
        },
    )?;
    let written = write_files(&options.output, &files)?;
    info!(
        "Generated {} blocks in {}",
        blocks.len(),
        options.output.display()
    );

    Ok(GenerationSummary {
        block_names: blocks.into_iter().map(|b| b.name).collect(),
        files: written,
    })
}

/// Write generated files under `base`, creating directories as needed.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(base)
        .with_context(|| format!("failed to create output directory {}", base.display()))?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv_trims_and_drops_empty() {
        assert_eq!(
            split_csv(Some(" monitor, events ,,")),
            vec!["monitor".to_string(), "events".to_string()]
        );
        assert!(split_csv(None).is_empty());
    }

    #[test]
    fn test_methods_are_upper_cased() {
        let filter = build_filter(None, Some("get, post"), None, None, None);
        assert_eq!(filter.methods, vec!["GET", "POST"]);
    }

    #[test]
    fn test_default_filter_only_when_unfiltered() {
        let config = DdgenConfig::default();
        let applied = effective_filter(&OperationFilter::default(), &config);
        assert_eq!(applied.resources, vec!["monitor", "events"]);

        let tagged = build_filter(None, None, Some("Hosts"), None, None);
        let applied = effective_filter(&tagged, &config);
        assert!(applied.resources.is_empty());
        assert_eq!(applied.tags, vec!["Hosts"]);
    }

    #[test]
    fn test_config_exclusions_are_merged() {
        let config = DdgenConfig {
            exclude: vec!["/downtime".to_string()],
            ..Default::default()
        };
        let filter = build_filter(Some("monitor"), None, None, None, Some("/search,/downtime"));
        let applied = effective_filter(&filter, &config);
        assert_eq!(applied.exclude, vec!["/search", "/downtime"]);
    }
}
