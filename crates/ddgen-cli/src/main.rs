use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ddgen_cli::{DefaultSchemaLoader, GenerateOptions, build_filter, generate};
use ddgen_core::config::{self, CONFIG_FILE_NAME};
use log::{info, warn};

#[derive(Parser)]
#[command(
    name = "ddgen",
    about = "Generate Datadog flow blocks from the Datadog OpenAPI documents",
    version
)]
struct Cli {
    /// Output directory [default: ./blocks]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Datadog OpenAPI schema URL
    #[arg(long, conflicts_with = "schema_file")]
    schema_url: Option<String>,

    /// Datadog OpenAPI schema file (JSON or YAML)
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Comma-separated resource filter (e.g. monitor,events)
    #[arg(short, long)]
    resources: Option<String>,

    /// Comma-separated HTTP methods (e.g. GET,POST)
    #[arg(short, long)]
    methods: Option<String>,

    /// Comma-separated tag filter
    #[arg(short, long)]
    tags: Option<String>,

    /// Comma-separated operationId filter
    #[arg(long)]
    operations: Option<String>,

    /// Comma-separated path patterns to skip
    #[arg(long)]
    exclude: Option<String>,

    /// Project config file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Skip generation-report.md
    #[arg(long)]
    no_report: bool,

    /// Also write blocks.manifest.json for the runtime executor
    #[arg(long)]
    manifest: bool,

    #[arg(hide = true)]
    ignored: Vec<String>,
}

/// Separate `-`-prefixed arguments the CLI does not define so they can be
/// warned about instead of aborting the run.
fn split_unknown_flags(args: Vec<String>) -> (Vec<String>, Vec<String>) {
    let command = Cli::command();
    let mut known = Vec::with_capacity(args.len());
    let mut unknown = Vec::new();
    let mut positional_only = false;
    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || positional_only || !arg.starts_with('-') || arg == "-" {
            known.push(arg);
            continue;
        }
        if arg == "--" {
            positional_only = true;
            known.push(arg);
            continue;
        }
        let recognized = match arg.strip_prefix("--") {
            Some(long) => {
                let name = long.split('=').next().unwrap_or(long);
                name == "help"
                    || name == "version"
                    || command.get_arguments().any(|a| a.get_long() == Some(name))
            }
            None => {
                let short = arg.chars().nth(1);
                matches!(short, Some('h') | Some('V'))
                    || command.get_arguments().any(|a| a.get_short() == short)
            }
        };
        if recognized {
            known.push(arg);
        } else {
            unknown.push(arg);
        }
    }
    (known, unknown)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (args, unknown) = split_unknown_flags(std::env::args().collect());
    let cli = Cli::parse_from(args);
    for flag in &unknown {
        warn!("Unknown argument: {flag}");
    }
    if !cli.ignored.is_empty() {
        warn!("Ignoring arguments: {}", cli.ignored.join(" "));
    }

    let cfg = config::load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?
        .unwrap_or_default();

    let source = cli
        .schema_url
        .clone()
        .or_else(|| cli.schema_file.as_ref().map(|p| p.display().to_string()));
    if source.is_none() {
        info!("No schema specified, processing the configured sources");
    }

    let options = GenerateOptions {
        output: cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&cfg.output)),
        source,
        filter: build_filter(
            cli.resources.as_deref(),
            cli.methods.as_deref(),
            cli.tags.as_deref(),
            cli.operations.as_deref(),
            cli.exclude.as_deref(),
        ),
        report: cfg.report && !cli.no_report,
        manifest: cfg.manifest || cli.manifest,
    };

    let loader = DefaultSchemaLoader::new()?;
    let summary = generate(&loader, &cfg, &options).await?;
    if !summary.block_names.is_empty() {
        info!(
            "Successfully generated {} Datadog API blocks",
            summary.block_names.len()
        );
    }
    Ok(())
}
