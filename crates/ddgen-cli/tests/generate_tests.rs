use std::collections::HashMap;
use std::fs;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use ddgen_cli::{GenerateOptions, SchemaLoader, build_filter, generate};
use ddgen_core::config::{DdgenConfig, SchemaSource};
use ddgen_core::parse::{self, OpenApiSpec};

const V1: &str = include_str!("fixtures/datadog-v1.yaml");
const V2: &str = include_str!("fixtures/datadog-v2.yaml");

/// Serves fixture documents by location; unknown locations fail.
struct StubLoader {
    documents: HashMap<String, &'static str>,
}

impl StubLoader {
    fn new(documents: &[(&str, &'static str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

#[async_trait]
impl SchemaLoader for StubLoader {
    async fn load(&self, location: &str) -> Result<OpenApiSpec> {
        let doc = self
            .documents
            .get(location)
            .ok_or_else(|| anyhow!("HTTP 404 Not Found when fetching {location}"))?;
        Ok(parse::from_yaml(doc)?)
    }
}

fn config() -> DdgenConfig {
    DdgenConfig {
        sources: vec![
            SchemaSource {
                version: "V1".to_string(),
                url: "mem://v1/openapi.yaml".to_string(),
            },
            SchemaSource {
                version: "V2".to_string(),
                url: "mem://v2/openapi.yaml".to_string(),
            },
        ],
        ..Default::default()
    }
}

fn options(output: &std::path::Path) -> GenerateOptions {
    GenerateOptions {
        output: output.to_path_buf(),
        source: None,
        filter: build_filter(None, None, None, None, None),
        report: true,
        manifest: false,
    }
}

#[tokio::test]
async fn default_filter_and_sources_write_output() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[("mem://v1/openapi.yaml", V1), ("mem://v2/openapi.yaml", V2)]);

    let summary = generate(&loader, &config(), &options(dir.path())).await.unwrap();

    assert_eq!(
        summary.block_names,
        vec!["GetMonitorV1", "ListMonitorsV2", "CreateEventV2", "GetMonitorV2"]
    );
    assert!(dir.path().join("GetMonitorV1.ts").exists());
    assert!(!dir.path().join("ListHostsV1.ts").exists());
    assert!(!dir.path().join("blocks.manifest.json").exists());

    let index = fs::read_to_string(dir.path().join("index.ts")).unwrap();
    assert!(index.contains("Total blocks: 4"));
    let report = fs::read_to_string(dir.path().join("generation-report.md")).unwrap();
    assert!(report.contains("### POST (1 blocks)"));

    let event = fs::read_to_string(dir.path().join("CreateEventV2.ts")).unwrap();
    assert!(event.contains("        requestPayload[\"title\"] = title;\n"));
    assert!(event.contains("        requestPayload[\"text\"] = text;\n"));
    assert!(event.contains("if (host !== undefined) requestPayload[\"host\"] = host;"));
}

#[tokio::test]
async fn failed_source_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[("mem://v2/openapi.yaml", V2)]);

    let summary = generate(&loader, &config(), &options(dir.path())).await.unwrap();
    assert_eq!(
        summary.block_names,
        vec!["ListMonitorsV2", "CreateEventV2", "GetMonitorV2"]
    );
}

#[tokio::test]
async fn all_sources_failing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[]);
    assert!(generate(&loader, &config(), &options(dir.path())).await.is_err());
}

#[tokio::test]
async fn explicit_source_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[("mem://v1/openapi.yaml", V1)]);
    let mut opts = options(dir.path());
    opts.source = Some("./missing.yaml".to_string());
    assert!(generate(&loader, &config(), &opts).await.is_err());
}

#[tokio::test]
async fn resource_filter_drops_other_resources() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[("./schemas/datadog.yaml", V2)]);
    let mut opts = options(dir.path());
    opts.source = Some("./schemas/datadog.yaml".to_string());
    opts.filter = build_filter(Some("monitor"), None, None, None, None);

    let summary = generate(&loader, &config(), &opts).await.unwrap();
    // No version tag for a source without a /v1/ or /v2/ segment.
    assert_eq!(summary.block_names, vec!["ListMonitors", "GetMonitor"]);
    assert!(!dir.path().join("CreateEvent.ts").exists());
}

#[tokio::test]
async fn zero_blocks_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("blocks");
    let loader = StubLoader::new(&[("mem://v1/openapi.yaml", V1), ("mem://v2/openapi.yaml", V2)]);
    let mut opts = options(&out);
    opts.filter = build_filter(None, Some("DELETE"), None, None, None);

    let summary = generate(&loader, &config(), &opts).await.unwrap();
    assert!(summary.block_names.is_empty());
    assert!(!out.exists());
}

#[tokio::test]
async fn manifest_and_report_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StubLoader::new(&[("mem://v1/openapi.yaml", V1), ("mem://v2/openapi.yaml", V2)]);
    let mut opts = options(dir.path());
    opts.report = false;
    opts.manifest = true;

    let summary = generate(&loader, &config(), &opts).await.unwrap();
    assert!(summary.files.contains(&dir.path().join("blocks.manifest.json")));
    assert!(!dir.path().join("generation-report.md").exists());
}

#[tokio::test]
async fn regeneration_is_idempotent() {
    let loader = StubLoader::new(&[("mem://v1/openapi.yaml", V1), ("mem://v2/openapi.yaml", V2)]);
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    generate(&loader, &config(), &options(first.path())).await.unwrap();
    generate(&loader, &config(), &options(second.path())).await.unwrap();

    for entry in fs::read_dir(first.path()).unwrap() {
        let entry = entry.unwrap();
        let other = second.path().join(entry.file_name());
        assert_eq!(
            fs::read(entry.path()).unwrap(),
            fs::read(other).unwrap(),
            "{:?} differs",
            entry.file_name()
        );
    }
}
