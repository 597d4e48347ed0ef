use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use ddgen_core::parse::{self, DocumentFormat, OpenApiSpec};
use log::{debug, info};
use reqwest::Client;

/// Fetches and parses one OpenAPI document.
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    async fn load(&self, location: &str) -> Result<OpenApiSpec>;
}

/// Loads `http(s)://` locations over the network and everything else from disk.
pub struct DefaultSchemaLoader {
    client: Client,
}

impl DefaultSchemaLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn load_url(&self, url: &str) -> Result<OpenApiSpec> {
        info!("Fetching schema from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch schema from {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {status} when fetching {url}");
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let content = response
            .text()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        if content_type.contains("yaml") || DocumentFormat::from_location(url) == DocumentFormat::Yaml
        {
            return parse::from_yaml(&content).with_context(|| format!("failed to parse {url}"));
        }
        match parse::from_json(&content) {
            Ok(spec) => Ok(spec),
            Err(json_err) => {
                debug!("{url} is not JSON ({json_err}), trying YAML");
                parse::from_yaml(&content).with_context(|| format!("failed to parse {url}"))
            }
        }
    }

    fn load_file(&self, path: &Path) -> Result<OpenApiSpec> {
        info!("Reading schema from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let format = DocumentFormat::from_location(&path.to_string_lossy());
        parse::from_str(&content, format).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[async_trait]
impl SchemaLoader for DefaultSchemaLoader {
    async fn load(&self, location: &str) -> Result<OpenApiSpec> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.load_url(location).await
        } else {
            self.load_file(Path::new(location))
        }
    }
}
