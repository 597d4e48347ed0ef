use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.datadoghq.com";
pub const DEFAULT_SITE: &str = "datadoghq.com";

/// Credentials and endpoints supplied by the host application config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    pub api_key: String,
    pub app_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Datadog site used for links back into the web app.
    #[serde(default = "default_site")]
    pub site: String,
}

impl HostConfig {
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
            base_url: default_base_url(),
            site: default_site(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `<base_url><path>` with no doubled slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_site() -> String {
    DEFAULT_SITE.to_string()
}
