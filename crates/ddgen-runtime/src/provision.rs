use std::sync::Arc;

use log::{error, info};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::HostConfig;
use crate::error::HostError;
use crate::host::KeyValueStore;
use crate::webhook::WEBHOOK_SECRET_KEY;

pub const WEBHOOK_NAME_KEY: &str = "webhook_name";
const WEBHOOKS_PATH: &str = "/api/v1/integration/webhooks/configuration/webhooks";

/// Datadog webhook payload template; `$` variables are filled in by Datadog.
pub const ALERT_PAYLOAD_TEMPLATE: &str = r#"{
  "monitor_id": "$ALERT_ID",
  "monitor_name": "$ALERT_TITLE",
  "status": "$ALERT_TRANSITION",
  "alert_status": "$ALERT_STATUS",
  "message": "$TEXT_ONLY_MSG",
  "timestamp": "$DATE",
  "url": "$LINK",
  "tags": "$TAGS",
  "alert_query": "$ALERT_QUERY",
  "alert_scope": "$ALERT_SCOPE",
  "alert_metric": "$ALERT_METRIC",
  "priority": "$ALERT_PRIORITY",
  "event_type": "$EVENT_TYPE"
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Ready,
    Failed { description: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainStatus {
    Drained,
    DrainingFailed { description: String },
}

/// Registers and removes the Datadog webhook that feeds the receiver.
pub struct Provisioner {
    client: Client,
    config: HostConfig,
    store: Arc<dyn KeyValueStore>,
}

impl Provisioner {
    pub fn new(client: Client, config: HostConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("DD-API-KEY", &self.config.api_key)
            .header("DD-APPLICATION-KEY", &self.config.app_key)
    }

    /// Validate credentials, then create the webhook unless one is already
    /// registered. `app_http_url` is the public base URL of the receiver.
    pub async fn sync(&self, app_http_url: &str) -> SyncStatus {
        if let Err(description) = self.validate_credentials().await {
            return failed(description);
        }

        match self.store.get(WEBHOOK_NAME_KEY).await {
            Ok(Some(name)) if !name.is_empty() => {
                info!("Webhook already exists: {name}");
                return SyncStatus::Ready;
            }
            Ok(_) => {}
            Err(e) => return failed(format!("Failed to read webhook state: {e}")),
        }

        match self.create_webhook(app_http_url).await {
            Ok(()) => SyncStatus::Ready,
            Err(description) => failed(description),
        }
    }

    async fn validate_credentials(&self) -> Result<(), String> {
        let request = self.authed(self.client.get(self.config.endpoint("/api/v1/validate")));
        let response = request.send().await.map_err(|e| {
            error!("Failed to validate DataDog API credentials: {e}");
            "Failed to validate DataDog API credentials".to_string()
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("DataDog API validation failed: {status} - {body}");
            return Err("DataDog API validation failed".to_string());
        }

        let result: Value = response.json().await.map_err(|e| {
            error!("Failed to validate DataDog API credentials: {e}");
            "Failed to validate DataDog API credentials".to_string()
        })?;
        if result.get("valid").and_then(Value::as_bool) != Some(true) {
            return Err("DataDog API credentials are invalid".to_string());
        }
        Ok(())
    }

    async fn create_webhook(&self, app_http_url: &str) -> Result<(), String> {
        let secret = Uuid::new_v4().to_string();
        self.store
            .set(WEBHOOK_SECRET_KEY, &secret)
            .await
            .map_err(|e| format!("Failed to store webhook secret: {e}"))?;

        let name = format!("spacelift-flows-{}", Uuid::new_v4());
        let body = json!({
            "name": name,
            "url": format!("{}/webhook?secret={secret}", app_http_url.trim_end_matches('/')),
            "payload": ALERT_PAYLOAD_TEMPLATE,
        });
        let response = self
            .authed(self.client.post(self.config.endpoint(WEBHOOKS_PATH)))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to create webhook: {e}");
                "Failed to create webhook".to_string()
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Webhook creation failed: {status} - {text}");
            return Err("Webhook creation failed".to_string());
        }

        self.store
            .set(WEBHOOK_NAME_KEY, &name)
            .await
            .map_err(|e| format!("Failed to store webhook name: {e}"))?;
        info!("Created webhook {name}");
        Ok(())
    }

    /// Delete the registered webhook and forget its name and secret.
    pub async fn drain(&self) -> DrainStatus {
        match self.try_drain().await {
            Ok(()) => DrainStatus::Drained,
            Err(description) => {
                error!("{description}");
                DrainStatus::DrainingFailed { description }
            }
        }
    }

    async fn try_drain(&self) -> Result<(), String> {
        let name = self
            .store
            .get(WEBHOOK_NAME_KEY)
            .await
            .map_err(|e| host_failure(&e))?;
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            info!("No webhook name stored, skipping webhook deletion");
            return Ok(());
        };

        let url = self.config.endpoint(&format!("{WEBHOOKS_PATH}/{name}"));
        let response = self
            .authed(self.client.delete(url))
            .send()
            .await
            .map_err(|e| format!("Error during webhook cleanup: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!(
                "Failed to delete webhook: {} {} - {text}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
        }
        info!("Deleted webhook {name}");

        self.store
            .delete(&[WEBHOOK_NAME_KEY, WEBHOOK_SECRET_KEY])
            .await
            .map_err(|e| host_failure(&e))?;
        Ok(())
    }
}

fn failed(description: String) -> SyncStatus {
    error!("Sync failed: {description}");
    SyncStatus::Failed { description }
}

fn host_failure(err: &HostError) -> String {
    format!("Error during webhook cleanup: {err}")
}
