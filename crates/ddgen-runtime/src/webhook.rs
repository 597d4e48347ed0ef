use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::alert::{is_truthy, normalize_alert, value_text};
use crate::error::{HostError, WebhookError};
use crate::host::{BlockMessage, EventSink, KeyValueStore, Messenger, Subscriber, SubscriberDirectory};

/// Store key holding the secret expected in the `secret` query parameter.
pub const WEBHOOK_SECRET_KEY: &str = "webhook_secret";
/// Block type that receives forwarded monitor alerts.
pub const SUBSCRIBER_TYPE_ID: &str = "subscribeToMonitorV1";
pub const MONITOR_STATUS_CHANGE: &str = "monitor_status_change";

#[derive(Clone)]
pub struct WebhookState {
    pub store: Arc<dyn KeyValueStore>,
    pub directory: Arc<dyn SubscriberDirectory>,
    pub messenger: Arc<dyn Messenger>,
    /// Datadog site host used to build monitor links.
    pub site: String,
}

/// `POST /webhook`; every other path falls through to the same handler.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(receive))
        .fallback(receive)
        .with_state(state)
}

/// Serve the webhook router on `listener` until the server stops.
pub async fn serve(listener: TcpListener, state: WebhookState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Webhook receiver listening on {addr}");
    }
    axum::serve(listener, router(state)).await
}

async fn receive(
    State(state): State<WebhookState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    match process(&state, query.as_deref(), &body).await {
        Ok(matched) => (
            StatusCode::OK,
            Json(json!({ "success": true, "matched_blocks": matched })),
        )
            .into_response(),
        Err(err) => {
            match &err {
                WebhookError::Processing(detail) => {
                    error!("Error processing Datadog webhook: {detail}")
                }
                other => warn!("Rejected webhook: {other}"),
            }
            err.into_response()
        }
    }
}

/// Validate, normalize and forward one webhook delivery. Returns the number
/// of subscribers the alert was sent to.
pub async fn process(
    state: &WebhookState,
    query: Option<&str>,
    body: &[u8],
) -> Result<usize, WebhookError> {
    let requested = query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == "secret")
            .map(|(_, value)| value.into_owned())
    });
    let stored = state.store.get(WEBHOOK_SECRET_KEY).await?;
    match (requested, stored) {
        (Some(requested), Some(stored)) if !requested.is_empty() && requested == stored => {}
        _ => return Err(WebhookError::Unauthorized),
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WebhookError::MissingBody);
    }
    let payload: Value = serde_json::from_slice(body).map_err(WebhookError::InvalidBody)?;
    if payload.is_null() {
        return Err(WebhookError::MissingBody);
    }

    let alert =
        normalize_alert(&payload, &state.site).map_err(|e| WebhookError::Processing(e.to_string()))?;
    let subscribers = state.directory.list(&[SUBSCRIBER_TYPE_ID]).await?;
    let matched: Vec<String> = subscribers
        .iter()
        .filter(|s| subscriber_matches(s, &alert.monitor_id))
        .map(|s| s.id.clone())
        .collect();
    info!(
        "Monitor {} alert matched {} of {} subscribers",
        alert.monitor_id,
        matched.len(),
        subscribers.len()
    );

    if !matched.is_empty() {
        let data = serde_json::to_value(&alert).map_err(|e| WebhookError::Processing(e.to_string()))?;
        let message = BlockMessage {
            kind: MONITOR_STATUS_CHANGE.to_string(),
            data,
        };
        state.messenger.send_to_blocks(&matched, &message).await?;
    }
    Ok(matched.len())
}

/// A subscriber without a `monitor_id` filter receives every alert; with a
/// filter, only alerts for that id (or one of those ids).
pub fn subscriber_matches(subscriber: &Subscriber, monitor_id: &str) -> bool {
    let filter = subscriber.config.get("monitor_id").filter(|v| is_truthy(v));
    match filter {
        Some(_) if monitor_id.is_empty() => true,
        None => true,
        Some(Value::Array(ids)) => ids.iter().any(|id| value_text(id) == monitor_id),
        Some(id) => value_text(id) == monitor_id,
    }
}

/// Subscriber-side handling of an internal message: emit the alert data
/// for status changes, ignore anything else. Returns whether an event was
/// emitted.
pub async fn handle_subscriber_message(
    message: &BlockMessage,
    sink: &dyn EventSink,
) -> Result<bool, HostError> {
    if message.kind != MONITOR_STATUS_CHANGE {
        return Ok(false);
    }
    sink.emit(message.data.clone()).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::host::RecordingSink;

    fn subscriber(config: Value) -> Subscriber {
        let config: Map<String, Value> = serde_json::from_value(config).unwrap();
        Subscriber {
            id: "s".to_string(),
            type_id: SUBSCRIBER_TYPE_ID.to_string(),
            config,
        }
    }

    #[test]
    fn test_no_filter_matches_everything() {
        assert!(subscriber_matches(&subscriber(json!({})), "123"));
        assert!(subscriber_matches(&subscriber(json!({"monitor_id": ""})), "123"));
        assert!(subscriber_matches(&subscriber(json!({"monitor_id": null})), "123"));
    }

    #[test]
    fn test_filter_requires_equality_or_membership() {
        assert!(subscriber_matches(&subscriber(json!({"monitor_id": "123"})), "123"));
        assert!(!subscriber_matches(&subscriber(json!({"monitor_id": "999"})), "123"));
        assert!(subscriber_matches(
            &subscriber(json!({"monitor_id": ["1", "123"]})),
            "123"
        ));
        assert!(!subscriber_matches(&subscriber(json!({"monitor_id": ["1"]})), "123"));
    }

    #[test]
    fn test_empty_alert_monitor_id_matches() {
        assert!(subscriber_matches(&subscriber(json!({"monitor_id": "999"})), ""));
    }

    #[tokio::test]
    async fn test_subscriber_emits_only_status_changes() {
        let sink = RecordingSink::new();
        let change = BlockMessage {
            kind: MONITOR_STATUS_CHANGE.to_string(),
            data: json!({"monitorId": "1"}),
        };
        let other = BlockMessage {
            kind: "ping".to_string(),
            data: json!({}),
        };
        assert!(handle_subscriber_message(&change, &sink).await.unwrap());
        assert!(!handle_subscriber_message(&other, &sink).await.unwrap());
        assert_eq!(sink.events().await, vec![json!({"monitorId": "1"})]);
    }
}
