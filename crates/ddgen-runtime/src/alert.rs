use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AlertError {
    #[error("alert payload must be a JSON object")]
    NotAnObject,

    #[error("alert timestamp {0} is not a valid epoch-milliseconds value")]
    InvalidTimestamp(String),
}

/// Canonical alert forwarded to subscriber blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorAlert {
    pub monitor_id: String,
    pub monitor_name: String,
    pub status: String,
    pub transition_type: String,
    pub alert_condition: String,
    pub message: String,
    pub query: String,
    pub metric: String,
    pub scope: String,
    /// RFC 3339 with millisecond precision, UTC.
    pub timestamp: String,
    pub priority: String,
    pub tags: Vec<String>,
    pub event_type: String,
    pub url: String,
    pub monitor_url: String,
    pub event_url: String,
    pub raw_payload: Value,
}

/// Normalize a Datadog webhook payload. `site` is the Datadog site host,
/// e.g. `datadoghq.com` or `datadoghq.eu`.
pub fn normalize_alert(payload: &Value, site: &str) -> Result<MonitorAlert, AlertError> {
    let fields = payload.as_object().ok_or(AlertError::NotAnObject)?;

    let monitor_id = first_text(fields, &["monitor_id"]);
    let status = first_text(fields, &["status", "alert_transition", "alert_type"]);
    let event_url = first_text(fields, &["url", "link"]);

    Ok(MonitorAlert {
        monitor_url: format!("https://app.{site}/monitors/{monitor_id}"),
        monitor_name: first_text(fields, &["monitor_name", "alert_title", "title"]),
        transition_type: status.clone(),
        status,
        alert_condition: first_text(fields, &["alert_status", "previous_status"]),
        message: first_text(fields, &["message", "text_only_msg", "body"]),
        query: first_text(fields, &["alert_query"]),
        metric: first_text(fields, &["alert_metric"]),
        scope: first_text(fields, &["alert_scope"]),
        timestamp: parse_timestamp(fields.get("timestamp"))?,
        priority: first_text(fields, &["priority", "alert_priority"]),
        tags: parse_tags(fields.get("tags")),
        event_type: match first_text(fields, &["event_type"]) {
            t if t.is_empty() => "monitor_alert".to_string(),
            t => t,
        },
        url: event_url.clone(),
        event_url,
        monitor_id,
        raw_payload: payload.clone(),
    })
}

/// False for null, false, zero and the empty string.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, everything else as JSON text.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| is_truthy(value))
        .map(value_text)
        .unwrap_or_default()
}

fn parse_timestamp(value: Option<&Value>) -> Result<String, AlertError> {
    let raw = value.cloned().unwrap_or(Value::Null);
    let millis = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    millis
        .filter(|ms| ms.is_finite())
        .and_then(|ms| DateTime::from_timestamp_millis(ms.trunc() as i64))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| AlertError::InvalidTimestamp(raw.to_string()))
}

fn parse_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        Some(Value::String(s)) => s.split(',').map(|t| t.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_full_payload() {
        let payload = json!({
            "monitor_id": "12345",
            "monitor_name": "High CPU",
            "status": "Triggered",
            "alert_status": "CPU above 90%",
            "message": "CPU is high",
            "timestamp": "1700000000000",
            "url": "https://app.datadoghq.com/event/1",
            "tags": "env:prod, service:web",
            "alert_query": "avg(last_5m):avg:system.cpu.user{*} > 90",
            "alert_scope": "host:web-1",
            "alert_metric": "system.cpu.user",
            "priority": "P1",
            "event_type": "query_alert_monitor"
        });
        let alert = normalize_alert(&payload, "datadoghq.com").unwrap();

        assert_eq!(alert.monitor_id, "12345");
        assert_eq!(alert.monitor_name, "High CPU");
        assert_eq!(alert.status, "Triggered");
        assert_eq!(alert.transition_type, "Triggered");
        assert_eq!(alert.alert_condition, "CPU above 90%");
        assert_eq!(alert.query, "avg(last_5m):avg:system.cpu.user{*} > 90");
        assert_eq!(alert.metric, "system.cpu.user");
        assert_eq!(alert.scope, "host:web-1");
        assert_eq!(alert.timestamp, "2023-11-14T22:13:20.000Z");
        assert_eq!(alert.tags, vec!["env:prod", "service:web"]);
        assert_eq!(alert.event_type, "query_alert_monitor");
        assert_eq!(alert.url, "https://app.datadoghq.com/event/1");
        assert_eq!(alert.event_url, alert.url);
        assert_eq!(alert.monitor_url, "https://app.datadoghq.com/monitors/12345");
        assert_eq!(alert.raw_payload, payload);
    }

    #[test]
    fn test_fallback_fields_and_defaults() {
        let payload = json!({
            "monitor_id": 42,
            "alert_title": "Disk full",
            "status": "",
            "alert_transition": "Recovered",
            "text_only_msg": "ok now",
            "timestamp": 0,
            "link": "https://example.test/e",
            "tags": ["a", "b"],
            "alert_priority": "P3"
        });
        let alert = normalize_alert(&payload, "datadoghq.eu").unwrap();

        assert_eq!(alert.monitor_id, "42");
        assert_eq!(alert.monitor_name, "Disk full");
        assert_eq!(alert.status, "Recovered");
        assert_eq!(alert.message, "ok now");
        assert_eq!(alert.timestamp, "1970-01-01T00:00:00.000Z");
        assert_eq!(alert.priority, "P3");
        assert_eq!(alert.tags, vec!["a", "b"]);
        assert_eq!(alert.event_type, "monitor_alert");
        assert_eq!(alert.event_url, "https://example.test/e");
        assert_eq!(alert.monitor_url, "https://app.datadoghq.eu/monitors/42");
    }

    #[test]
    fn test_unparseable_timestamp_is_an_error() {
        let err = normalize_alert(&json!({"timestamp": "$DATE"}), "datadoghq.com").unwrap_err();
        assert!(matches!(err, AlertError::InvalidTimestamp(_)));
        assert!(matches!(
            normalize_alert(&json!({}), "datadoghq.com"),
            Err(AlertError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(
            normalize_alert(&json!([1, 2]), "datadoghq.com").unwrap_err(),
            AlertError::NotAnObject
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let alert = normalize_alert(&json!({"timestamp": 1}), "datadoghq.com").unwrap();
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["monitorUrl"], "https://app.datadoghq.com/monitors/");
        assert_eq!(value["eventType"], "monitor_alert");
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00.001Z");
    }
}
