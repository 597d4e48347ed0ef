//! Collaborators provided by the flow host, with in-memory implementations
//! for tests and embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::HostError;

/// App-scoped key/value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, HostError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), HostError>;
    async fn delete(&self, keys: &[&str]) -> Result<(), HostError>;
}

/// A block instance installed in the host, with its config values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub type_id: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// Installed blocks whose type is one of `type_ids`.
    async fn list(&self, type_ids: &[&str]) -> Result<Vec<Subscriber>, HostError>;
}

/// Body of an internal message between blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_to_blocks(
        &self,
        block_ids: &[String],
        message: &BlockMessage,
    ) -> Result<(), HostError>;
}

/// Receives the single event a block emits.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, payload: Value) -> Result<(), HostError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), HostError> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDirectory {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MemoryDirectory {
    pub fn new(subscribers: Vec<Subscriber>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers),
        }
    }

    pub async fn add(&self, subscriber: Subscriber) {
        self.subscribers.lock().await.push(subscriber);
    }
}

#[async_trait]
impl SubscriberDirectory for MemoryDirectory {
    async fn list(&self, type_ids: &[&str]) -> Result<Vec<Subscriber>, HostError> {
        Ok(self
            .subscribers
            .lock()
            .await
            .iter()
            .filter(|s| type_ids.contains(&s.type_id.as_str()))
            .cloned()
            .collect())
    }
}

/// Records every send for later inspection.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(Vec<String>, BlockMessage)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(Vec<String>, BlockMessage)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_to_blocks(
        &self,
        block_ids: &[String],
        message: &BlockMessage,
    ) -> Result<(), HostError> {
        self.sent
            .lock()
            .await
            .push((block_ids.to_vec(), message.clone()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Value>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<Value> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, payload: Value) -> Result<(), HostError> {
        self.events.lock().await.push(payload);
        Ok(())
    }
}
