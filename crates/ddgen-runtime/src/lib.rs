pub mod alert;
pub mod config;
pub mod error;
pub mod executor;
pub mod host;
pub mod manifest;
pub mod provision;
pub mod webhook;

pub use alert::{AlertError, MonitorAlert, normalize_alert};
pub use config::HostConfig;
pub use error::{HostError, RuntimeError, WebhookError};
pub use executor::BlockExecutor;
pub use host::{BlockMessage, EventSink, KeyValueStore, Messenger, Subscriber, SubscriberDirectory};
pub use manifest::BlockManifest;
pub use provision::{DrainStatus, Provisioner, SyncStatus};
pub use webhook::{WebhookState, router};
