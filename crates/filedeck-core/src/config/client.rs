//! API client and upload coordinator configuration.

use serde::{Deserialize, Serialize};

/// Settings used by `filedeck-client` and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the FileDeck API, including the version prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Owner identity sent with every request.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Optional per-request timeout in seconds. Unset means the transport
    /// default applies.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// How long a successful upload stays visible in the queue.
    #[serde(default = "default_success_linger")]
    pub success_linger_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            owner_id: None,
            request_timeout_seconds: None,
            success_linger_ms: default_success_linger(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api/v1".to_string()
}

fn default_success_linger() -> u64 {
    2000
}
