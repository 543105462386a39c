//! Push transport trait definition and shared error types.

/// Errors that can occur while talking to a push gateway.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("push gateway did not answer within {0}ms")]
    Timeout(u64),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One push notification for one device.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PushMessage {
    /// Recipient device token (`to` on the wire).
    #[serde(rename = "to")]
    pub token: String,
    pub title: String,
    pub body: String,
    /// Free-form payload delivered to the app alongside the notification.
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

/// A push gateway accepting a batch of messages in a single call.
#[async_trait::async_trait]
pub trait PushTransport: Send + Sync {
    /// Submit all `messages` in one request and return the gateway's raw
    /// response payload. Per-message results inside it are not interpreted.
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<serde_json::Value, NotifyError>;

    /// Human-readable name for this transport (e.g., "expo").
    fn transport_name(&self) -> &str;
}
