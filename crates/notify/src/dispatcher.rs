//! Submits one push batch per quest cycle.
//!
//! The dispatcher turns the recipient list into push messages and hands
//! them to the transport in a single call. Whatever happens on the wire,
//! the caller gets a [`DispatchOutcome`] back, never an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::traits::{NotifyError, PushMessage, PushTransport};

/// Summary of one dispatch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    /// Messages handed to the transport.
    pub attempted: usize,
    /// No recipients: nothing was sent.
    pub skipped: bool,
    /// Network error, non-2xx status or timeout.
    pub transport_failed: bool,
    /// Raw gateway response, when one arrived.
    pub response: Option<serde_json::Value>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl DispatchOutcome {
    fn skipped() -> Self {
        Self {
            attempted: 0,
            skipped: true,
            transport_failed: false,
            response: None,
            error: None,
            duration_ms: 0,
        }
    }

    /// The gateway accepted the batch.
    pub fn accepted(&self) -> bool {
        !self.skipped && !self.transport_failed
    }
}

/// Fans a notification out to every recipient through one transport call.
pub struct NotificationDispatcher {
    transport: Arc<dyn PushTransport>,
    /// Upper bound on the transport call.
    timeout: Duration,
    sound: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn PushTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            sound: Some("default".to_string()),
        }
    }

    /// Override the notification sound (`None` sends silent notifications).
    pub fn with_sound(mut self, sound: Option<String>) -> Self {
        self.sound = sound;
        self
    }

    pub fn transport_name(&self) -> &str {
        self.transport.transport_name()
    }

    /// Send `title`/`body`/`data` to every token in one batch.
    ///
    /// At most one transport call is made and it is never retried.
    pub async fn dispatch<I>(
        &self,
        title: &str,
        body: &str,
        data: &serde_json::Value,
        tokens: I,
    ) -> DispatchOutcome
    where
        I: IntoIterator<Item = String>,
    {
        let messages: Vec<PushMessage> = tokens
            .into_iter()
            .map(|token| PushMessage {
                token,
                title: title.to_string(),
                body: body.to_string(),
                data: data.clone(),
                sound: self.sound.clone(),
            })
            .collect();

        if messages.is_empty() {
            tracing::info!(
                transport = self.transport.transport_name(),
                "No push recipients — dispatch skipped"
            );
            return DispatchOutcome::skipped();
        }

        let attempted = messages.len();
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.transport.send_batch(&messages)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.timeout.as_millis() as u64)),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                tracing::info!(
                    transport = self.transport.transport_name(),
                    attempted,
                    duration_ms,
                    "Push batch delivered"
                );
                DispatchOutcome {
                    attempted,
                    skipped: false,
                    transport_failed: false,
                    response: Some(response),
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => {
                tracing::warn!(
                    transport = self.transport.transport_name(),
                    attempted,
                    error = %e,
                    duration_ms,
                    "Push batch delivery failed"
                );
                let response = match &e {
                    NotifyError::Status { body, .. } => Some(serde_json::Value::String(body.clone())),
                    _ => None,
                };
                DispatchOutcome {
                    attempted,
                    skipped: false,
                    transport_failed: true,
                    response,
                    error: Some(e.to_string()),
                    duration_ms,
                }
            }
        }
    }
}
