//! Push-token enumeration over the `users` collection.

use std::sync::Arc;

use futures::future;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::document::{DocumentStore, USERS};
use crate::error::StorageError;

/// Field of a user document holding the device push token.
pub const PUSH_TOKEN_FIELD: &str = "pushToken";

/// Read-only view of the recipients of a quest notification.
#[derive(Clone)]
pub struct RecipientEnumerator {
    store: Arc<dyn DocumentStore>,
}

impl RecipientEnumerator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Lazily stream every usable push token.
    ///
    /// Users without a usable token are skipped, not reported: a subset of
    /// users without push capability is the normal case. Only a backend
    /// failure produces an error item.
    pub fn tokens(&self) -> BoxStream<'_, Result<String, StorageError>> {
        self.store
            .stream_all(USERS)
            .try_filter_map(|doc| {
                let token = push_token(&doc.body);
                if token.is_none() {
                    debug!(user_id = %doc.id, "user has no usable push token");
                }
                future::ready(Ok(token))
            })
            .boxed()
    }

    pub async fn collect_tokens(&self) -> Result<Vec<String>, StorageError> {
        self.tokens().try_collect().await
    }
}

/// Extract a usable token from a user document.
///
/// Absent, non-string and blank values are rejected, as are values with
/// embedded whitespace or control characters (e.g. an error message the
/// client stored in place of a token).
pub fn push_token(user: &serde_json::Value) -> Option<String> {
    let raw = user.get(PUSH_TOKEN_FIELD)?.as_str()?.trim();
    if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }
    Some(raw.to_string())
}
