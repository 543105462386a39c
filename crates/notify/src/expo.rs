//! Expo push gateway transport.
//!
//! Posts the whole batch as a JSON array to the Expo send endpoint and
//! hands back the response body untouched.

use crate::traits::{NotifyError, PushMessage, PushTransport};

/// Delivers push batches to an Expo-compatible HTTP endpoint.
#[derive(Debug)]
pub struct ExpoPushTransport {
    /// Target URL (validated at construction).
    endpoint: String,
    /// Bearer token for projects with enhanced push security.
    access_token: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl ExpoPushTransport {
    /// Create a transport for `endpoint`.
    ///
    /// Invalid URLs produce a [`NotifyError::Config`] error.
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Result<Self, NotifyError> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| NotifyError::Config(format!("invalid push endpoint '{endpoint}': {e}")))?;

        Ok(Self {
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PushTransport for ExpoPushTransport {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<serde_json::Value, NotifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(messages);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                endpoint = %self.endpoint,
                %status,
                body = %body_text,
                "push gateway returned non-2xx status"
            );
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        // A body cut short on a 2xx is still a failed delivery.
        let body_text = response.text().await?;

        tracing::debug!(
            endpoint = %self.endpoint,
            messages = messages.len(),
            %status,
            "push batch accepted"
        );

        Ok(parse_response(body_text))
    }

    fn transport_name(&self) -> &str {
        "expo"
    }
}

/// Keep the payload as JSON when it is JSON, as a string otherwise.
fn parse_response(body: String) -> serde_json::Value {
    serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_invalid_endpoint() {
        let result = ExpoPushTransport::new("not a url", None);
        match result.unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("invalid push endpoint")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn empty_access_token_is_ignored() {
        let transport =
            ExpoPushTransport::new("https://exp.host/--/api/v2/push/send", Some(String::new()))
                .unwrap();
        assert!(transport.access_token.is_none());
        assert_eq!(transport.transport_name(), "expo");
    }

    #[test]
    fn message_wire_format() {
        let message = PushMessage {
            token: "ExponentPushToken[abc]".into(),
            title: "New daily quest: Goblin Cam".into(),
            body: "Take a selfie.".into(),
            data: json!({"quest_id": "daily_goblincam"}),
            sound: Some("default".into()),
        };
        let wire = serde_json::to_value([&message]).unwrap();
        assert_eq!(
            wire,
            json!([{
                "to": "ExponentPushToken[abc]",
                "title": "New daily quest: Goblin Cam",
                "body": "Take a selfie.",
                "data": {"quest_id": "daily_goblincam"},
                "sound": "default"
            }])
        );
    }

    #[test]
    fn sound_omitted_when_unset() {
        let message = PushMessage {
            token: "t".into(),
            title: "x".into(),
            body: "y".into(),
            data: json!({}),
            sound: None,
        };
        let wire = serde_json::to_value(&message).unwrap();
        assert!(wire.get("sound").is_none());
    }

    /// Serve one `200 OK` whose body stops short of its Content-Length.
    async fn truncated_ok_endpoint() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"data\":[",
                )
                .await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/--/api/v2/push/send")
    }

    fn one_message() -> Vec<PushMessage> {
        vec![PushMessage {
            token: "ExponentPushToken[abc]".into(),
            title: "t".into(),
            body: "b".into(),
            data: json!({}),
            sound: None,
        }]
    }

    #[tokio::test]
    async fn truncated_success_body_is_an_error() {
        let transport = ExpoPushTransport::new(truncated_ok_endpoint().await, None).unwrap();

        let err = transport.send_batch(&one_message()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn truncated_success_body_fails_the_dispatch() {
        use std::sync::Arc;
        use std::time::Duration;

        use crate::dispatcher::NotificationDispatcher;

        let transport = ExpoPushTransport::new(truncated_ok_endpoint().await, None).unwrap();
        let dispatcher = NotificationDispatcher::new(Arc::new(transport), Duration::from_secs(5));

        let outcome = dispatcher
            .dispatch("t", "b", &json!({}), vec!["ExponentPushToken[abc]".to_string()])
            .await;

        assert!(outcome.transport_failed);
        assert!(!outcome.accepted());
        assert!(outcome.error.is_some());
    }

    #[test]
    fn non_json_response_kept_as_text() {
        assert_eq!(parse_response("ok".into()), json!("ok"));
        assert_eq!(
            parse_response(r#"{"data":[{"status":"ok"}]}"#.into()),
            json!({"data": [{"status": "ok"}]})
        );
    }
}
