//! Telegram Bot API provider implementation.

use super::{ChatDirectory, NotificationSender};
use crate::error::{NotificationError, NotificationResult, SendError};
use crate::models::{ChatInfo, OutageNotification};
use crate::templates::TemplateEngine;
use async_trait::async_trait;
use domain_outages::ChatId;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram Bot API client.
pub struct TelegramSender {
    token: String,
    api_url: String,
    client: Client,
    templates: TemplateEngine,
}

impl TelegramSender {
    /// Create a sender for `token` against `api_url` (normally `https://api.telegram.org`).
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> NotificationResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            token: token.into(),
            api_url: api_url.into(),
            client,
            templates: TemplateEngine::new()?,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url.trim_end_matches('/'),
            self.token,
            method
        )
    }
}

// Telegram API request/response structures

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Serialize)]
struct GetChatRequest {
    chat_id: ChatId,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResult {
    id: ChatId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Classify a `sendMessage` reply.
///
/// The Bot API's `error_code`/`description` take precedence; a body that is
/// not an API envelope falls back to the HTTP status.
fn interpret_send_response(chat_id: ChatId, status: u16, body: &str) -> Result<(), SendError> {
    match serde_json::from_str::<ApiResponse<serde_json::Value>>(body) {
        Ok(response) if response.ok => Ok(()),
        Ok(response) => Err(SendError::new(
            chat_id,
            response.error_code.or(Some(i64::from(status))),
            response
                .description
                .unwrap_or_else(|| format!("Telegram API error (HTTP {status})")),
        )),
        Err(e) if (200..300).contains(&status) => Err(SendError::new(
            chat_id,
            None,
            format!("Malformed Telegram response: {e}"),
        )),
        Err(_) => Err(SendError::new(
            chat_id,
            Some(i64::from(status)),
            if body.trim().is_empty() {
                format!("Telegram API error (HTTP {status})")
            } else {
                body.trim().to_string()
            },
        )),
    }
}

fn interpret_api_response<T: DeserializeOwned>(status: u16, body: &str) -> NotificationResult<T> {
    let response: ApiResponse<T> = serde_json::from_str(body).map_err(|e| {
        NotificationError::Provider(format!("Malformed Telegram response (HTTP {status}): {e}"))
    })?;

    match response {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(NotificationError::Provider(format!(
            "Telegram error ({}): {}",
            error_code.unwrap_or(i64::from(status)),
            description.unwrap_or_else(|| "empty result".to_string())
        ))),
    }
}

impl From<ChatResult> for ChatInfo {
    fn from(chat: ChatResult) -> Self {
        ChatInfo {
            chat_id: chat.id,
            username: chat.username,
            first_name: chat.first_name.or(chat.title),
            last_name: chat.last_name,
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &OutageNotification) -> Result<(), SendError> {
        let chat_id = notification.chat_id;
        let text = self
            .templates
            .render_outage(notification)
            .map_err(|e| SendError::new(chat_id, None, e.to_string()))?;
        let request = SendMessageRequest {
            chat_id,
            text: &text,
            parse_mode: "HTML",
        };

        debug!(chat_id, street = %notification.street_name, "Sending notification via Telegram");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SendError::new(chat_id, None, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SendError::new(chat_id, Some(i64::from(status)), e.to_string()))?;

        interpret_send_response(chat_id, status, &body).inspect_err(|e| {
            warn!(chat_id, code = ?e.code, error = %e.message, "Telegram rejected notification");
        })
    }

    fn name(&self) -> &'static str {
        "Telegram"
    }
}

#[async_trait]
impl ChatDirectory for TelegramSender {
    async fn chat_info(&self, chat_id: ChatId) -> NotificationResult<ChatInfo> {
        let response = self
            .client
            .post(self.method_url("getChat"))
            .json(&GetChatRequest { chat_id })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        interpret_api_response::<ChatResult>(status, &body).map(ChatInfo::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let sender = TelegramSender::new("42:xyz", "http://localhost:8081/").unwrap();
        assert_eq!(
            sender.method_url("sendMessage"),
            "http://localhost:8081/bot42:xyz/sendMessage"
        );
    }

    #[test]
    fn test_send_request_uses_html_parse_mode() {
        let request = SendMessageRequest {
            chat_id: 100,
            text: "<b>hi</b>",
            parse_mode: "HTML",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], 100);
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["text"], "<b>hi</b>");
    }

    #[test]
    fn test_successful_send() {
        let body = r#"{"ok":true,"result":{"message_id":1,"chat":{"id":100}}}"#;
        assert_eq!(interpret_send_response(100, 200, body), Ok(()));
    }

    #[test]
    fn test_forbidden_is_blocked() {
        let body = r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#;
        let err = interpret_send_response(100, 403, body).unwrap_err();
        assert_eq!(err.chat_id, 100);
        assert_eq!(err.code, Some(403));
        assert!(err.is_blocked());
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 30"}"#;
        let err = interpret_send_response(100, 429, body).unwrap_err();
        assert_eq!(err.code, Some(429));
        assert!(!err.is_blocked());
    }

    #[test]
    fn test_bad_request_is_transient() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: message is too long"}"#;
        let err = interpret_send_response(100, 400, body).unwrap_err();
        assert_eq!(err.code, Some(400));
        assert!(!err.is_blocked());
    }

    #[test]
    fn test_malformed_success_body_has_no_code() {
        let err = interpret_send_response(100, 200, "not json at all").unwrap_err();
        assert_eq!(err.code, None);
        assert!(!err.is_blocked());
    }

    #[test]
    fn test_non_json_error_uses_http_status() {
        let err = interpret_send_response(100, 403, "<html>Forbidden</html>").unwrap_err();
        assert_eq!(err.code, Some(403));
        assert!(err.is_blocked());

        let err = interpret_send_response(100, 502, "").unwrap_err();
        assert_eq!(err.code, Some(502));
        assert!(!err.is_blocked());
    }

    #[test]
    fn test_get_chat_response() {
        let body = r#"{"ok":true,"result":{"id":5,"type":"private","username":"petro","first_name":"Петро"}}"#;
        let info: ChatInfo = interpret_api_response::<ChatResult>(200, body).unwrap().into();
        assert_eq!(
            info,
            ChatInfo {
                chat_id: 5,
                username: Some("petro".to_string()),
                first_name: Some("Петро".to_string()),
                last_name: None,
            }
        );
    }

    #[test]
    fn test_get_chat_error() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let err = interpret_api_response::<ChatResult>(400, body).unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }
}
