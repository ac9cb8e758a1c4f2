//! Telegram channel over the Bot API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{render, Notifier, NotifyError};
use crate::config::TelegramConfig;
use crate::models::LeadRecord;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Posts a short lead summary to a chat
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, lead: &LeadRecord) -> Result<String, NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        );
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: render::chat_text(lead, render::TELEGRAM_MAX_LEN),
        };

        debug!("Sending lead {} to chat {}", lead.id, self.config.chat_id);

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();

        // The Bot API reports errors in the body, with a matching HTTP status
        let body: BotResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::InvalidResponse(e.without_url().to_string()))?;

        match body {
            BotResponse {
                ok: true,
                result: Some(sent),
                ..
            } => Ok(sent.message_id.to_string()),
            BotResponse {
                ok: true,
                result: None,
                ..
            } => Err(NotifyError::InvalidResponse("missing result".to_string())),
            BotResponse {
                description,
                error_code,
                ..
            } => Err(NotifyError::Rejected {
                status: error_code.unwrap_or(status.as_u16()),
                message: description.unwrap_or_else(|| "unknown error".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientMeta, LeadResponse, NotificationOutcome};
    use crate::notify::{FanOut, TELEGRAM_CHANNEL};
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use quota_common::LeadSubmission;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn lead(message: &str) -> LeadRecord {
        LeadRecord::new(
            LeadSubmission {
                name: "Mario Rossi".to_string(),
                email: "mario@acme.it".to_string(),
                company: "Acme".to_string(),
                message: message.to_string(),
                share: 20.0,
                client_hours: 368.0,
                client_cost: 16000.0,
                target: 80000.0,
                weeks: 46.0,
                days_per_week: 5.0,
                hours_per_day: 8.0,
            },
            ClientMeta {
                ip: "1.2.3.4".to_string(),
                user_agent: "test".to_string(),
            },
        )
    }

    fn notifier(api_url: String) -> TelegramNotifier {
        TelegramNotifier::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            api_url,
        })
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_send_truncates_and_acks() {
        let seen: Arc<Mutex<Option<(String, Value)>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();

        let app = Router::new().route(
            "/{bot}/sendMessage",
            post(move |Path(bot): Path<String>, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().await = Some((bot, body));
                    Json(json!({ "ok": true, "result": { "message_id": 777 } }))
                }
            }),
        );
        let base = serve(app).await;

        let id = notifier(base).send(&lead(&"y".repeat(5000))).await.unwrap();
        assert_eq!(id, "777");

        let (bot, body) = seen.lock().await.clone().expect("request captured");
        assert_eq!(bot, "bot123:abc");
        assert_eq!(body["chat_id"], "42");
        let text = body["text"].as_str().unwrap();
        assert_eq!(text.encode_utf16().count(), render::TELEGRAM_MAX_LEN);
    }

    #[tokio::test]
    async fn test_send_error_payload() {
        let app = Router::new().route(
            "/{bot}/sendMessage",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "ok": false,
                        "error_code": 400,
                        "description": "Bad Request: chat not found"
                    })),
                )
            }),
        );
        let base = serve(app).await;

        let err = notifier(base).send(&lead("hi")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provider rejected request (400): Bad Request: chat not found"
        );
    }

    #[tokio::test]
    async fn test_unreachable_outcome_hides_token() {
        let telegram = TelegramNotifier::new(TelegramConfig {
            bot_token: "SECRET-BOT-TOKEN".to_string(),
            chat_id: "42".to_string(),
            // Nothing listens on port 9 locally
            api_url: "http://127.0.0.1:9".to_string(),
        });
        let fan_out = FanOut::new().with_channel(TELEGRAM_CHANNEL, Some(Arc::new(telegram)));

        let outcomes = fan_out.dispatch(&lead("hi")).await;
        assert!(matches!(outcomes[0].1, NotificationOutcome::Failed { .. }));

        let body = serde_json::to_string(&LeadResponse::accepted(outcomes)).unwrap();
        assert!(body.contains("\"ok\":false"));
        assert!(!body.contains("SECRET-BOT-TOKEN"), "token in body: {}", body);
    }

    #[tokio::test]
    async fn test_garbled_response_hides_token() {
        let app = Router::new().route("/{bot}/sendMessage", post(|| async { "<html>502</html>" }));
        let base = serve(app).await;

        let err = TelegramNotifier::new(TelegramConfig {
            bot_token: "SECRET-BOT-TOKEN".to_string(),
            chat_id: "42".to_string(),
            api_url: base,
        })
        .send(&lead("hi"))
        .await
        .unwrap_err();

        assert!(matches!(err, NotifyError::InvalidResponse(_)));
        assert!(!err.to_string().contains("SECRET-BOT-TOKEN"));
    }
}
