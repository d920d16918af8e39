pub mod types;

pub use types::*;

use pulse_core::PulseError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.telegram.org";

/// Typed Telegram Bot API client. Flood-control 429s are retried honoring
/// the server's retry_after hint.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    client: Client,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { token, client }
    }

    pub fn from_env() -> Result<Self, PulseError> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| PulseError::TelegramError("TELEGRAM_BOT_TOKEN not set".to_string()))?;
        Ok(Self::new(token))
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, PulseError> {
        let url = format!("{}/bot{}/{}", BASE_URL, self.token, method);

        for attempt in 0..3u32 {
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| PulseError::TelegramError(e.to_string()))?;

            let envelope: ApiResponse<T> = response
                .json()
                .await
                .map_err(|e| PulseError::TelegramError(e.to_string()))?;

            if envelope.ok {
                return envelope.result.ok_or_else(|| {
                    PulseError::TelegramError(format!("{}: ok response without result", method))
                });
            }

            // Flood control: wait what the server asks, then retry
            if envelope.error_code == Some(429) {
                let wait = envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .unwrap_or(3) as u64;
                tracing::warn!(
                    "Telegram flood control on {}, waiting {}s (retry {}/3)",
                    method,
                    wait,
                    attempt + 1
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            return Err(PulseError::TelegramError(format!(
                "{}: {}",
                method,
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Err(PulseError::TelegramError(format!(
            "{}: flood controlled after 3 retries",
            method
        )))
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<Message, PulseError> {
        self.call("sendMessage", message).await
    }

    pub async fn edit_message_text(&self, edit: &EditMessageText) -> Result<Message, PulseError> {
        self.call("editMessageText", edit).await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<bool, PulseError> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackQuery {
                callback_query_id: callback_query_id.to_string(),
                text: text.map(|t| t.to_string()),
            },
        )
        .await
    }

    /// Long poll for updates. `offset` should be last update_id + 1.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, PulseError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: timeout_secs,
                allowed_updates: vec!["message".to_string(), "callback_query".to_string()],
            },
        )
        .await
    }
}
