use async_trait::async_trait;
use pulse_core::{NotificationChannel, PulseError};
use telegram_client::{SendMessage, TelegramClient};

/// Telegram delivery channel. Alert bodies are Markdown.
pub struct TelegramNotifier {
    client: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationChannel for TelegramNotifier {
    async fn send(&self, chat_id: i64, message: &str) -> Result<(), PulseError> {
        self.client
            .send_message(&SendMessage::markdown(chat_id, message).without_preview())
            .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

/// Dispatches one alert to every configured channel, logging failures per
/// channel instead of propagating them.
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        if channels.is_empty() {
            tracing::warn!("No notification channels configured (set TELEGRAM_BOT_TOKEN)");
        }
        Self { channels }
    }

    pub fn from_env() -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        match TelegramClient::from_env() {
            Ok(client) => {
                tracing::info!("Telegram notifications enabled");
                channels.push(Box::new(TelegramNotifier::new(client)));
            }
            Err(e) => tracing::warn!("Telegram channel unavailable: {}", e),
        }

        Self::new(channels)
    }

    /// True when at least one channel accepted the message.
    pub async fn send(&self, chat_id: i64, message: &str) -> bool {
        let mut delivered = false;
        for channel in &self.channels {
            match channel.send(chat_id, message).await {
                Ok(()) => {
                    tracing::debug!("Sent notification via {}", channel.name());
                    delivered = true;
                }
                Err(e) => {
                    tracing::warn!("Failed to send via {}: {}", channel.name(), e);
                }
            }
        }
        delivered
    }
}
