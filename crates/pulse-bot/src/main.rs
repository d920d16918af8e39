//! pulse-bot: interactive Telegram menu bot over the collected data.
//!
//! Long-polls getUpdates and routes commands (/start, /recommended) and
//! inline-keyboard callbacks to screen handlers. All market data comes from
//! the store; the bot itself never talks to the vendors.

mod format;
mod handlers;

use chrono::Local;
use handlers::Route;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use store::PulseDb;
use telegram_client::{
    CallbackQuery, EditMessageText, Message, SendMessage, TelegramClient, Update,
};
use tokio::sync::RwLock;

const RATE_LIMIT_COMMANDS: u32 = 5;
const RATE_LIMIT_WINDOW_SECS: u64 = 60;
const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_SECS: u64 = 5;

struct Bot {
    db: PulseDb,
    telegram: TelegramClient,
    rate_limits: Arc<RwLock<HashMap<i64, (Instant, u32)>>>,
}

impl Bot {
    async fn check_rate_limit(&self, chat_id: i64) -> Result<(), u64> {
        let mut limits = self.rate_limits.write().await;
        let now = Instant::now();

        if limits.len() > 1000 {
            limits.retain(|_, (ts, _)| now.duration_since(*ts).as_secs() < RATE_LIMIT_WINDOW_SECS);
        }

        if let Some((window_start, count)) = limits.get_mut(&chat_id) {
            let elapsed = now.duration_since(*window_start).as_secs();
            if elapsed >= RATE_LIMIT_WINDOW_SECS {
                *window_start = now;
                *count = 1;
                Ok(())
            } else if *count >= RATE_LIMIT_COMMANDS {
                Err(RATE_LIMIT_WINDOW_SECS - elapsed)
            } else {
                *count += 1;
                Ok(())
            }
        } else {
            limits.insert(chat_id, (now, 1));
            Ok(())
        }
    }

    async fn handle_update(&self, update: Update) {
        if let Some(message) = update.message {
            if let Err(e) = self.handle_message(&message).await {
                tracing::warn!("message handler failed: {}", e);
            }
        } else if let Some(callback) = update.callback_query {
            if let Err(e) = self.handle_callback(&callback).await {
                tracing::warn!("callback handler failed: {}", e);
            }
        }
    }

    async fn handle_message(&self, message: &Message) -> anyhow::Result<()> {
        let chat_id = message.chat.id;
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };

        if self.check_rate_limit(chat_id).await.is_err() {
            return Ok(());
        }

        let command = text.split_whitespace().next().unwrap_or("");
        match command {
            "/start" => {
                let (text, keyboard) = format::main_menu();
                self.telegram
                    .send_message(&SendMessage::markdown(chat_id, text).with_keyboard(keyboard))
                    .await?;
            }
            "/recommended" => {
                let picks = self.db.top_predictions(70.0, 10).await?;
                let updated = Local::now().format("%d/%m/%Y %H:%M").to_string();
                let body = format::recommended_inline(&picks, &updated);
                self.telegram
                    .send_message(&SendMessage::markdown(chat_id, body))
                    .await?;
            }
            _ => {
                self.telegram
                    .send_message(&SendMessage::markdown(
                        chat_id,
                        "Send /start to open the menu",
                    ))
                    .await?;
            }
        }

        Ok(())
    }

    async fn handle_callback(&self, callback: &CallbackQuery) -> anyhow::Result<()> {
        let Some(message) = &callback.message else {
            self.telegram
                .answer_callback_query(&callback.id, Some("This menu has expired"))
                .await?;
            return Ok(());
        };
        let chat_id = message.chat.id;

        if let Err(wait_secs) = self.check_rate_limit(chat_id).await {
            self.telegram
                .answer_callback_query(
                    &callback.id,
                    Some(&format!("Rate limited. Try again in {}s", wait_secs)),
                )
                .await?;
            return Ok(());
        }

        let Some(route) = callback.data.as_deref().and_then(Route::parse) else {
            self.telegram
                .answer_callback_query(&callback.id, Some("Unknown action"))
                .await?;
            return Ok(());
        };

        // Short popup for the mutating routes, silent ack otherwise
        let ack = match &route {
            Route::Watch(symbol) => Some(format!("\u{2B50} {} added to watchlist", symbol)),
            Route::Toggle(_) => Some("Updated".to_string()),
            _ => None,
        };
        self.telegram
            .answer_callback_query(&callback.id, ack.as_deref())
            .await?;

        let (text, keyboard) = handlers::render(&self.db, chat_id, &route).await?;
        self.telegram
            .edit_message_text(
                &EditMessageText::markdown(chat_id, message.message_id, text)
                    .with_keyboard(keyboard)
                    .without_preview(),
            )
            .await?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_bot=info,telegram_client=warn".into()),
        )
        .init();

    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:stockpulse.db".to_string());
    let bot = Arc::new(Bot {
        db: PulseDb::new(&db_url).await?,
        telegram: TelegramClient::from_env()?,
        rate_limits: Arc::new(RwLock::new(HashMap::new())),
    });

    tracing::info!("Bot is running");

    let mut offset: Option<i64> = None;
    loop {
        match bot.telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    let bot = Arc::clone(&bot);
                    tokio::spawn(async move {
                        bot.handle_update(update).await;
                    });
                }
            }
            Err(e) => {
                tracing::warn!("getUpdates failed: {}, retrying in {}s", e, POLL_RETRY_SECS);
                tokio::time::sleep(std::time::Duration::from_secs(POLL_RETRY_SECS)).await;
            }
        }
    }
}
