use async_trait::async_trait;

use crate::{Bar, PulseError};

/// Trait for bar-serving market-data vendors. The fetch waterfall is generic
/// over its primary provider through this seam.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars covering roughly `days_back` calendar days, oldest first.
    async fn daily_bars(&self, symbol: &str, days_back: i64) -> Result<Vec<Bar>, PulseError>;

    fn name(&self) -> &'static str;
}

/// Trait for alert delivery channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, chat_id: i64, message: &str) -> Result<(), PulseError>;

    fn name(&self) -> &str;
}
