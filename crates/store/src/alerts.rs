use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{PriceAlertRow, UserSettingsRow};
use crate::{fmt_ts, PulseDb};

/// Per-chat notification toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingToggle {
    RsiAlerts,
    AiAlerts,
    NewsAlerts,
    DailySummary,
}

impl SettingToggle {
    fn column(&self) -> &'static str {
        match self {
            SettingToggle::RsiAlerts => "enable_rsi_alerts",
            SettingToggle::AiAlerts => "enable_ai_alerts",
            SettingToggle::NewsAlerts => "enable_news_alerts",
            SettingToggle::DailySummary => "enable_daily_summary",
        }
    }
}

impl PulseDb {
    // ---- price alerts ----

    pub async fn create_price_alert(
        &self,
        chat_id: i64,
        symbol: &str,
        target_price: f64,
        above: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO price_alerts (chat_id, symbol, target_price, condition)
             VALUES (?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(symbol)
        .bind(target_price)
        .bind(if above { "above" } else { "below" })
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn active_price_alerts(&self) -> Result<Vec<PriceAlertRow>> {
        let rows = sqlx::query_as::<_, PriceAlertRow>(
            "SELECT id, chat_id, symbol, target_price, condition, is_active
             FROM price_alerts WHERE is_active = 1",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// One-shot alerts: a fired alert is deactivated, not deleted.
    pub async fn mark_alert_triggered(&self, alert_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE price_alerts SET is_active = 0, triggered_at = ? WHERE id = ?",
        )
        .bind(fmt_ts(Utc::now()))
        .bind(alert_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // ---- user settings ----

    pub async fn get_settings(&self, chat_id: i64) -> Result<UserSettingsRow> {
        let row = sqlx::query_as::<_, UserSettingsRow>(
            "SELECT chat_id, enable_rsi_alerts, enable_ai_alerts,
                    enable_news_alerts, enable_daily_summary
             FROM user_settings WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.unwrap_or(UserSettingsRow {
            chat_id,
            enable_rsi_alerts: 0,
            enable_ai_alerts: 0,
            enable_news_alerts: 0,
            enable_daily_summary: 0,
        }))
    }

    /// Flip one toggle, returning the new state.
    pub async fn toggle_setting(&self, chat_id: i64, toggle: SettingToggle) -> Result<bool> {
        let column = toggle.column();
        let sql = format!(
            "INSERT INTO user_settings (chat_id, {col}, updated_at)
             VALUES (?, 1, datetime('now'))
             ON CONFLICT(chat_id) DO UPDATE SET
                 {col} = 1 - {col},
                 updated_at = datetime('now')",
            col = column
        );
        sqlx::query(&sql).bind(chat_id).execute(self.pool()).await?;

        let settings = self.get_settings(chat_id).await?;
        let enabled = match toggle {
            SettingToggle::RsiAlerts => settings.enable_rsi_alerts,
            SettingToggle::AiAlerts => settings.enable_ai_alerts,
            SettingToggle::NewsAlerts => settings.enable_news_alerts,
            SettingToggle::DailySummary => settings.enable_daily_summary,
        };
        Ok(enabled != 0)
    }

    pub async fn chats_with_toggle(&self, toggle: SettingToggle) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT chat_id FROM user_settings WHERE {} = 1",
            toggle.column()
        );
        let rows: Vec<(i64,)> = sqlx::query_as(&sql).fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ---- watchlist ----

    pub async fn watchlist(&self, chat_id: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT symbol FROM user_watchlist WHERE chat_id = ? ORDER BY symbol",
        )
        .bind(chat_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Returns false when the symbol was already watched.
    pub async fn add_to_watchlist(&self, chat_id: i64, symbol: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_watchlist (chat_id, symbol) VALUES (?, ?)",
        )
        .bind(chat_id)
        .bind(symbol)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_from_watchlist(&self, chat_id: i64, symbol: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM user_watchlist WHERE chat_id = ? AND symbol = ?",
        )
        .bind(chat_id)
        .bind(symbol)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- notification log ----

    pub async fn log_notification(
        &self,
        chat_id: i64,
        notification_type: &str,
        symbol: Option<&str>,
        message: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO notification_log (chat_id, notification_type, symbol, message, sent_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(notification_type)
        .bind(symbol)
        .bind(message)
        .bind(fmt_ts(Utc::now()))
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Dedup check: was this chat already notified about this symbol and
    /// kind within the window?
    pub async fn was_notified_since(
        &self,
        chat_id: i64,
        notification_type: &str,
        symbol: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notification_log
             WHERE chat_id = ? AND notification_type = ?
               AND (symbol = ? OR (symbol IS NULL AND ? IS NULL))
               AND sent_at >= ?",
        )
        .bind(chat_id)
        .bind(notification_type)
        .bind(symbol)
        .bind(symbol)
        .bind(fmt_ts(since))
        .fetch_one(self.pool())
        .await?;

        Ok(count.0 > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_price_alert_lifecycle() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.create_price_alert(7, "AAPL", 200.0, true).await.unwrap();
        db.create_price_alert(7, "MSFT", 300.0, false).await.unwrap();

        let active = db.active_price_alerts().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].condition, "above");

        db.mark_alert_triggered(active[0].id).await.unwrap();
        let active = db.active_price_alerts().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].symbol, "MSFT");
    }

    #[tokio::test]
    async fn test_setting_toggles() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        // Unknown chat: all toggles default off
        let settings = db.get_settings(7).await.unwrap();
        assert_eq!(settings.enable_rsi_alerts, 0);

        assert!(db.toggle_setting(7, SettingToggle::RsiAlerts).await.unwrap());
        assert!(!db.toggle_setting(7, SettingToggle::RsiAlerts).await.unwrap());
        assert!(db.toggle_setting(7, SettingToggle::DailySummary).await.unwrap());

        assert_eq!(db.chats_with_toggle(SettingToggle::RsiAlerts).await.unwrap(), Vec::<i64>::new());
        assert_eq!(db.chats_with_toggle(SettingToggle::DailySummary).await.unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_watchlist_round_trip() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        assert!(db.add_to_watchlist(7, "AAPL").await.unwrap());
        assert!(!db.add_to_watchlist(7, "AAPL").await.unwrap());
        assert!(db.add_to_watchlist(7, "MSFT").await.unwrap());

        assert_eq!(db.watchlist(7).await.unwrap(), vec!["AAPL", "MSFT"]);

        assert!(db.remove_from_watchlist(7, "AAPL").await.unwrap());
        assert!(!db.remove_from_watchlist(7, "AAPL").await.unwrap());
        assert_eq!(db.watchlist(7).await.unwrap(), vec!["MSFT"]);
    }

    #[tokio::test]
    async fn test_notification_dedup_window() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();
        let hour_ago = Utc::now() - Duration::hours(1);

        assert!(!db
            .was_notified_since(7, "rsi_alert", Some("AAPL"), hour_ago)
            .await
            .unwrap());

        db.log_notification(7, "rsi_alert", Some("AAPL"), "RSI oversold")
            .await
            .unwrap();

        assert!(db
            .was_notified_since(7, "rsi_alert", Some("AAPL"), hour_ago)
            .await
            .unwrap());
        // Different symbol or kind is not deduped
        assert!(!db
            .was_notified_since(7, "rsi_alert", Some("MSFT"), hour_ago)
            .await
            .unwrap());
        assert!(!db
            .was_notified_since(7, "news_alert", Some("AAPL"), hour_ago)
            .await
            .unwrap());

        // Symbol-less kinds (daily summary) dedup on NULL
        db.log_notification(7, "daily_summary", None, "summary")
            .await
            .unwrap();
        assert!(db
            .was_notified_since(7, "daily_summary", None, hour_ago)
            .await
            .unwrap());
    }
}
