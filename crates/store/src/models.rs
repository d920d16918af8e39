use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockMasterRow {
    pub id: Option<i64>,
    pub symbol: String,
    pub name: Option<String>,
    pub category: String,
    pub market_cap: Option<f64>,
    pub is_active: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: Option<i64>,
    pub symbol: String,
    pub price: f64,
    pub change_pct: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub upside_pct: Option<f64>,
    pub analyst_buy_pct: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub source: String,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PredictionRow {
    pub id: Option<i64>,
    pub symbol: String,
    pub overall_score: f64,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub sentiment_score: f64,
    pub risk_score: f64,
    pub recommendation: String,
    pub price_at_prediction: Option<f64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsRow {
    pub id: Option<i64>,
    pub symbol: String,
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub sentiment_score: Option<f64>,
    pub published_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceAlertRow {
    pub id: i64,
    pub chat_id: i64,
    pub symbol: String,
    pub target_price: f64,
    pub condition: String,
    pub is_active: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettingsRow {
    pub chat_id: i64,
    pub enable_rsi_alerts: i64,
    pub enable_ai_alerts: i64,
    pub enable_news_alerts: i64,
    pub enable_daily_summary: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistRow {
    pub id: Option<i64>,
    pub chat_id: i64,
    pub symbol: String,
}
