use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Which vendor produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Yahoo,
    TwelveData,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Yahoo => "yahoo",
            DataSource::TwelveData => "twelvedata",
        }
    }
}

/// Per-symbol indicator snapshot. Every indicator is optional: the fallback
/// vendor only supplies price and change, and short histories drop the
/// longer EMAs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
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
    pub source: DataSource,
    pub recorded_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// A price-and-change-only snapshot from the fallback vendor.
    pub fn degraded(symbol: &str, price: f64, change_pct: f64, source: DataSource) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            change_pct: Some(change_pct),
            rsi: None,
            macd: None,
            macd_signal: None,
            ema_20: None,
            ema_50: None,
            ema_200: None,
            bb_upper: None,
            bb_lower: None,
            upside_pct: None,
            analyst_buy_pct: None,
            sentiment_score: None,
            source,
            recorded_at: Utc::now(),
        }
    }
}

/// News article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub tickers: Vec<String>,
}

/// Stock universe category, drives the scoring weight profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCategory {
    Core,
    Growth,
    Value,
    Dividend,
    Etf,
}

impl StockCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCategory::Core => "Core",
            StockCategory::Growth => "Growth",
            StockCategory::Value => "Value",
            StockCategory::Dividend => "Dividend",
            StockCategory::Etf => "ETF",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Growth" => StockCategory::Growth,
            "Value" => StockCategory::Value,
            "Dividend" => StockCategory::Dividend,
            "ETF" | "Etf" => StockCategory::Etf,
            _ => StockCategory::Core,
        }
    }
}

/// Buy/Hold/Sell recommendation derived from the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Recommendation::StrongBuy,
            s if s >= 65.0 => Recommendation::Buy,
            s if s >= 45.0 => Recommendation::Hold,
            s if s >= 30.0 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "\u{1F680}",
            Recommendation::Buy => "\u{2705}",
            Recommendation::Hold => "\u{23F8}\u{FE0F}",
            Recommendation::Sell => "\u{2B07}\u{FE0F}",
            Recommendation::StrongSell => "\u{1F534}",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Strong Buy" => Recommendation::StrongBuy,
            "Buy" => Recommendation::Buy,
            "Sell" => Recommendation::Sell,
            "Strong Sell" => Recommendation::StrongSell,
            _ => Recommendation::Hold,
        }
    }
}

/// A tracked symbol from stock_master
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub symbol: String,
    pub name: Option<String>,
    pub category: StockCategory,
    pub market_cap: Option<f64>,
}
