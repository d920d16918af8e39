use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Bar, MarketDataProvider, PulseError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::rate_limit::RateLimiter;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Primary market-data vendor. Unauthenticated, but aggressive about 429s,
/// so requests go through a sliding-window limiter.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        // 60 req/min by default; YAHOO_RATE_LIMIT overrides for slow lanes
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Send a request with rate limiting and bounded 429 retry.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PulseError> {
        let request = builder
            .build()
            .map_err(|e| PulseError::ProviderError(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| PulseError::ProviderError("cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| PulseError::ProviderError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!(
                "Yahoo 429 rate limited, waiting {}s before retry {}/3",
                wait_secs,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(PulseError::ProviderError(
            "rate limited by Yahoo after 3 retries".to_string(),
        ))
    }

    /// Daily bars for roughly `days_back` calendar days, oldest first. Rows
    /// with null quote fields (halts, partial sessions) are dropped.
    pub async fn get_daily_bars(&self, symbol: &str, days_back: i64) -> Result<Vec<Bar>, PulseError> {
        let range = range_param(days_back);
        let url = format!("{}/v8/finance/chart/{}", BASE_URL, symbol);

        let response = self
            .send_request(
                self.client
                    .get(&url)
                    .query(&[("range", range), ("interval", "1d"), ("events", "div,splits")]),
            )
            .await?;

        if !response.status().is_success() {
            return Err(PulseError::ProviderError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| PulseError::ProviderError(e.to_string()))?;

        if let Some(err) = chart.chart.error {
            return Err(PulseError::ProviderError(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        let result = chart
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                PulseError::InvalidData(format!("empty chart result for {}", symbol))
            })?;

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| PulseError::InvalidData(format!("no quote block for {}", symbol)))?;

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let (open, high, low, close) = match (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            ) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };

            let timestamp = DateTime::from_timestamp(*ts, 0).unwrap_or_else(Utc::now);
            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
            });
        }

        Ok(bars)
    }

    /// Most recent analyst grade strings ("Buy", "Overweight", ...), newest
    /// first, capped at `limit`.
    pub async fn recent_grades(&self, symbol: &str, limit: usize) -> Result<Vec<String>, PulseError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", BASE_URL, symbol);

        let response = self
            .send_request(
                self.client
                    .get(&url)
                    .query(&[("modules", "upgradeDowngradeHistory")]),
            )
            .await?;

        if !response.status().is_success() {
            return Err(PulseError::ProviderError(format!(
                "HTTP {} fetching grades for {}",
                response.status(),
                symbol
            )));
        }

        let summary: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| PulseError::ProviderError(e.to_string()))?;

        let mut history = summary
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|r| r.upgrade_downgrade_history)
            .map(|h| h.history)
            .unwrap_or_default();

        history.sort_by(|a, b| b.epoch_grade_date.cmp(&a.epoch_grade_date));

        Ok(history
            .into_iter()
            .filter_map(|h| h.to_grade.filter(|g| !g.is_empty()))
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn daily_bars(&self, symbol: &str, days_back: i64) -> Result<Vec<Bar>, PulseError> {
        self.get_daily_bars(symbol, days_back).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

fn range_param(days_back: i64) -> &'static str {
    match days_back {
        d if d <= 5 => "5d",
        d if d <= 31 => "1mo",
        d if d <= 93 => "3mo",
        d if d <= 186 => "6mo",
        d if d <= 366 => "1y",
        d if d <= 731 => "2y",
        d if d <= 1827 => "5y",
        _ => "10y",
    }
}

// ---- Raw response shapes ----

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "upgradeDowngradeHistory")]
    upgrade_downgrade_history: Option<UpgradeDowngradeHistory>,
}

#[derive(Debug, Deserialize)]
struct UpgradeDowngradeHistory {
    #[serde(default)]
    history: Vec<GradeEntry>,
}

#[derive(Debug, Deserialize)]
struct GradeEntry {
    #[serde(rename = "epochGradeDate", default)]
    epoch_grade_date: i64,
    #[serde(rename = "toGrade")]
    to_grade: Option<String>,
}
