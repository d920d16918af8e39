use pulse_core::PulseError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::keypool::ApiKeyPool;
use crate::rate_limit::RateLimiter;

const BASE_URL: &str = "https://api.twelvedata.com";

/// Twelve Data's out-of-credits error code
const QUOTA_ERROR_CODE: i64 = 429;

/// Last close and day change from the fallback vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change_pct: f64,
}

/// Fallback vendor. Free-tier quotas are tiny (8 credits/min), so every
/// request draws a key from the rotation pool and quota errors push that key
/// onto cooldown instead of failing the whole fetch.
#[derive(Clone)]
pub struct TwelveDataClient {
    client: Client,
    keys: ApiKeyPool,
    rate_limiter: RateLimiter,
}

impl TwelveDataClient {
    pub fn new(keys: ApiKeyPool) -> Self {
        let rate_limit: usize = std::env::var("TWELVE_DATA_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            keys,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Build from the `TWELVE_DATA_KEYS` env var. None when unset so the
    /// waterfall can run Yahoo-only.
    pub fn from_env() -> Option<Self> {
        let raw = std::env::var("TWELVE_DATA_KEYS")
            .or_else(|_| std::env::var("TWELVE_DATA_KEY"))
            .ok()?;
        let pool = ApiKeyPool::from_env_value(&raw);
        Some(Self::new(pool))
    }

    /// Current quote. Rotates through the key pool on quota errors; gives up
    /// once every key is cooling down.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, PulseError> {
        loop {
            let key = self.keys.acquire().await?;
            self.rate_limiter.acquire().await;

            let url = format!("{}/quote", BASE_URL);
            let response = self
                .client
                .get(&url)
                .query(&[("symbol", symbol), ("apikey", &key)])
                .send()
                .await
                .map_err(|e| PulseError::ProviderError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(PulseError::ProviderError(format!(
                    "HTTP {} from Twelve Data for {}",
                    response.status(),
                    symbol
                )));
            }

            let body: QuoteResponse = response
                .json()
                .await
                .map_err(|e| PulseError::ProviderError(e.to_string()))?;

            match body {
                QuoteResponse::Err(err) if err.code == QUOTA_ERROR_CODE => {
                    tracing::warn!("Twelve Data quota hit for {}, rotating key", symbol);
                    self.keys.report_quota_error(&key).await;
                    continue;
                }
                QuoteResponse::Err(err) => {
                    return Err(PulseError::ProviderError(format!(
                        "Twelve Data {}: {}",
                        err.code, err.message
                    )));
                }
                QuoteResponse::Ok(raw) => return parse_quote(symbol, raw),
            }
        }
    }
}

fn parse_quote(symbol: &str, raw: RawQuote) -> Result<Quote, PulseError> {
    let price = raw
        .close
        .as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| PulseError::InvalidData(format!("no close price for {}", symbol)))?;

    let change_pct = raw
        .percent_change
        .as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| PulseError::InvalidData(format!("no percent change for {}", symbol)))?;

    Ok(Quote { price, change_pct })
}

// Twelve Data sends errors as 200s with an error body, so the response is
// either a quote or an {code, message, status} envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuoteResponse {
    Err(ErrorBody),
    Ok(RawQuote),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    message: String,
}

/// Numeric fields arrive as strings on this API
#[derive(Debug, Deserialize)]
struct RawQuote {
    close: Option<String>,
    percent_change: Option<String>,
}
