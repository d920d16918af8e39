use chrono::{DateTime, Utc};
use pulse_core::{NewsArticle, PulseError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::rate_limit::RateLimiter;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// News feed client over the finance search endpoint.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl Default for NewsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsClient {
    pub fn new() -> Self {
        let rate_limit: usize = std::env::var("NEWS_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    pub async fn get_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, PulseError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/v1/finance/search", BASE_URL);
        let count = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", symbol),
                ("newsCount", count.as_str()),
                ("quotesCount", "0"),
            ])
            .send()
            .await
            .map_err(|e| PulseError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PulseError::ProviderError(format!(
                "HTTP {} fetching news for {}",
                response.status(),
                symbol
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PulseError::ProviderError(e.to_string()))?;

        Ok(body
            .news
            .into_iter()
            .filter_map(|item| {
                let published_at = DateTime::from_timestamp(item.provider_publish_time?, 0)?;
                Some(NewsArticle {
                    title: item.title?,
                    source: item.publisher,
                    url: item.link,
                    published_at,
                    tickers: item.related_tickers,
                })
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
    #[serde(rename = "providerPublishTime")]
    provider_publish_time: Option<i64>,
    #[serde(rename = "relatedTickers", default)]
    related_tickers: Vec<String>,
}
