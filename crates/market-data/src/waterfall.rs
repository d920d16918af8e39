use pulse_core::{Bar, DataSource, MarketDataProvider, PulseError};

use crate::twelvedata::TwelveDataClient;
use crate::yahoo::YahooClient;

/// History window requested from the primary vendor: two years of dailies
/// keeps the EMA 200 honest.
const HISTORY_DAYS: i64 = 730;

/// What a fetch produced: full bar history from the primary vendor, or a
/// bare quote from the fallback.
#[derive(Debug, Clone)]
pub enum MarketData {
    Bars(Vec<Bar>),
    Quote { price: f64, change_pct: f64 },
}

/// Primary/fallback fetch chain: the primary provider first, Twelve Data
/// when it fails or returns too little history, error only when every
/// source is out.
pub struct FetchWaterfall<P = YahooClient> {
    primary: P,
    twelvedata: Option<TwelveDataClient>,
}

impl FetchWaterfall<YahooClient> {
    pub fn from_env() -> Self {
        Self::new(YahooClient::new(), TwelveDataClient::from_env())
    }
}

impl<P: MarketDataProvider> FetchWaterfall<P> {
    pub fn new(primary: P, twelvedata: Option<TwelveDataClient>) -> Self {
        Self {
            primary,
            twelvedata,
        }
    }

    pub async fn fetch(&self, symbol: &str) -> Result<(MarketData, DataSource), PulseError> {
        match self.primary.daily_bars(symbol, HISTORY_DAYS).await {
            Ok(bars) if bars.len() >= 2 => {
                return Ok((MarketData::Bars(bars), DataSource::Yahoo));
            }
            Ok(bars) => {
                tracing::warn!(
                    "{} returned only {} bars for {}",
                    self.primary.name(),
                    bars.len(),
                    symbol
                );
            }
            Err(e) => {
                tracing::warn!("{} failed for {}: {}", self.primary.name(), symbol, e);
            }
        }

        if let Some(twelve) = &self.twelvedata {
            tracing::info!("Falling back to Twelve Data for {}", symbol);
            match twelve.get_quote(symbol).await {
                Ok(quote) => {
                    return Ok((
                        MarketData::Quote {
                            price: quote.price,
                            change_pct: quote.change_pct,
                        },
                        DataSource::TwelveData,
                    ));
                }
                Err(e) => {
                    tracing::warn!("Twelve Data failed for {}: {}", symbol, e);
                }
            }
        }

        Err(PulseError::AllSourcesFailed(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct StubProvider {
        bars: Result<usize, ()>,
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn daily_bars(&self, _symbol: &str, _days: i64) -> Result<Vec<Bar>, PulseError> {
            match self.bars {
                Ok(n) => Ok((0..n)
                    .map(|i| Bar {
                        timestamp: Utc::now(),
                        open: 100.0 + i as f64,
                        high: 101.0 + i as f64,
                        low: 99.0 + i as f64,
                        close: 100.5 + i as f64,
                        volume: 1000.0,
                    })
                    .collect()),
                Err(()) => Err(PulseError::ProviderError("stub down".to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_primary_with_history_wins() {
        let waterfall = FetchWaterfall::new(StubProvider { bars: Ok(100) }, None);
        let (data, source) = waterfall.fetch("AAPL").await.unwrap();
        assert_eq!(source, DataSource::Yahoo);
        assert!(matches!(data, MarketData::Bars(bars) if bars.len() == 100));
    }

    #[tokio::test]
    async fn test_short_history_without_fallback_fails() {
        let waterfall = FetchWaterfall::new(StubProvider { bars: Ok(1) }, None);
        let err = waterfall.fetch("AAPL").await.unwrap_err();
        assert!(matches!(err, PulseError::AllSourcesFailed(_)));
    }

    #[tokio::test]
    async fn test_primary_error_without_fallback_fails() {
        let waterfall = FetchWaterfall::new(StubProvider { bars: Err(()) }, None);
        let err = waterfall.fetch("NVDA").await.unwrap_err();
        assert!(matches!(err, PulseError::AllSourcesFailed(_)));
    }
}
