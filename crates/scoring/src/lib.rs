pub mod weights;

pub use weights::WeightProfile;

use chrono::{DateTime, Utc};
use pulse_core::{DataSource, IndicatorSnapshot, Recommendation, StockCategory};
use serde::{Deserialize, Serialize};

const NEUTRAL: f64 = 50.0;

/// One scoring run for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub overall_score: f64,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub sentiment_score: f64,
    pub risk_score: f64,
    pub recommendation: Recommendation,
    pub price_at_prediction: f64,
    pub created_at: DateTime<Utc>,
}

/// Technical component, 0-100. Works like a weighted vote over whichever
/// signals the snapshot can support; an empty snapshot lands on neutral 50.
pub fn technical_score(snap: &IndicatorSnapshot) -> f64 {
    let mut votes = 0i32;
    let mut weight = 0i32;

    if let Some(rsi) = snap.rsi {
        // Oversold reads as a buying opportunity, overbought as exhaustion
        let vote = if rsi < 25.0 {
            3
        } else if rsi < 30.0 {
            2
        } else if rsi > 75.0 {
            -3
        } else if rsi > 70.0 {
            -2
        } else {
            0
        };
        votes += vote;
        weight += 3;
    }

    if let (Some(macd), Some(signal)) = (snap.macd, snap.macd_signal) {
        votes += if macd > signal { 2 } else { -2 };
        weight += 2;
    }

    if let (Some(ema_20), Some(ema_50)) = (snap.ema_20, snap.ema_50) {
        if snap.price > ema_20 && ema_20 > ema_50 {
            votes += 2;
        } else if snap.price < ema_20 && ema_20 < ema_50 {
            votes -= 2;
        }
        weight += 2;
    }

    if let Some(ema_200) = snap.ema_200 {
        votes += if snap.price > ema_200 { 1 } else { -1 };
        weight += 1;
    }

    if let (Some(upper), Some(lower)) = (snap.bb_upper, snap.bb_lower) {
        if snap.price < lower {
            votes += 2;
        } else if snap.price > upper {
            votes -= 2;
        }
        weight += 2;
    }

    if weight == 0 {
        return NEUTRAL;
    }

    (NEUTRAL + NEUTRAL * votes as f64 / weight as f64).clamp(0.0, 100.0)
}

/// Fundamental component, 0-100, from analyst consensus and upside
/// potential. Each leg is optional; with neither the component is neutral.
pub fn fundamental_score(snap: &IndicatorSnapshot) -> f64 {
    let analyst = snap.analyst_buy_pct.map(|pct| pct.clamp(0.0, 100.0));

    // +-20% upside maps onto the full scale
    let upside = snap
        .upside_pct
        .map(|u| (NEUTRAL + u * 2.5).clamp(0.0, 100.0));

    match (analyst, upside) {
        (Some(a), Some(u)) => (a + u) / 2.0,
        (Some(a), None) => a,
        (None, Some(u)) => u,
        (None, None) => NEUTRAL,
    }
}

/// Sentiment component, 0-100: linear map of the [-1, 1] news score.
pub fn sentiment_score(snap: &IndicatorSnapshot) -> f64 {
    match snap.sentiment_score {
        Some(s) => ((s.clamp(-1.0, 1.0) + 1.0) / 2.0) * 100.0,
        None => NEUTRAL,
    }
}

/// Post-hoc risk score, 0-100. Adds up overextension above the long EMA,
/// RSI extremes, a Bollinger breakout and a degraded data source.
pub fn risk_score(snap: &IndicatorSnapshot) -> f64 {
    let mut risk: f64 = 0.0;

    if let Some(upside) = snap.upside_pct {
        // Negative upside means price is stretched above its long EMA
        if upside < -30.0 {
            risk += 40.0;
        } else if upside < -15.0 {
            risk += 25.0;
        }
    }

    if let Some(rsi) = snap.rsi {
        if rsi > 80.0 {
            risk += 20.0;
        } else if rsi < 20.0 {
            risk += 10.0;
        }
    }

    if let (Some(upper), _) = (snap.bb_upper, snap.bb_lower) {
        if snap.price > upper {
            risk += 10.0;
        }
    }

    if snap.source == DataSource::TwelveData {
        // Fallback snapshots carry no indicators to cross-check against
        risk += 30.0;
    }

    risk.clamp(0.0, 100.0)
}

/// Run the full scoring pipeline for one snapshot. The weighted overall
/// score is discounted by at most 50% depending on the risk score.
pub fn score_stock(
    snap: &IndicatorSnapshot,
    category: StockCategory,
    market_cap: Option<f64>,
) -> Prediction {
    let profile = WeightProfile::for_stock(category, market_cap);

    let technical = technical_score(snap);
    let fundamental = fundamental_score(snap);
    let sentiment = sentiment_score(snap);

    let raw = profile.technical * technical
        + profile.fundamental * fundamental
        + profile.sentiment * sentiment;
    let raw = raw.clamp(0.0, 100.0);

    let risk = risk_score(snap);
    let overall = (raw * (1.0 - risk / 200.0)).clamp(0.0, 100.0);
    let overall = (overall * 10.0).round() / 10.0;

    Prediction {
        symbol: snap.symbol.clone(),
        overall_score: overall,
        technical_score: (technical * 10.0).round() / 10.0,
        fundamental_score: (fundamental * 10.0).round() / 10.0,
        sentiment_score: (sentiment * 10.0).round() / 10.0,
        risk_score: risk,
        recommendation: Recommendation::from_score(overall),
        price_at_prediction: snap.price,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::DataSource;

    fn empty_snapshot(symbol: &str, price: f64) -> IndicatorSnapshot {
        IndicatorSnapshot::degraded(symbol, price, 0.0, DataSource::Yahoo)
    }

    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: Some(28.0),
            macd: Some(1.2),
            macd_signal: Some(0.8),
            ema_20: Some(98.0),
            ema_50: Some(95.0),
            ema_200: Some(90.0),
            bb_upper: Some(110.0),
            bb_lower: Some(96.0),
            upside_pct: Some(12.0),
            analyst_buy_pct: Some(85.0),
            sentiment_score: Some(0.6),
            ..empty_snapshot("AAPL", 100.0)
        }
    }

    fn bearish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: Some(82.0),
            macd: Some(-0.5),
            macd_signal: Some(0.2),
            ema_20: Some(105.0),
            ema_50: Some(110.0),
            ema_200: Some(80.0),
            bb_upper: Some(99.0),
            bb_lower: Some(90.0),
            upside_pct: Some(-20.0),
            analyst_buy_pct: Some(20.0),
            sentiment_score: Some(-0.7),
            ..empty_snapshot("XYZ", 100.0)
        }
    }

    #[test]
    fn test_components_neutral_without_indicators() {
        let snap = empty_snapshot("AAPL", 100.0);
        assert_eq!(technical_score(&snap), 50.0);
        assert_eq!(fundamental_score(&snap), 50.0);
        assert_eq!(sentiment_score(&snap), 50.0);
    }

    #[test]
    fn test_bullish_snapshot_scores_high() {
        let snap = bullish_snapshot();
        assert!(technical_score(&snap) > 70.0);
        assert!(fundamental_score(&snap) > 70.0);
        assert!((sentiment_score(&snap) - 80.0).abs() < 1e-9);

        let pred = score_stock(&snap, StockCategory::Core, Some(500e9));
        assert!(pred.overall_score >= 65.0);
        assert!(matches!(
            pred.recommendation,
            Recommendation::Buy | Recommendation::StrongBuy
        ));
    }

    #[test]
    fn test_bearish_snapshot_scores_low() {
        let snap = bearish_snapshot();
        assert!(technical_score(&snap) < 30.0);
        assert!(fundamental_score(&snap) < 40.0);

        let pred = score_stock(&snap, StockCategory::Core, Some(500e9));
        assert!(pred.overall_score < 45.0);
        assert!(matches!(
            pred.recommendation,
            Recommendation::Sell | Recommendation::StrongSell
        ));
    }

    #[test]
    fn test_sentiment_mapping_endpoints() {
        let mut snap = empty_snapshot("AAPL", 100.0);
        snap.sentiment_score = Some(1.0);
        assert_eq!(sentiment_score(&snap), 100.0);
        snap.sentiment_score = Some(-1.0);
        assert_eq!(sentiment_score(&snap), 0.0);
        snap.sentiment_score = Some(0.0);
        assert_eq!(sentiment_score(&snap), 50.0);
    }

    #[test]
    fn test_degraded_source_adds_risk() {
        let yahoo = empty_snapshot("AAPL", 100.0);
        let twelve = IndicatorSnapshot::degraded("AAPL", 100.0, 0.0, DataSource::TwelveData);
        assert_eq!(risk_score(&yahoo), 0.0);
        assert_eq!(risk_score(&twelve), 30.0);
    }

    #[test]
    fn test_risk_discount_is_bounded() {
        // Max out every risk component
        let snap = IndicatorSnapshot {
            rsi: Some(85.0),
            bb_upper: Some(90.0),
            bb_lower: Some(80.0),
            upside_pct: Some(-40.0),
            ..IndicatorSnapshot::degraded("MEME", 100.0, 0.0, DataSource::TwelveData)
        };
        let risk = risk_score(&snap);
        assert_eq!(risk, 100.0);

        // Even at maximum risk the discount halves the score, never zeroes it
        let pred = score_stock(&snap, StockCategory::Core, None);
        assert!(pred.overall_score > 0.0);
        assert!(pred.overall_score <= 50.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let pred = score_stock(&bullish_snapshot(), StockCategory::Growth, Some(1e9));
        assert!(pred.overall_score >= 0.0 && pred.overall_score <= 100.0);
    }

    #[test]
    fn test_prediction_carries_price() {
        let pred = score_stock(&bullish_snapshot(), StockCategory::Core, None);
        assert_eq!(pred.price_at_prediction, 100.0);
        assert_eq!(pred.symbol, "AAPL");
    }
}
