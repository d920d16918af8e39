use chrono::Utc;
use pulse_core::{Bar, DataSource, IndicatorSnapshot, PulseError};

use crate::indicators::{bollinger_bands, ema, macd, rsi};

/// Minimum bars needed before the indicator set is meaningful
const MIN_BARS: usize = 20;

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BB_PERIOD: usize = 20;
const BB_STD: f64 = 2.0;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Upside potential relative to the long EMA: how far below the EMA 200 the
/// price sits, as a percentage. Falls back to EMA 50 for short histories.
pub fn upside_pct(price: f64, ema_200: Option<f64>, ema_50: Option<f64>) -> Option<f64> {
    if price <= 0.0 {
        return None;
    }
    let anchor = ema_200.filter(|v| *v > 0.0).or(ema_50.filter(|v| *v > 0.0))?;
    Some(round2((anchor - price) / price * 100.0))
}

/// Compute the full indicator snapshot from daily bars, oldest first.
/// EMAs whose period exceeds the history come back None rather than being
/// extrapolated from a short seed.
pub fn compute_snapshot(symbol: &str, bars: &[Bar]) -> Result<IndicatorSnapshot, PulseError> {
    if bars.len() < MIN_BARS {
        return Err(PulseError::InsufficientData(format!(
            "{}: {} bars, need {}",
            symbol,
            bars.len(),
            MIN_BARS
        )));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let price = closes[closes.len() - 1];
    let prev_close = closes[closes.len() - 2];

    let change_pct = if prev_close > 0.0 {
        Some(round2((price - prev_close) / prev_close * 100.0))
    } else {
        None
    };

    let rsi_last = rsi(&closes, RSI_PERIOD).last().copied();

    let macd_result = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let macd_last = macd_result.macd_line.last().copied();
    let macd_signal_last = macd_result.signal_line.last().copied();

    let ema_20 = ema(&closes, 20).last().copied();
    let ema_50 = ema(&closes, 50).last().copied();
    let ema_200 = ema(&closes, 200).last().copied();

    let bb = bollinger_bands(&closes, BB_PERIOD, BB_STD);
    let bb_upper = bb.upper.last().copied();
    let bb_lower = bb.lower.last().copied();

    let upside = upside_pct(price, ema_200, ema_50);

    Ok(IndicatorSnapshot {
        symbol: symbol.to_string(),
        price,
        change_pct,
        rsi: rsi_last,
        macd: macd_last,
        macd_signal: macd_signal_last,
        ema_20,
        ema_50,
        ema_200,
        bb_upper,
        bb_lower,
        upside_pct: upside,
        analyst_buy_pct: None,
        sentiment_score: None,
        source: DataSource::Yahoo,
        recorded_at: Utc::now(),
    })
}
