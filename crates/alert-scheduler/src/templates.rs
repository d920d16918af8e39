use store::{NewsRow, PredictionRow, SnapshotRow};

pub fn score_emoji(score: f64) -> &'static str {
    if score >= 80.0 {
        "\u{1F31F}"
    } else if score >= 70.0 {
        "\u{2705}"
    } else if score >= 60.0 {
        "\u{1F44D}"
    } else if score >= 50.0 {
        "\u{1F610}"
    } else if score >= 40.0 {
        "\u{26A0}\u{FE0F}"
    } else {
        "\u{274C}"
    }
}

fn change_emoji(change_pct: f64) -> &'static str {
    if change_pct > 0.0 {
        "\u{1F7E2}"
    } else {
        "\u{1F534}"
    }
}

pub fn price_alert(symbol: &str, current: f64, target: f64, change_pct: Option<f64>) -> String {
    let mut msg = format!(
        "\u{1F514} *Price Alert*\n\n\
         *{}* hit its target price!\n\
         \u{1F4B0} Current: ${:.2}\n\
         \u{1F3AF} Target: ${:.2}\n",
        symbol, current, target
    );
    if let Some(change) = change_pct {
        msg.push_str(&format!("{} Change: {:+.2}%\n", change_emoji(change), change));
    }
    msg.push_str("\nSend /start to open the menu");
    msg
}

pub fn rsi_alert(symbol: &str, rsi: f64, price: f64) -> String {
    if rsi < 30.0 {
        format!(
            "\u{1F4CA} *RSI Oversold Alert*\n\n\
             *{}* RSI is very low - potential entry!\n\
             \u{1F4C9} RSI: {:.1} (Oversold)\n\
             \u{1F4B5} Price: ${:.2}\n\
             \u{1F3AF} Worth a closer look\n\n\
             Send /start to open the menu",
            symbol, rsi, price
        )
    } else {
        format!(
            "\u{1F4CA} *RSI Overbought Alert*\n\n\
             *{}* RSI is very high - consider taking profit!\n\
             \u{1F4C8} RSI: {:.1} (Overbought)\n\
             \u{1F4B5} Price: ${:.2}\n\
             \u{1F3AF} Watch for a pullback\n\n\
             Send /start to open the menu",
            symbol, rsi, price
        )
    }
}

pub fn score_alert(pred: &PredictionRow, upside_pct: Option<f64>) -> String {
    let mut msg = format!(
        "\u{1F916} *High Score Alert*\n\n\
         *{}* just scored {:.0}/100!\n\
         \u{2B50} Score: {:.0}/100\n\
         {} Recommendation: {}\n",
        pred.symbol,
        pred.overall_score,
        pred.overall_score,
        score_emoji(pred.overall_score),
        pred.recommendation
    );
    if let Some(price) = pred.price_at_prediction {
        msg.push_str(&format!("\u{1F4B0} Price: ${:.2}\n", price));
    }
    if let Some(upside) = upside_pct {
        msg.push_str(&format!("\u{1F4C8} Upside: {:+.1}%\n", upside));
    }
    msg.push_str("\nSend /start to open the menu");
    msg
}

pub fn news_alert(news: &NewsRow) -> String {
    let sentiment = news.sentiment_score.unwrap_or(0.0);
    let (tone, glyph) = if sentiment > 0.0 {
        ("positive", "\u{1F7E2}")
    } else {
        ("negative", "\u{1F534}")
    };

    let title: String = if news.title.chars().count() > 100 {
        let cut: String = news.title.chars().take(100).collect();
        format!("{}...", cut)
    } else {
        news.title.clone()
    };

    let mut msg = format!(
        "\u{1F4F0} *Breaking News*\n\n\
         *{}* - {} news {}\n\
         \u{1F4CC} {}\n\n\
         \u{1F4AD} Sentiment: {:+.2}\n",
        news.symbol, tone, glyph, title, sentiment
    );
    if let Some(url) = &news.url {
        msg.push_str(&format!("\u{1F517} [Read more]({})\n", url));
    }
    msg.push_str("\nSend /start to open the menu");
    msg
}

pub fn daily_summary(
    date_label: &str,
    breadth_pct: Option<f64>,
    gainers: &[SnapshotRow],
    losers: &[SnapshotRow],
    picks: &[PredictionRow],
) -> String {
    let mut msg = format!("\u{23F0} *Market Summary for {}*\n\n", date_label);

    if let Some(breadth) = breadth_pct {
        msg.push_str(&format!(
            "\u{1F4CA} *Overview*\n\u{2022} Stocks up: {:.0}%\n\n",
            breadth
        ));
    }

    msg.push_str("\u{1F525} *Top Gainers*\n");
    for (i, stock) in gainers.iter().enumerate() {
        msg.push_str(&format!(
            "{}. {}: {:+.2}%\n",
            i + 1,
            stock.symbol,
            stock.change_pct.unwrap_or(0.0)
        ));
    }

    msg.push_str("\n\u{2744}\u{FE0F} *Top Losers*\n");
    for (i, stock) in losers.iter().enumerate() {
        msg.push_str(&format!(
            "{}. {}: {:+.2}%\n",
            i + 1,
            stock.symbol,
            stock.change_pct.unwrap_or(0.0)
        ));
    }

    if !picks.is_empty() {
        msg.push_str("\n\u{1F916} *Today's Picks*\n");
        for pred in picks {
            msg.push_str(&format!(
                "\u{2022} {} ({:.0}/100) - {}\n",
                pred.symbol, pred.overall_score, pred.recommendation
            ));
        }
    }

    msg.push_str("\n\u{1F4A1} Questions? Send /start");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pred(symbol: &str, score: f64, rec: &str) -> PredictionRow {
        PredictionRow {
            id: Some(1),
            symbol: symbol.to_string(),
            overall_score: score,
            technical_score: score,
            fundamental_score: score,
            sentiment_score: score,
            risk_score: 0.0,
            recommendation: rec.to_string(),
            price_at_prediction: Some(123.45),
            created_at: "2026-02-01T09:00:00".to_string(),
        }
    }

    fn snap(symbol: &str, change: f64) -> SnapshotRow {
        SnapshotRow {
            id: Some(1),
            symbol: symbol.to_string(),
            price: 100.0,
            change_pct: Some(change),
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
            source: "yahoo".to_string(),
            recorded_at: "2026-02-01T09:00:00".to_string(),
        }
    }

    #[test]
    fn test_score_emoji_tiers() {
        assert_eq!(score_emoji(85.0), "\u{1F31F}");
        assert_eq!(score_emoji(72.0), "\u{2705}");
        assert_eq!(score_emoji(61.0), "\u{1F44D}");
        assert_eq!(score_emoji(55.0), "\u{1F610}");
        assert_eq!(score_emoji(42.0), "\u{26A0}\u{FE0F}");
        assert_eq!(score_emoji(20.0), "\u{274C}");
    }

    #[test]
    fn test_price_alert_body() {
        let msg = price_alert("AAPL", 201.5, 200.0, Some(1.8));
        assert!(msg.contains("*AAPL*"));
        assert!(msg.contains("$201.50"));
        assert!(msg.contains("$200.00"));
        assert!(msg.contains("+1.80%"));
    }

    #[test]
    fn test_rsi_alert_direction() {
        let oversold = rsi_alert("AAPL", 25.0, 100.0);
        assert!(oversold.contains("Oversold"));
        let overbought = rsi_alert("AAPL", 78.0, 100.0);
        assert!(overbought.contains("Overbought"));
    }

    #[test]
    fn test_score_alert_includes_upside_when_present() {
        let with = score_alert(&pred("NVDA", 88.0, "Strong Buy"), Some(12.3));
        assert!(with.contains("Upside: +12.3%"));
        let without = score_alert(&pred("NVDA", 88.0, "Strong Buy"), None);
        assert!(!without.contains("Upside"));
    }

    #[test]
    fn test_news_alert_truncates_long_titles() {
        let news = NewsRow {
            id: Some(1),
            symbol: "AAPL".to_string(),
            title: "a".repeat(150),
            source: None,
            url: Some("https://example.com".to_string()),
            sentiment_score: Some(0.8),
            published_at: "2026-02-01T09:00:00".to_string(),
        };
        let msg = news_alert(&news);
        assert!(msg.contains("..."));
        assert!(msg.contains("positive"));
        assert!(msg.contains("[Read more](https://example.com)"));
    }

    #[test]
    fn test_daily_summary_sections() {
        let msg = daily_summary(
            "01 Feb 2026",
            Some(62.0),
            &[snap("UP", 4.2)],
            &[snap("DOWN", -3.1)],
            &[pred("NVDA", 82.0, "Strong Buy")],
        );
        assert!(msg.contains("Stocks up: 62%"));
        assert!(msg.contains("Top Gainers"));
        assert!(msg.contains("1. UP: +4.20%"));
        assert!(msg.contains("1. DOWN: -3.10%"));
        assert!(msg.contains("NVDA (82/100) - Strong Buy"));
    }
}
