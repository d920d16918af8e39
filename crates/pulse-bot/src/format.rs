use pulse_core::StockCategory;
use store::{NewsRow, PredictionRow, SnapshotRow, UserSettingsRow};
use telegram_client::{InlineKeyboardButton, InlineKeyboardMarkup};

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

pub fn sentiment_glyph(sentiment: f64) -> &'static str {
    if sentiment > 0.3 {
        "\u{1F60A}"
    } else if sentiment >= -0.3 {
        "\u{1F610}"
    } else {
        "\u{1F61F}"
    }
}

fn news_dot(sentiment: Option<f64>) -> &'static str {
    match sentiment {
        Some(s) if s > 0.0 => "\u{1F7E2}",
        Some(s) if s < 0.0 => "\u{1F534}",
        _ => "\u{26AA}",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn back_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback(
        "\u{1F3E0} Main menu",
        "menu:main",
    )]
}

// ---- screens ----

pub fn main_menu() -> (String, InlineKeyboardMarkup) {
    let text = "\u{1F3AF} *Welcome to StockPulse*\n\n\
        Stock analysis that helps you:\n\
        \u{2022} Track prices and momentum\n\
        \u{2022} Read RSI, MACD and EMA signals\n\
        \u{2022} Follow the score and recommendation engine\n\
        \u{2022} Catch news with strong sentiment\n\n\
        Pick a menu below \u{1F447}"
        .to_string();

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("\u{1F4CA} Market overview", "menu:market"),
            InlineKeyboardButton::callback("\u{2B50} Top picks", "menu:picks"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{1F50D} Browse stocks", "menu:search"),
            InlineKeyboardButton::callback("\u{1F4C8} Watchlist", "menu:watchlist"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{1F4F0} Latest news", "menu:news"),
            InlineKeyboardButton::callback("\u{1F916} Predictions", "menu:predictions"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{2699}\u{FE0F} Notifications", "menu:settings"),
            InlineKeyboardButton::callback("\u{2139}\u{FE0F} Help", "menu:help"),
        ],
    ]);

    (text, keyboard)
}

pub fn market_overview(
    gainers: &[SnapshotRow],
    losers: &[SnapshotRow],
    top_scores: &[PredictionRow],
) -> (String, InlineKeyboardMarkup) {
    let mut text = "\u{1F4CA} *Market Overview*\n\n".to_string();

    text.push_str("\u{1F525} *Top Gainers*\n");
    for stock in gainers {
        let change = stock.change_pct.unwrap_or(0.0);
        let emoji = if change > 5.0 { "\u{1F680}" } else { "\u{1F4C8}" };
        text.push_str(&format!(
            "{} {}: ${:.2} ({:+.2}%)\n",
            emoji, stock.symbol, stock.price, change
        ));
    }

    text.push_str("\n\u{2744}\u{FE0F} *Top Losers*\n");
    for stock in losers {
        let change = stock.change_pct.unwrap_or(0.0);
        let emoji = if change < -5.0 { "\u{1F494}" } else { "\u{1F4C9}" };
        text.push_str(&format!(
            "{} {}: ${:.2} ({:+.2}%)\n",
            emoji, stock.symbol, stock.price, change
        ));
    }

    if !top_scores.is_empty() {
        text.push_str("\n\u{1F916} *Top Scores*\n");
        for pred in top_scores {
            text.push_str(&format!(
                "\u{2B50} {}: {:.0}/100 ({})\n",
                pred.symbol, pred.overall_score, pred.recommendation
            ));
        }
    }

    (text, InlineKeyboardMarkup::new(vec![back_row()]))
}

pub fn top_picks(
    picks: &[(PredictionRow, Option<SnapshotRow>)],
) -> (String, InlineKeyboardMarkup) {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    let text = if picks.is_empty() {
        "\u{1F4ED} No picks right now (score >= 70)".to_string()
    } else {
        let mut text = "\u{2B50} *Top Picks (score >= 70)*\n\n".to_string();

        for (i, (pred, snapshot)) in picks.iter().enumerate() {
            text.push_str(&format!(
                "{}. *{}* - {:.0}/100 {}\n",
                i + 1,
                pred.symbol,
                pred.overall_score,
                score_emoji(pred.overall_score)
            ));
            text.push_str(&format!("   \u{1F3AF} {}\n", pred.recommendation));

            if let Some(snap) = snapshot {
                text.push_str(&format!(
                    "   \u{1F4CA} ${:.2} ({:+.2}%)",
                    snap.price,
                    snap.change_pct.unwrap_or(0.0)
                ));
                if let Some(rsi) = snap.rsi {
                    text.push_str(&format!(" | RSI {:.1}", rsi));
                }
                if let Some(upside) = snap.upside_pct {
                    text.push_str(&format!(" | Upside {:+.1}%", upside));
                }
                text.push('\n');
            }
            text.push('\n');
        }

        text.push_str("\u{1F4A1} _Tap a symbol for details_");

        for chunk in picks.chunks(3) {
            rows.push(
                chunk
                    .iter()
                    .map(|(pred, _)| {
                        InlineKeyboardButton::callback(
                            pred.symbol.clone(),
                            format!("stock:{}", pred.symbol),
                        )
                    })
                    .collect(),
            );
        }

        text
    };

    rows.push(back_row());
    (text, InlineKeyboardMarkup::new(rows))
}

pub fn categories_menu() -> (String, InlineKeyboardMarkup) {
    let text = "\u{1F50D} *Browse Stocks*\n\n\
        Pick a category:\n\n\
        \u{1F4CA} *Core* - the main universe\n\
        \u{1F680} *Growth* - high-growth names\n\
        \u{1F4B0} *Value* - priced below the fundamentals\n\
        \u{1F4C8} *Dividend* - steady payers\n\
        \u{1F6E1}\u{FE0F} *ETF* - index funds"
        .to_string();

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("\u{1F4CA} Core", "category:Core"),
            InlineKeyboardButton::callback("\u{1F680} Growth", "category:Growth"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{1F4B0} Value", "category:Value"),
            InlineKeyboardButton::callback("\u{1F4C8} Dividend", "category:Dividend"),
        ],
        vec![InlineKeyboardButton::callback("\u{1F6E1}\u{FE0F} ETFs", "category:ETF")],
        back_row(),
    ]);

    (text, keyboard)
}

pub fn category_stocks(
    category: StockCategory,
    symbols: &[String],
) -> (String, InlineKeyboardMarkup) {
    if symbols.is_empty() {
        return (
            format!("\u{274C} No stocks in the {} category", category.as_str()),
            InlineKeyboardMarkup::new(vec![back_row()]),
        );
    }

    let text = format!(
        "\u{1F4CA} *{} stocks*\n\nTap one for details:",
        category.as_str()
    );

    let mut rows: Vec<Vec<InlineKeyboardButton>> = symbols
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .map(|s| InlineKeyboardButton::callback(s.clone(), format!("stock:{}", s)))
                .collect()
        })
        .collect();

    rows.push(vec![
        InlineKeyboardButton::callback("\u{1F519} Categories", "menu:search"),
        InlineKeyboardButton::callback("\u{1F3E0} Main menu", "menu:main"),
    ]);

    (text, InlineKeyboardMarkup::new(rows))
}

pub fn stock_detail(
    symbol: &str,
    snapshot: &SnapshotRow,
    prediction: Option<&PredictionRow>,
    news: &[NewsRow],
) -> (String, InlineKeyboardMarkup) {
    let mut text = format!("\u{1F4CA} *{}*\n\n", symbol);

    let change = snapshot.change_pct.unwrap_or(0.0);
    let change_dot = if change > 0.0 { "\u{1F7E2}" } else { "\u{1F534}" };
    text.push_str(&format!("\u{1F4B5} *Price*: ${:.2}\n", snapshot.price));
    text.push_str(&format!("{} *Change*: {:+.2}%\n\n", change_dot, change));

    text.push_str("\u{1F4C8} *Technical Indicators*\n");
    if let Some(rsi) = snapshot.rsi {
        let zone = if rsi < 30.0 {
            "\u{1F7E2} Oversold"
        } else if rsi > 70.0 {
            "\u{1F534} Overbought"
        } else {
            "\u{26AA} Neutral"
        };
        text.push_str(&format!("\u{2022} RSI (14): {:.1} {}\n", rsi, zone));
    }
    if let (Some(macd), Some(signal)) = (snapshot.macd, snapshot.macd_signal) {
        let bias = if macd > signal {
            "\u{1F7E2} Bullish"
        } else {
            "\u{1F534} Bearish"
        };
        text.push_str(&format!("\u{2022} MACD: {}\n", bias));
    }
    if let (Some(ema_20), Some(ema_50)) = (snapshot.ema_20, snapshot.ema_50) {
        let trend = if snapshot.price > ema_20 && ema_20 > ema_50 {
            "\u{1F7E2} Uptrend"
        } else {
            "\u{1F534} Downtrend"
        };
        text.push_str(&format!("\u{2022} Trend: {}\n", trend));
    }
    if let Some(upside) = snapshot.upside_pct {
        text.push_str(&format!("\u{2022} Upside potential: {:+.1}%\n", upside));
    }
    text.push('\n');

    if let Some(pred) = prediction {
        text.push_str(&format!(
            "\u{1F916} *Analysis*\n\
             \u{2022} Score: {:.0}/100 {}\n\
             \u{2022} Recommendation: *{}*\n\n",
            pred.overall_score,
            score_emoji(pred.overall_score),
            pred.recommendation
        ));
    }

    if let Some(sentiment) = snapshot.sentiment_score {
        text.push_str(&format!(
            "{} *Sentiment*: {:.2}\n\n",
            sentiment_glyph(sentiment),
            sentiment
        ));
    }

    if !news.is_empty() {
        text.push_str("\u{1F4F0} *Latest News*\n");
        for (i, article) in news.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} {}\n",
                i + 1,
                news_dot(article.sentiment_score),
                truncate(&article.title, 60)
            ));
        }
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("\u{1F4F0} All news", format!("news:{}", symbol)),
            InlineKeyboardButton::callback("\u{2B50} Watch", format!("watch:{}", symbol)),
        ],
        vec![
            InlineKeyboardButton::callback("\u{1F519} Browse", "menu:search"),
            InlineKeyboardButton::callback("\u{1F3E0} Main menu", "menu:main"),
        ],
    ]);

    (text, keyboard)
}

pub fn news_menu() -> (String, InlineKeyboardMarkup) {
    let text = "\u{1F4F0} *News*\n\nPick a slice:".to_string();
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("\u{1F525} Everything", "newsfilter:all")],
        vec![
            InlineKeyboardButton::callback("\u{1F60A} Positive", "newsfilter:positive"),
            InlineKeyboardButton::callback("\u{1F61F} Negative", "newsfilter:negative"),
        ],
        back_row(),
    ]);
    (text, keyboard)
}

pub fn news_list(title: &str, rows: &[NewsRow]) -> (String, InlineKeyboardMarkup) {
    let text = if rows.is_empty() {
        "\u{1F4ED} No news right now".to_string()
    } else {
        let mut text = format!("\u{1F4F0} *{}*\n\n", title);
        for (i, article) in rows.iter().enumerate() {
            text.push_str(&format!(
                "{}. *{}* {}\n   {}\n\n",
                i + 1,
                article.symbol,
                news_dot(article.sentiment_score),
                truncate(&article.title, 70)
            ));
        }
        text
    };

    (
        text,
        InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("\u{1F519} News menu", "menu:news")],
            back_row(),
        ]),
    )
}

pub fn symbol_news(symbol: &str, rows: &[NewsRow]) -> (String, InlineKeyboardMarkup) {
    let text = if rows.is_empty() {
        format!("\u{1F4ED} No news for {}", symbol)
    } else {
        let mut text = format!("\u{1F4F0} *{} news* (latest {})\n\n", symbol, rows.len());
        for (i, article) in rows.iter().enumerate() {
            let source = article.source.as_deref().unwrap_or("Unknown");
            text.push_str(&format!(
                "{}. {} *[{}]*\n   {}\n",
                i + 1,
                news_dot(article.sentiment_score),
                source,
                truncate(&article.title, 80)
            ));
            if let Some(url) = &article.url {
                text.push_str(&format!("   \u{1F517} [Read more]({})\n", url));
            }
            text.push('\n');
        }
        text
    };

    (
        text,
        InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("\u{1F519} Back", format!("stock:{}", symbol)),
            InlineKeyboardButton::callback("\u{1F3E0} Main menu", "menu:main"),
        ]]),
    )
}

pub fn predictions_menu() -> (String, InlineKeyboardMarkup) {
    let text = "\u{1F916} *Predictions*\n\n\
        Filter by recommendation:\n\n\
        \u{1F680} *Strong Buy* - highest conviction\n\
        \u{2705} *Buy* - favorable\n\
        \u{23F8}\u{FE0F} *Hold* - wait and see\n\
        \u{2B07}\u{FE0F} *Sell* - unfavorable\n\
        \u{1F534} *Strong Sell* - exit"
        .to_string();

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("\u{1F680} Strong Buy", "filter:Strong Buy"),
            InlineKeyboardButton::callback("\u{2705} Buy", "filter:Buy"),
        ],
        vec![
            InlineKeyboardButton::callback("\u{23F8}\u{FE0F} Hold", "filter:Hold"),
            InlineKeyboardButton::callback("\u{2B07}\u{FE0F} Sell", "filter:Sell"),
        ],
        vec![InlineKeyboardButton::callback("\u{1F534} Strong Sell", "filter:Strong Sell")],
        vec![InlineKeyboardButton::callback("\u{1F4CA} All", "filter:All")],
        back_row(),
    ]);

    (text, keyboard)
}

pub fn predictions_list(filter: &str, rows: &[PredictionRow]) -> (String, InlineKeyboardMarkup) {
    let text = if rows.is_empty() {
        format!("\u{1F4ED} Nothing rated '{}' right now", filter)
    } else {
        let mut text = format!("\u{1F916} *{} Recommendations*\n\n", filter);
        for (i, pred) in rows.iter().enumerate() {
            text.push_str(&format!(
                "{}. *{}* - {:.0}/100 {}\n   {}\n\n",
                i + 1,
                pred.symbol,
                pred.overall_score,
                score_emoji(pred.overall_score),
                pred.recommendation
            ));
        }
        text
    };

    (
        text,
        InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("\u{1F519} Filters", "menu:predictions")],
            back_row(),
        ]),
    )
}

pub fn watchlist_screen(symbols: &[String]) -> (String, InlineKeyboardMarkup) {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    let text = if symbols.is_empty() {
        "\u{1F4CB} Your watchlist is empty.\n\nOpen a stock and tap \u{2B50} Watch to add it."
            .to_string()
    } else {
        for chunk in symbols.chunks(3) {
            rows.push(
                chunk
                    .iter()
                    .map(|s| InlineKeyboardButton::callback(s.clone(), format!("stock:{}", s)))
                    .collect(),
            );
        }
        format!(
            "\u{1F4CB} *Your Watchlist* ({})\n\nTap a symbol for details.",
            symbols.len()
        )
    };

    rows.push(back_row());
    (text, InlineKeyboardMarkup::new(rows))
}

pub fn settings_screen(settings: &UserSettingsRow) -> (String, InlineKeyboardMarkup) {
    let mark = |enabled: i64| if enabled != 0 { "\u{2705}" } else { "\u{2B1C}" };

    let text = "\u{2699}\u{FE0F} *Notification Settings*\n\n\
        \u{1F4CA} *RSI alerts* - oversold/overbought on your watchlist\n\
        \u{1F916} *Score alerts* - when a stock scores 75+\n\
        \u{1F4F0} *News alerts* - strong-sentiment headlines\n\
        \u{23F0} *Daily summary* - the 09:00 digest\n\n\
        Tap to toggle:"
        .to_string();

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                format!("{} RSI alerts", mark(settings.enable_rsi_alerts)),
                "toggle:rsi",
            ),
            InlineKeyboardButton::callback(
                format!("{} Score alerts", mark(settings.enable_ai_alerts)),
                "toggle:ai",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("{} News alerts", mark(settings.enable_news_alerts)),
                "toggle:news",
            ),
            InlineKeyboardButton::callback(
                format!("{} Daily summary", mark(settings.enable_daily_summary)),
                "toggle:summary",
            ),
        ],
        back_row(),
    ]);

    (text, keyboard)
}

pub fn help_screen() -> (String, InlineKeyboardMarkup) {
    let text = "\u{2139}\u{FE0F} *How to read StockPulse*\n\n\
        *Score bands:*\n\
        \u{2022} 80-100: Strong Buy \u{1F31F}\n\
        \u{2022} 65-79: Buy \u{2705}\n\
        \u{2022} 45-64: Hold \u{1F610}\n\
        \u{2022} 30-44: Sell \u{26A0}\u{FE0F}\n\
        \u{2022} 0-29: Strong Sell \u{274C}\n\n\
        *Indicators:*\n\
        \u{2022} RSI: momentum strength (30/70 bands)\n\
        \u{2022} MACD: trend shifts\n\
        \u{2022} EMA: average price trend\n\n\
        *Tips:*\n\
        \u{2022} Score >= 70 is worth a look\n\
        \u{2022} Sentiment > 0.3 means good press\n\
        \u{2022} Upside > 10% means room to run\n\n\
        *Commands:*\n\
        /start - main menu\n\
        /recommended - today's picks"
        .to_string();

    (text, InlineKeyboardMarkup::new(vec![back_row()]))
}

/// Inline reply for /recommended, no menu chrome.
pub fn recommended_inline(picks: &[PredictionRow], updated: &str) -> String {
    if picks.is_empty() {
        return "\u{1F4ED} No picks today (score >= 70)".to_string();
    }

    let mut text = "\u{2B50} *Today's Picks*\n\n".to_string();
    for pred in picks {
        text.push_str(&format!(
            "{} *{}* - {:.0}/100 ({})\n",
            score_emoji(pred.overall_score),
            pred.symbol,
            pred.overall_score,
            pred.recommendation
        ));
    }
    text.push_str(&format!("\n_Updated: {}_", updated));
    text
}
