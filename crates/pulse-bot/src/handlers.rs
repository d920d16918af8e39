use anyhow::Result;
use pulse_core::{Recommendation, StockCategory};
use store::{PulseDb, SettingToggle};
use telegram_client::InlineKeyboardMarkup;

use crate::format;

/// Everything a callback button can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    MainMenu,
    MarketOverview,
    TopPicks,
    Categories,
    Category(StockCategory),
    Stock(String),
    SymbolNews(String),
    NewsMenu,
    NewsFilter(NewsFilter),
    PredictionsMenu,
    PredictionFilter(Option<Recommendation>),
    Watchlist,
    Watch(String),
    Settings,
    Toggle(SettingToggle),
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewsFilter {
    All,
    Positive,
    Negative,
}

impl Route {
    pub fn parse(data: &str) -> Option<Route> {
        if let Some((prefix, arg)) = data.split_once(':') {
            return match prefix {
                "menu" => match arg {
                    "main" => Some(Route::MainMenu),
                    "market" => Some(Route::MarketOverview),
                    "picks" => Some(Route::TopPicks),
                    "search" => Some(Route::Categories),
                    "news" => Some(Route::NewsMenu),
                    "predictions" => Some(Route::PredictionsMenu),
                    "watchlist" => Some(Route::Watchlist),
                    "settings" => Some(Route::Settings),
                    "help" => Some(Route::Help),
                    _ => None,
                },
                "category" => Some(Route::Category(StockCategory::parse(arg))),
                "stock" => Some(Route::Stock(arg.to_string())),
                "news" => Some(Route::SymbolNews(arg.to_string())),
                "newsfilter" => match arg {
                    "all" => Some(Route::NewsFilter(NewsFilter::All)),
                    "positive" => Some(Route::NewsFilter(NewsFilter::Positive)),
                    "negative" => Some(Route::NewsFilter(NewsFilter::Negative)),
                    _ => None,
                },
                "filter" => match arg {
                    "All" => Some(Route::PredictionFilter(None)),
                    label => Some(Route::PredictionFilter(Some(Recommendation::parse(label)))),
                },
                "watch" => Some(Route::Watch(arg.to_string())),
                "toggle" => match arg {
                    "rsi" => Some(Route::Toggle(SettingToggle::RsiAlerts)),
                    "ai" => Some(Route::Toggle(SettingToggle::AiAlerts)),
                    "news" => Some(Route::Toggle(SettingToggle::NewsAlerts)),
                    "summary" => Some(Route::Toggle(SettingToggle::DailySummary)),
                    _ => None,
                },
                _ => None,
            };
        }
        None
    }
}

/// Build the screen for a route. Mutating routes (Watch, Toggle) apply
/// their side effect first and land on the screen that shows the result.
pub async fn render(
    db: &PulseDb,
    chat_id: i64,
    route: &Route,
) -> Result<(String, InlineKeyboardMarkup)> {
    match route {
        Route::MainMenu => Ok(format::main_menu()),

        Route::MarketOverview => {
            let gainers = db.top_gainers(5).await?;
            let losers = db.top_losers(5).await?;
            let top_scores = db.top_predictions(0.0, 5).await?;
            Ok(format::market_overview(&gainers, &losers, &top_scores))
        }

        Route::TopPicks => {
            let predictions = db.top_predictions(70.0, 10).await?;
            let mut picks = Vec::with_capacity(predictions.len());
            for pred in predictions {
                let snapshot = db.latest_snapshot(&pred.symbol).await?;
                picks.push((pred, snapshot));
            }
            Ok(format::top_picks(&picks))
        }

        Route::Categories => Ok(format::categories_menu()),

        Route::Category(category) => {
            let rows = db.symbols_in_category(*category).await?;
            let symbols: Vec<String> = rows.into_iter().map(|r| r.symbol).collect();
            Ok(format::category_stocks(*category, &symbols))
        }

        Route::Stock(symbol) => match db.latest_snapshot(symbol).await? {
            Some(snapshot) => {
                let prediction = db.latest_prediction(symbol).await?;
                let news = db.news_for_symbol(symbol, 3).await?;
                Ok(format::stock_detail(
                    symbol,
                    &snapshot,
                    prediction.as_ref(),
                    &news,
                ))
            }
            None => Ok((
                format!("\u{274C} No data for {} yet", symbol),
                InlineKeyboardMarkup::new(vec![vec![
                    telegram_client::InlineKeyboardButton::callback(
                        "\u{1F3E0} Main menu",
                        "menu:main",
                    ),
                ]]),
            )),
        },

        Route::SymbolNews(symbol) => {
            let rows = db.news_for_symbol(symbol, 10).await?;
            Ok(format::symbol_news(symbol, &rows))
        }

        Route::NewsMenu => Ok(format::news_menu()),

        Route::NewsFilter(filter) => {
            let (title, rows) = match filter {
                NewsFilter::All => ("Latest News", db.latest_news(15).await?),
                NewsFilter::Positive => (
                    "Positive News",
                    db.news_by_sentiment(Some(0.3), None, 15).await?,
                ),
                NewsFilter::Negative => (
                    "Negative News",
                    db.news_by_sentiment(None, Some(-0.3), 15).await?,
                ),
            };
            Ok(format::news_list(title, &rows))
        }

        Route::PredictionsMenu => Ok(format::predictions_menu()),

        Route::PredictionFilter(filter) => match filter {
            Some(rec) => {
                let rows = db.predictions_by_recommendation(*rec, 15).await?;
                Ok(format::predictions_list(rec.label(), &rows))
            }
            None => {
                let rows = db.top_predictions(0.0, 15).await?;
                Ok(format::predictions_list("All", &rows))
            }
        },

        Route::Watchlist => {
            let symbols = db.watchlist(chat_id).await?;
            Ok(format::watchlist_screen(&symbols))
        }

        Route::Watch(symbol) => {
            db.add_to_watchlist(chat_id, symbol).await?;
            let symbols = db.watchlist(chat_id).await?;
            Ok(format::watchlist_screen(&symbols))
        }

        Route::Settings => {
            let settings = db.get_settings(chat_id).await?;
            Ok(format::settings_screen(&settings))
        }

        Route::Toggle(toggle) => {
            db.toggle_setting(chat_id, *toggle).await?;
            let settings = db.get_settings(chat_id).await?;
            Ok(format::settings_screen(&settings))
        }

        Route::Help => Ok(format::help_screen()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse_menus() {
        assert_eq!(Route::parse("menu:main"), Some(Route::MainMenu));
        assert_eq!(Route::parse("menu:market"), Some(Route::MarketOverview));
        assert_eq!(Route::parse("menu:settings"), Some(Route::Settings));
        assert_eq!(Route::parse("menu:bogus"), None);
    }

    #[test]
    fn test_route_parse_args() {
        assert_eq!(
            Route::parse("stock:AAPL"),
            Some(Route::Stock("AAPL".to_string()))
        );
        assert_eq!(
            Route::parse("category:Growth"),
            Some(Route::Category(StockCategory::Growth))
        );
        assert_eq!(
            Route::parse("filter:Strong Buy"),
            Some(Route::PredictionFilter(Some(Recommendation::StrongBuy)))
        );
        assert_eq!(Route::parse("filter:All"), Some(Route::PredictionFilter(None)));
        assert_eq!(
            Route::parse("toggle:summary"),
            Some(Route::Toggle(SettingToggle::DailySummary))
        );
    }

    #[test]
    fn test_route_parse_garbage() {
        assert_eq!(Route::parse(""), None);
        assert_eq!(Route::parse("no-colon"), None);
        assert_eq!(Route::parse("unknown:thing"), None);
    }

    #[tokio::test]
    async fn test_render_against_empty_db() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        // Every read-only screen renders without data
        for route in [
            Route::MainMenu,
            Route::MarketOverview,
            Route::TopPicks,
            Route::Categories,
            Route::Category(StockCategory::Core),
            Route::Stock("AAPL".to_string()),
            Route::NewsMenu,
            Route::NewsFilter(NewsFilter::All),
            Route::PredictionsMenu,
            Route::PredictionFilter(Some(Recommendation::Buy)),
            Route::Watchlist,
            Route::Settings,
            Route::Help,
        ] {
            let (text, _) = render(&db, 7, &route).await.unwrap();
            assert!(!text.is_empty(), "{:?} rendered empty", route);
        }
    }

    #[tokio::test]
    async fn test_watch_route_adds_symbol() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();
        let (text, _) = render(&db, 7, &Route::Watch("AAPL".to_string()))
            .await
            .unwrap();
        assert!(text.contains("Watchlist"));
        assert_eq!(db.watchlist(7).await.unwrap(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_toggle_route_flips_setting() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();
        render(&db, 7, &Route::Toggle(SettingToggle::AiAlerts))
            .await
            .unwrap();
        assert_eq!(db.get_settings(7).await.unwrap().enable_ai_alerts, 1);
    }
}
