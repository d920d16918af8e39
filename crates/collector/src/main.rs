//! collector: Fetch market data, compute indicators and scores, persist.
//!
//! One pass over the active symbols in stock_master: fetch bars through the
//! primary/fallback waterfall, compute the indicator snapshot, score news
//! sentiment and analyst consensus, then insert one stock_snapshots row and
//! one ai_predictions row per symbol.
//!
//! Usage:
//!   cargo run -p collector -- --symbols AAPL MSFT GOOGL
//!   cargo run -p collector                  # all active symbols from the DB
//!   cargo run -p collector -- --seed       # seed the default universe first
//!   cargo run -p collector -- --dry-run --skip-news

use chrono::Utc;
use market_data::{FetchWaterfall, MarketData, NewsClient, YahooClient};
use pulse_core::{IndicatorSnapshot, StockCategory, StockEntry};
use sentiment::SentimentEngine;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use store::PulseDb;
use technical_indicators::compute_snapshot;
use tokio::sync::Semaphore;

/// Default tracked universe, seeded with --seed
const DEFAULT_UNIVERSE: &[(&str, StockCategory)] = &[
    ("AAPL", StockCategory::Core),
    ("MSFT", StockCategory::Core),
    ("GOOGL", StockCategory::Core),
    ("AMZN", StockCategory::Core),
    ("NVDA", StockCategory::Core),
    ("META", StockCategory::Core),
    ("TSLA", StockCategory::Growth),
    ("AMD", StockCategory::Growth),
    ("PLTR", StockCategory::Growth),
    ("CRWD", StockCategory::Growth),
    ("SHOP", StockCategory::Growth),
    ("NET", StockCategory::Growth),
    ("BRK-B", StockCategory::Value),
    ("JPM", StockCategory::Value),
    ("BAC", StockCategory::Value),
    ("CVX", StockCategory::Value),
    ("JNJ", StockCategory::Dividend),
    ("KO", StockCategory::Dividend),
    ("PG", StockCategory::Dividend),
    ("O", StockCategory::Dividend),
    ("T", StockCategory::Dividend),
    ("VOO", StockCategory::Etf),
    ("QQQ", StockCategory::Etf),
    ("SPY", StockCategory::Etf),
    ("SCHD", StockCategory::Etf),
];

/// Headlines fetched per symbol
const NEWS_LIMIT: usize = 20;
/// Analyst grades considered for the buy ratio
const GRADES_LIMIT: usize = 10;
/// Max concurrent symbol tasks
const DEFAULT_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collector=info,market_data=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let skip_news = args.iter().any(|a| a == "--skip-news");
    let seed = args.iter().any(|a| a == "--seed");

    let concurrency: usize = args
        .iter()
        .position(|a| a == "--concurrency")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CONCURRENCY);

    let db_url = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:stockpulse.db".to_string());

    let db = Arc::new(PulseDb::new(&db_url).await?);

    if seed {
        for (symbol, category) in DEFAULT_UNIVERSE {
            db.upsert_symbol(symbol, None, *category, None).await?;
        }
        tracing::info!("Seeded {} symbols into stock_master", DEFAULT_UNIVERSE.len());
    }

    let symbols: Vec<StockEntry> =
        if let Some(idx) = args.iter().position(|a| a == "--symbols") {
            let requested: Vec<String> = args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .cloned()
                .collect();
            let known = db.active_symbols().await?;
            requested
                .into_iter()
                .map(|symbol| {
                    known
                        .iter()
                        .find(|e| e.symbol == symbol)
                        .cloned()
                        .unwrap_or(StockEntry {
                            symbol,
                            name: None,
                            category: StockCategory::Core,
                            market_cap: None,
                        })
                })
                .collect()
        } else {
            db.active_symbols().await?
        };

    if symbols.is_empty() {
        tracing::warn!("No active symbols in stock_master (try --seed or --symbols)");
        return Ok(());
    }

    let total_symbols = symbols.len();
    tracing::info!(
        "collector: {} symbols, db={}, dry_run={}, concurrency={}",
        total_symbols,
        db_url,
        dry_run,
        concurrency
    );

    let waterfall = Arc::new(FetchWaterfall::from_env());
    let yahoo = Arc::new(YahooClient::new());
    let news_client = Arc::new(NewsClient::new());
    let sentiment_engine = Arc::new(SentimentEngine::new());

    let completed = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let mut handles = Vec::with_capacity(total_symbols);

    for entry in symbols {
        let waterfall = Arc::clone(&waterfall);
        let yahoo = Arc::clone(&yahoo);
        let news_client = Arc::clone(&news_client);
        let sentiment_engine = Arc::clone(&sentiment_engine);
        let db = Arc::clone(&db);
        let completed = Arc::clone(&completed);
        let failed = Arc::clone(&failed);
        let semaphore = Arc::clone(&semaphore);

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let result = process_symbol(
                &waterfall,
                &yahoo,
                &news_client,
                &sentiment_engine,
                &db,
                &entry,
                dry_run,
                skip_news,
            )
            .await;

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;

            match result {
                Ok(score) => {
                    tracing::info!(
                        "[{}/{}] {} => score {:.1}",
                        done,
                        total_symbols,
                        entry.symbol,
                        score
                    );
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("[{}/{}] {} failed: {}", done, total_symbols, entry.symbol, e);
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    let fails = failed.load(Ordering::Relaxed);
    tracing::info!("Done! {} symbols processed ({} failed)", total_symbols, fails);
    Ok(())
}

async fn process_symbol(
    waterfall: &FetchWaterfall,
    yahoo: &YahooClient,
    news_client: &NewsClient,
    sentiment_engine: &SentimentEngine,
    db: &PulseDb,
    entry: &StockEntry,
    dry_run: bool,
    skip_news: bool,
) -> anyhow::Result<f64> {
    let symbol = entry.symbol.as_str();

    let (data, source) = waterfall.fetch(symbol).await?;

    let mut snapshot = match data {
        MarketData::Bars(bars) => {
            let mut snap = compute_snapshot(symbol, &bars)?;
            snap.source = source;
            snap
        }
        MarketData::Quote { price, change_pct } => {
            IndicatorSnapshot::degraded(symbol, price, change_pct, source)
        }
    };
    snapshot.recorded_at = Utc::now();

    // News sentiment and analyst consensus are best-effort enrichment:
    // either can fail without sinking the snapshot.
    if !skip_news {
        let (news_result, grades_result) = tokio::join!(
            news_client.get_news(symbol, NEWS_LIMIT),
            yahoo.recent_grades(symbol, GRADES_LIMIT),
        );

        match news_result {
            Ok(articles) => {
                snapshot.sentiment_score = sentiment_engine.score_news(&articles);
                if !dry_run {
                    for article in &articles {
                        let score = sentiment_engine.score_article(article);
                        if let Err(e) = db.insert_article(symbol, article, score).await {
                            tracing::warn!("news insert failed for {}: {}", symbol, e);
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("news fetch failed for {}: {}", symbol, e),
        }

        match grades_result {
            Ok(grades) => {
                snapshot.analyst_buy_pct = sentiment::analyst_buy_ratio(&grades);
            }
            Err(e) => tracing::warn!("grades fetch failed for {}: {}", symbol, e),
        }
    }

    let prediction = scoring::score_stock(&snapshot, entry.category, entry.market_cap);

    if !dry_run {
        db.insert_snapshot(&snapshot).await?;
        db.insert_prediction(&prediction).await?;
    }

    Ok(prediction.overall_score)
}
