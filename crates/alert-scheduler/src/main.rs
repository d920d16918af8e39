//! alert-scheduler: periodic alert jobs and the daily market summary.
//!
//! Five jobs on independent timers, all reading what the collector wrote:
//!   - price alerts      every 5 minutes
//!   - RSI alerts        every 30 minutes
//!   - score alerts      every hour
//!   - news alerts       every 15 minutes
//!   - daily summary     once a day at 09:00 local

mod jobs;
mod notifier;
mod templates;

use chrono::{Local, NaiveDate, Timelike};
use notifier::Notifier;
use std::sync::Arc;
use store::PulseDb;
use tokio::time::{interval, Duration};

const PRICE_ALERT_SECS: u64 = 5 * 60;
const RSI_ALERT_SECS: u64 = 30 * 60;
const SCORE_ALERT_SECS: u64 = 60 * 60;
const NEWS_ALERT_SECS: u64 = 15 * 60;
const SUMMARY_CHECK_SECS: u64 = 60;
const SUMMARY_HOUR: u32 = 9;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alert_scheduler=info".into()),
        )
        .init();

    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:stockpulse.db".to_string());
    let db = Arc::new(PulseDb::new(&db_url).await?);
    let notifier = Arc::new(Notifier::from_env());

    tracing::info!("Scheduler started");
    tracing::info!("  - price alerts: every {} min", PRICE_ALERT_SECS / 60);
    tracing::info!("  - RSI alerts: every {} min", RSI_ALERT_SECS / 60);
    tracing::info!("  - score alerts: every {} min", SCORE_ALERT_SECS / 60);
    tracing::info!("  - news alerts: every {} min", NEWS_ALERT_SECS / 60);
    tracing::info!("  - daily summary: {}:00 local", SUMMARY_HOUR);

    let price_task = spawn_job(
        "price_alerts",
        PRICE_ALERT_SECS,
        db.clone(),
        notifier.clone(),
        |db, n| async move { jobs::check_price_alerts(&db, &n).await },
    );
    let rsi_task = spawn_job(
        "rsi_alerts",
        RSI_ALERT_SECS,
        db.clone(),
        notifier.clone(),
        |db, n| async move { jobs::check_rsi_alerts(&db, &n).await },
    );
    let score_task = spawn_job(
        "score_alerts",
        SCORE_ALERT_SECS,
        db.clone(),
        notifier.clone(),
        |db, n| async move { jobs::check_score_alerts(&db, &n).await },
    );
    let news_task = spawn_job(
        "news_alerts",
        NEWS_ALERT_SECS,
        db.clone(),
        notifier.clone(),
        |db, n| async move { jobs::check_news_alerts(&db, &n).await },
    );

    // Daily summary: poll once a minute, fire on the first 09:xx tick.
    // Restart-safety comes from the notification_log dedup inside the job.
    let summary_db = db.clone();
    let summary_notifier = notifier.clone();
    let summary_task = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(SUMMARY_CHECK_SECS));
        let mut last_sent: Option<NaiveDate> = None;

        loop {
            ticker.tick().await;
            let now = Local::now();
            let today = now.date_naive();

            if now.hour() != SUMMARY_HOUR || last_sent == Some(today) {
                continue;
            }

            match jobs::send_daily_summary(&summary_db, &summary_notifier).await {
                Ok(()) => last_sent = Some(today),
                Err(e) => tracing::error!("daily_summary failed: {}", e),
            }
        }
    });

    let _ = tokio::join!(price_task, rsi_task, score_task, news_task, summary_task);
    Ok(())
}

fn spawn_job<F, Fut>(
    name: &'static str,
    period_secs: u64,
    db: Arc<PulseDb>,
    notifier: Arc<Notifier>,
    job: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(Arc<PulseDb>, Arc<Notifier>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(period_secs));
        loop {
            ticker.tick().await;
            tracing::debug!("Running job {}", name);
            if let Err(e) = job(db.clone(), notifier.clone()).await {
                tracing::error!("{} failed: {}", name, e);
            }
        }
    })
}
