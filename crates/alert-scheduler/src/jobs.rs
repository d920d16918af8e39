use anyhow::Result;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use store::{PulseDb, SettingToggle, SnapshotRow};

use crate::notifier::Notifier;
use crate::templates;

/// Score that makes a prediction alert-worthy
const SCORE_ALERT_THRESHOLD: f64 = 75.0;
/// |sentiment| that makes an article alert-worthy
const NEWS_SENTIMENT_THRESHOLD: f64 = 0.5;

const RSI_DEDUP_HOURS: i64 = 24;
const SCORE_DEDUP_HOURS: i64 = 1;
const NEWS_WINDOW_MINUTES: i64 = 15;

/// Fire active price alerts whose condition crossed against the latest
/// snapshot. Fired alerts are deactivated, one shot each.
pub async fn check_price_alerts(db: &PulseDb, notifier: &Notifier) -> Result<()> {
    let alerts = db.active_price_alerts().await?;

    for alert in alerts {
        let Some(snapshot) = db.latest_snapshot(&alert.symbol).await? else {
            continue;
        };

        let triggered = match alert.condition.as_str() {
            "above" => snapshot.price >= alert.target_price,
            "below" => snapshot.price <= alert.target_price,
            _ => false,
        };
        if !triggered {
            continue;
        }

        let message = templates::price_alert(
            &alert.symbol,
            snapshot.price,
            alert.target_price,
            snapshot.change_pct,
        );

        if notifier.send(alert.chat_id, &message).await {
            db.mark_alert_triggered(alert.id).await?;
            db.log_notification(alert.chat_id, "price_alert", Some(&alert.symbol), &message)
                .await?;
            tracing::info!("Price alert sent to {} for {}", alert.chat_id, alert.symbol);
        }
    }

    Ok(())
}

/// RSI extremes on watchlist symbols, for opted-in chats. Deduped per
/// chat+symbol over a 24 h window.
pub async fn check_rsi_alerts(db: &PulseDb, notifier: &Notifier) -> Result<()> {
    let chats = db.chats_with_toggle(SettingToggle::RsiAlerts).await?;
    if chats.is_empty() {
        return Ok(());
    }

    let snapshots = db.latest_snapshots_with_rsi().await?;
    let by_symbol: HashMap<&str, &SnapshotRow> = snapshots
        .iter()
        .map(|s| (s.symbol.as_str(), s))
        .collect();

    let dedup_cutoff = Utc::now() - Duration::hours(RSI_DEDUP_HOURS);

    for chat_id in chats {
        for symbol in db.watchlist(chat_id).await? {
            let Some(snapshot) = by_symbol.get(symbol.as_str()) else {
                continue;
            };
            let Some(rsi) = snapshot.rsi else { continue };

            if (30.0..=70.0).contains(&rsi) {
                continue;
            }

            if db
                .was_notified_since(chat_id, "rsi_alert", Some(&symbol), dedup_cutoff)
                .await?
            {
                continue;
            }

            let message = templates::rsi_alert(&symbol, rsi, snapshot.price);
            if notifier.send(chat_id, &message).await {
                db.log_notification(chat_id, "rsi_alert", Some(&symbol), &message)
                    .await?;
                tracing::info!("RSI alert sent to {} for {} (rsi {:.1})", chat_id, symbol, rsi);
            }
        }
    }

    Ok(())
}

/// Fresh predictions scoring at or above the threshold, for opted-in chats.
pub async fn check_score_alerts(db: &PulseDb, notifier: &Notifier) -> Result<()> {
    let chats = db.chats_with_toggle(SettingToggle::AiAlerts).await?;
    if chats.is_empty() {
        return Ok(());
    }

    let window_start = Utc::now() - Duration::hours(SCORE_DEDUP_HOURS);
    let predictions = db
        .high_scores_since(SCORE_ALERT_THRESHOLD, window_start)
        .await?;
    if predictions.is_empty() {
        return Ok(());
    }

    for chat_id in chats {
        for pred in &predictions {
            if db
                .was_notified_since(chat_id, "ai_score_alert", Some(&pred.symbol), window_start)
                .await?
            {
                continue;
            }

            let upside = db
                .latest_snapshot(&pred.symbol)
                .await?
                .and_then(|s| s.upside_pct);

            let message = templates::score_alert(pred, upside);
            if notifier.send(chat_id, &message).await {
                db.log_notification(chat_id, "ai_score_alert", Some(&pred.symbol), &message)
                    .await?;
                tracing::info!("Score alert sent to {} for {}", chat_id, pred.symbol);
            }
        }
    }

    Ok(())
}

/// Strongly positive or negative fresh headlines on watchlist symbols.
pub async fn check_news_alerts(db: &PulseDb, notifier: &Notifier) -> Result<()> {
    let chats = db.chats_with_toggle(SettingToggle::NewsAlerts).await?;
    if chats.is_empty() {
        return Ok(());
    }

    let window_start = Utc::now() - Duration::minutes(NEWS_WINDOW_MINUTES);
    let strong_news = db
        .strong_news_since(window_start, NEWS_SENTIMENT_THRESHOLD)
        .await?;
    if strong_news.is_empty() {
        return Ok(());
    }

    for chat_id in chats {
        let watched = db.watchlist(chat_id).await?;
        if watched.is_empty() {
            continue;
        }

        for news in &strong_news {
            if !watched.contains(&news.symbol) {
                continue;
            }

            if db
                .was_notified_since(chat_id, "news_alert", Some(&news.symbol), window_start)
                .await?
            {
                continue;
            }

            let message = templates::news_alert(news);
            if notifier.send(chat_id, &message).await {
                db.log_notification(chat_id, "news_alert", Some(&news.symbol), &message)
                    .await?;
                tracing::info!("News alert sent to {} for {}", chat_id, news.symbol);
            }
        }
    }

    Ok(())
}

/// Morning digest: breadth, movers and top picks for opted-in chats.
pub async fn send_daily_summary(db: &PulseDb, notifier: &Notifier) -> Result<()> {
    let chats = db.chats_with_toggle(SettingToggle::DailySummary).await?;
    if chats.is_empty() {
        return Ok(());
    }

    let breadth = db.market_breadth_pct().await?;
    let gainers = db.top_gainers(3).await?;
    let losers = db.top_losers(3).await?;
    let picks = db.top_predictions(SCORE_ALERT_THRESHOLD, 3).await?;

    let date_label = Utc::now().format("%d %b %Y").to_string();
    let message = templates::daily_summary(&date_label, breadth, &gainers, &losers, &picks);

    // 20 h dedup window: one summary per day, restart-safe
    let dedup_cutoff = Utc::now() - Duration::hours(20);

    let mut sent = 0usize;
    for chat_id in chats {
        if db
            .was_notified_since(chat_id, "daily_summary", None, dedup_cutoff)
            .await?
        {
            continue;
        }
        if notifier.send(chat_id, &message).await {
            db.log_notification(chat_id, "daily_summary", None, &message)
                .await?;
            sent += 1;
        }
    }

    tracing::info!("Daily summary sent to {} chats", sent);
    Ok(())
}
