use anyhow::Result;
use chrono::{DateTime, Utc};
use pulse_core::NewsArticle;

use crate::models::NewsRow;
use crate::{fmt_ts, PulseDb};

const NEWS_COLUMNS: &str = "id, symbol, title, source, url, sentiment_score, published_at";

impl PulseDb {
    /// Insert a scored article. Re-inserting the same url for a symbol is a
    /// no-op, so collector passes can overlap safely.
    pub async fn insert_article(
        &self,
        symbol: &str,
        article: &NewsArticle,
        sentiment_score: Option<f64>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO stock_news
                 (symbol, title, source, url, sentiment_score, published_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(symbol)
        .bind(&article.title)
        .bind(&article.source)
        .bind(&article.url)
        .bind(sentiment_score)
        .bind(fmt_ts(article.published_at))
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn latest_news(&self, limit: i64) -> Result<Vec<NewsRow>> {
        let sql = format!(
            "SELECT {} FROM stock_news ORDER BY published_at DESC LIMIT ?",
            NEWS_COLUMNS
        );
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    pub async fn news_for_symbol(&self, symbol: &str, limit: i64) -> Result<Vec<NewsRow>> {
        let sql = format!(
            "SELECT {} FROM stock_news WHERE symbol = ? ORDER BY published_at DESC LIMIT ?",
            NEWS_COLUMNS
        );
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(symbol)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Positive (min_sentiment) or negative (max_sentiment) slices for the
    /// bot's news filter menu.
    pub async fn news_by_sentiment(
        &self,
        min_sentiment: Option<f64>,
        max_sentiment: Option<f64>,
        limit: i64,
    ) -> Result<Vec<NewsRow>> {
        let sql = format!(
            "SELECT {} FROM stock_news
             WHERE sentiment_score IS NOT NULL
               AND (? IS NULL OR sentiment_score >= ?)
               AND (? IS NULL OR sentiment_score <= ?)
             ORDER BY published_at DESC LIMIT ?",
            NEWS_COLUMNS
        );
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(min_sentiment)
            .bind(min_sentiment)
            .bind(max_sentiment)
            .bind(max_sentiment)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Articles published since `since` whose |sentiment| clears the
    /// threshold: the news-alert trigger set.
    pub async fn strong_news_since(
        &self,
        since: DateTime<Utc>,
        abs_sentiment_threshold: f64,
    ) -> Result<Vec<NewsRow>> {
        let sql = format!(
            "SELECT {} FROM stock_news
             WHERE published_at >= ?
               AND sentiment_score IS NOT NULL
               AND ABS(sentiment_score) > ?
             ORDER BY published_at DESC",
            NEWS_COLUMNS
        );
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(fmt_ts(since))
            .bind(abs_sentiment_threshold)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }
}
