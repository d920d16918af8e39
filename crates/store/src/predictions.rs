use anyhow::Result;
use chrono::{DateTime, Utc};
use pulse_core::Recommendation;
use scoring::Prediction;

use crate::models::PredictionRow;
use crate::{fmt_ts, PulseDb};

const PREDICTION_COLUMNS: &str = "id, symbol, overall_score, technical_score, fundamental_score, \
     sentiment_score, risk_score, recommendation, price_at_prediction, created_at";

impl PulseDb {
    /// Insert-only: one row per scoring run.
    pub async fn insert_prediction(&self, pred: &Prediction) -> Result<()> {
        sqlx::query(
            "INSERT INTO ai_predictions
                 (symbol, overall_score, technical_score, fundamental_score,
                  sentiment_score, risk_score, recommendation, price_at_prediction, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&pred.symbol)
        .bind(pred.overall_score)
        .bind(pred.technical_score)
        .bind(pred.fundamental_score)
        .bind(pred.sentiment_score)
        .bind(pred.risk_score)
        .bind(pred.recommendation.label())
        .bind(pred.price_at_prediction)
        .bind(fmt_ts(pred.created_at))
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn latest_prediction(&self, symbol: &str) -> Result<Option<PredictionRow>> {
        let sql = format!(
            "SELECT {} FROM ai_predictions WHERE symbol = ? ORDER BY id DESC LIMIT 1",
            PREDICTION_COLUMNS
        );
        let row = sqlx::query_as::<_, PredictionRow>(&sql)
            .bind(symbol)
            .fetch_optional(self.pool())
            .await?;

        Ok(row)
    }

    /// Latest prediction per symbol at or above `min_score`, best first.
    pub async fn top_predictions(&self, min_score: f64, limit: i64) -> Result<Vec<PredictionRow>> {
        let sql = format!(
            "SELECT {} FROM ai_predictions
             WHERE id IN (SELECT MAX(id) FROM ai_predictions GROUP BY symbol)
               AND overall_score >= ?
             ORDER BY overall_score DESC LIMIT ?",
            PREDICTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, PredictionRow>(&sql)
            .bind(min_score)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Latest prediction per symbol filtered to one recommendation level.
    pub async fn predictions_by_recommendation(
        &self,
        recommendation: Recommendation,
        limit: i64,
    ) -> Result<Vec<PredictionRow>> {
        let sql = format!(
            "SELECT {} FROM ai_predictions
             WHERE id IN (SELECT MAX(id) FROM ai_predictions GROUP BY symbol)
               AND recommendation = ?
             ORDER BY overall_score DESC LIMIT ?",
            PREDICTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, PredictionRow>(&sql)
            .bind(recommendation.label())
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// High scores created since `since`: the score-alert trigger set.
    pub async fn high_scores_since(
        &self,
        min_score: f64,
        since: DateTime<Utc>,
    ) -> Result<Vec<PredictionRow>> {
        let sql = format!(
            "SELECT {} FROM ai_predictions
             WHERE overall_score >= ? AND created_at >= ?
             ORDER BY overall_score DESC",
            PREDICTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, PredictionRow>(&sql)
            .bind(min_score)
            .bind(fmt_ts(since))
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pulse_core::Recommendation;

    fn pred(symbol: &str, score: f64) -> Prediction {
        Prediction {
            symbol: symbol.to_string(),
            overall_score: score,
            technical_score: score,
            fundamental_score: score,
            sentiment_score: score,
            risk_score: 0.0,
            recommendation: Recommendation::from_score(score),
            price_at_prediction: 100.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_top_predictions_uses_latest_per_symbol() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        // AAPL scored 90 then dropped to 55: only the newer row may rank
        db.insert_prediction(&pred("AAPL", 90.0)).await.unwrap();
        db.insert_prediction(&pred("AAPL", 55.0)).await.unwrap();
        db.insert_prediction(&pred("NVDA", 82.0)).await.unwrap();

        let top = db.top_predictions(70.0, 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].symbol, "NVDA");

        let latest = db.latest_prediction("AAPL").await.unwrap().unwrap();
        assert_eq!(latest.overall_score, 55.0);
    }

    #[tokio::test]
    async fn test_filter_by_recommendation() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.insert_prediction(&pred("AAPL", 85.0)).await.unwrap(); // Strong Buy
        db.insert_prediction(&pred("MSFT", 70.0)).await.unwrap(); // Buy
        db.insert_prediction(&pred("T", 50.0)).await.unwrap(); // Hold

        let buys = db
            .predictions_by_recommendation(Recommendation::Buy, 10)
            .await
            .unwrap();
        assert_eq!(buys.len(), 1);
        assert_eq!(buys[0].symbol, "MSFT");
    }

    #[tokio::test]
    async fn test_high_scores_since_window() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        let mut old = pred("AAPL", 90.0);
        old.created_at = Utc::now() - Duration::hours(3);
        db.insert_prediction(&old).await.unwrap();
        db.insert_prediction(&pred("NVDA", 88.0)).await.unwrap();

        let recent = db
            .high_scores_since(75.0, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].symbol, "NVDA");
    }
}
