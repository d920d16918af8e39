use anyhow::Result;
use pulse_core::IndicatorSnapshot;

use crate::models::SnapshotRow;
use crate::{fmt_ts, PulseDb};

impl PulseDb {
    /// Insert-only: one row per collector pass.
    pub async fn insert_snapshot(&self, snap: &IndicatorSnapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO stock_snapshots
                 (symbol, price, change_pct, rsi, macd, macd_signal,
                  ema_20, ema_50, ema_200, bb_upper, bb_lower,
                  upside_pct, analyst_buy_pct, sentiment_score, source, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&snap.symbol)
        .bind(snap.price)
        .bind(snap.change_pct)
        .bind(snap.rsi)
        .bind(snap.macd)
        .bind(snap.macd_signal)
        .bind(snap.ema_20)
        .bind(snap.ema_50)
        .bind(snap.ema_200)
        .bind(snap.bb_upper)
        .bind(snap.bb_lower)
        .bind(snap.upside_pct)
        .bind(snap.analyst_buy_pct)
        .bind(snap.sentiment_score)
        .bind(snap.source.as_str())
        .bind(fmt_ts(snap.recorded_at))
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn latest_snapshot(&self, symbol: &str) -> Result<Option<SnapshotRow>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT id, symbol, price, change_pct, rsi, macd, macd_signal,
                    ema_20, ema_50, ema_200, bb_upper, bb_lower,
                    upside_pct, analyst_buy_pct, sentiment_score, source, recorded_at
             FROM stock_snapshots WHERE symbol = ?
             ORDER BY id DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Latest snapshot per symbol across the whole universe.
    pub async fn latest_snapshots(&self, limit: i64) -> Result<Vec<SnapshotRow>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT id, symbol, price, change_pct, rsi, macd, macd_signal,
                    ema_20, ema_50, ema_200, bb_upper, bb_lower,
                    upside_pct, analyst_buy_pct, sentiment_score, source, recorded_at
             FROM stock_snapshots
             WHERE id IN (SELECT MAX(id) FROM stock_snapshots GROUP BY symbol)
             ORDER BY recorded_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn top_gainers(&self, limit: i64) -> Result<Vec<SnapshotRow>> {
        self.movers(limit, true).await
    }

    pub async fn top_losers(&self, limit: i64) -> Result<Vec<SnapshotRow>> {
        self.movers(limit, false).await
    }

    async fn movers(&self, limit: i64, descending: bool) -> Result<Vec<SnapshotRow>> {
        let order = if descending { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT id, symbol, price, change_pct, rsi, macd, macd_signal,
                    ema_20, ema_50, ema_200, bb_upper, bb_lower,
                    upside_pct, analyst_buy_pct, sentiment_score, source, recorded_at
             FROM stock_snapshots
             WHERE id IN (SELECT MAX(id) FROM stock_snapshots GROUP BY symbol)
               AND change_pct IS NOT NULL
             ORDER BY change_pct {} LIMIT ?",
            order
        );

        let rows = sqlx::query_as::<_, SnapshotRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Latest snapshots that carry an RSI reading, for the RSI alert job.
    pub async fn latest_snapshots_with_rsi(&self) -> Result<Vec<SnapshotRow>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT id, symbol, price, change_pct, rsi, macd, macd_signal,
                    ema_20, ema_50, ema_200, bb_upper, bb_lower,
                    upside_pct, analyst_buy_pct, sentiment_score, source, recorded_at
             FROM stock_snapshots
             WHERE id IN (SELECT MAX(id) FROM stock_snapshots GROUP BY symbol)
               AND rsi IS NOT NULL",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Share of symbols whose latest change is positive, 0-100.
    pub async fn market_breadth_pct(&self) -> Result<Option<f64>> {
        let (up, total): (i64, i64) = sqlx::query_as(
            "SELECT
                 COALESCE(SUM(CASE WHEN change_pct > 0 THEN 1 ELSE 0 END), 0),
                 COUNT(*)
             FROM stock_snapshots
             WHERE id IN (SELECT MAX(id) FROM stock_snapshots GROUP BY symbol)
               AND change_pct IS NOT NULL",
        )
        .fetch_one(self.pool())
        .await?;

        if total == 0 {
            return Ok(None);
        }
        Ok(Some(up as f64 / total as f64 * 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::DataSource;

    fn snap(symbol: &str, price: f64, change: f64) -> IndicatorSnapshot {
        let mut s = IndicatorSnapshot::degraded(symbol, price, change, DataSource::Yahoo);
        s.recorded_at = Utc::now();
        s
    }

    #[tokio::test]
    async fn test_latest_snapshot_per_symbol() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.insert_snapshot(&snap("AAPL", 100.0, 1.0)).await.unwrap();
        db.insert_snapshot(&snap("AAPL", 105.0, 5.0)).await.unwrap();
        db.insert_snapshot(&snap("MSFT", 400.0, -2.0)).await.unwrap();

        let latest = db.latest_snapshot("AAPL").await.unwrap().unwrap();
        assert_eq!(latest.price, 105.0);

        let all = db.latest_snapshots(10).await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(db.latest_snapshot("TSLA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_movers_ordering() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.insert_snapshot(&snap("UP", 10.0, 7.5)).await.unwrap();
        db.insert_snapshot(&snap("FLAT", 10.0, 0.1)).await.unwrap();
        db.insert_snapshot(&snap("DOWN", 10.0, -6.0)).await.unwrap();

        let gainers = db.top_gainers(2).await.unwrap();
        assert_eq!(gainers[0].symbol, "UP");

        let losers = db.top_losers(2).await.unwrap();
        assert_eq!(losers[0].symbol, "DOWN");
    }

    #[tokio::test]
    async fn test_market_breadth() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();
        assert_eq!(db.market_breadth_pct().await.unwrap(), None);

        db.insert_snapshot(&snap("A", 1.0, 2.0)).await.unwrap();
        db.insert_snapshot(&snap("B", 1.0, 1.0)).await.unwrap();
        db.insert_snapshot(&snap("C", 1.0, -1.0)).await.unwrap();
        db.insert_snapshot(&snap("D", 1.0, -2.0)).await.unwrap();

        let breadth = db.market_breadth_pct().await.unwrap().unwrap();
        assert!((breadth - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rsi_filter() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        let mut with_rsi = snap("AAPL", 100.0, 1.0);
        with_rsi.rsi = Some(25.0);
        db.insert_snapshot(&with_rsi).await.unwrap();
        db.insert_snapshot(&snap("MSFT", 400.0, 1.0)).await.unwrap();

        let rows = db.latest_snapshots_with_rsi().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "AAPL");
    }
}
