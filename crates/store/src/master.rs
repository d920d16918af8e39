use anyhow::Result;
use pulse_core::{StockCategory, StockEntry};

use crate::models::StockMasterRow;
use crate::PulseDb;

impl PulseDb {
    /// Symbols the collector should process.
    pub async fn active_symbols(&self) -> Result<Vec<StockEntry>> {
        let rows = sqlx::query_as::<_, StockMasterRow>(
            "SELECT id, symbol, name, category, market_cap, is_active
             FROM stock_master WHERE is_active = 1 ORDER BY symbol",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StockEntry {
                symbol: r.symbol,
                name: r.name,
                category: StockCategory::parse(&r.category),
                market_cap: r.market_cap,
            })
            .collect())
    }

    pub async fn symbols_in_category(&self, category: StockCategory) -> Result<Vec<StockMasterRow>> {
        let rows = sqlx::query_as::<_, StockMasterRow>(
            "SELECT id, symbol, name, category, market_cap, is_active
             FROM stock_master WHERE category = ? AND is_active = 1 ORDER BY symbol",
        )
        .bind(category.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Register (or reactivate) a tracked symbol.
    pub async fn upsert_symbol(
        &self,
        symbol: &str,
        name: Option<&str>,
        category: StockCategory,
        market_cap: Option<f64>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO stock_master (symbol, name, category, market_cap, is_active)
             VALUES (?, ?, ?, ?, 1)
             ON CONFLICT(symbol) DO UPDATE SET
                 name = excluded.name,
                 category = excluded.category,
                 market_cap = excluded.market_cap,
                 is_active = 1",
        )
        .bind(symbol)
        .bind(name)
        .bind(category.as_str())
        .bind(market_cap)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn deactivate_symbol(&self, symbol: &str) -> Result<()> {
        sqlx::query("UPDATE stock_master SET is_active = 0 WHERE symbol = ?")
            .bind(symbol)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_active_symbols_round_trip() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.upsert_symbol("AAPL", Some("Apple Inc."), StockCategory::Core, Some(3e12))
            .await
            .unwrap();
        db.upsert_symbol("PLTR", None, StockCategory::Growth, Some(50e9))
            .await
            .unwrap();
        db.upsert_symbol("VOO", None, StockCategory::Etf, None)
            .await
            .unwrap();
        db.deactivate_symbol("VOO").await.unwrap();

        let active = db.active_symbols().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].symbol, "AAPL");
        assert_eq!(active[0].category, StockCategory::Core);

        let growth = db.symbols_in_category(StockCategory::Growth).await.unwrap();
        assert_eq!(growth.len(), 1);
        assert_eq!(growth[0].symbol, "PLTR");
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();

        db.upsert_symbol("AAPL", None, StockCategory::Core, None)
            .await
            .unwrap();
        db.upsert_symbol("AAPL", Some("Apple Inc."), StockCategory::Value, Some(3e12))
            .await
            .unwrap();

        let active = db.active_symbols().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, StockCategory::Value);
        assert_eq!(active[0].name.as_deref(), Some("Apple Inc."));
    }
}
