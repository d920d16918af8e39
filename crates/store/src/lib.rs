mod alerts;
mod master;
mod models;
mod news;
mod predictions;
mod snapshots;

pub use alerts::SettingToggle;
pub use models::*;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Timestamps are stored as sortable text in this format
const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

#[derive(Clone)]
pub struct PulseDb {
    pool: SqlitePool,
}

impl PulseDb {
    /// Open (creating if missing) and apply the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    /// Apply schema.sql statement-by-statement (sqlx executes one at a time)
    async fn init_schema(&self) -> Result<()> {
        let schema = include_str!("../../../schema.sql");

        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        // WAL lets the collector and scheduler write concurrently
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_db_creation() {
        let db = PulseDb::new("sqlite::memory:").await.unwrap();
        assert!(db.pool().acquire().await.is_ok());
    }

    #[test]
    fn test_ts_format_sorts_lexicographically() {
        let earlier = fmt_ts("2026-01-05T08:00:00Z".parse().unwrap());
        let later = fmt_ts("2026-01-05T09:30:00Z".parse().unwrap());
        assert!(earlier < later);
    }
}
