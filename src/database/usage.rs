// ABOUTME: SQLite-backed daily usage counters keyed by (user, day)
// ABOUTME: Increments are a single upsert so concurrent callers never lose a count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Row, Sqlite};

use crate::errors::{AppError, AppResult};
use crate::usage_limiter::UsageStore;

/// Usage store persisting counters in the `daily_usage` table
#[derive(Debug, Clone)]
pub struct SqliteUsageStore {
    pool: Pool<Sqlite>,
}

impl SqliteUsageStore {
    /// Create a store over an already migrated pool
    #[must_use]
    pub const fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn count_from_row(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl UsageStore for SqliteUsageStore {
    async fn get_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32> {
        let row = sqlx::query("SELECT count FROM daily_usage WHERE user_id = $1 AND day = $2")
            .bind(user_id)
            .bind(day.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read daily usage: {e}")))?;

        Ok(row.map_or(0, |r| count_from_row(r.get("count"))))
    }

    async fn increment_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32> {
        let row = sqlx::query(
            r"
            INSERT INTO daily_usage (user_id, day, count)
            VALUES ($1, $2, 1)
            ON CONFLICT(user_id, day) DO UPDATE SET count = count + 1
            RETURNING count
            ",
        )
        .bind(user_id)
        .bind(day.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to increment daily usage: {e}")))?;

        Ok(count_from_row(row.get("count")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_db;

    #[tokio::test]
    async fn test_upsert_counts_per_day() {
        let db = create_test_db().await.unwrap();
        let store = db.usage_store();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        assert_eq!(store.get_daily_count("alice", monday).await.unwrap(), 0);
        assert_eq!(store.increment_daily_count("alice", monday).await.unwrap(), 1);
        assert_eq!(store.increment_daily_count("alice", monday).await.unwrap(), 2);
        assert_eq!(store.get_daily_count("alice", monday).await.unwrap(), 2);
        assert_eq!(store.get_daily_count("alice", tuesday).await.unwrap(), 0);
        assert_eq!(store.get_daily_count("bob", monday).await.unwrap(), 0);
    }
}
