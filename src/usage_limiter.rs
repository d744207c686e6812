// ABOUTME: Per-user daily usage quota for pipeline invocations
// ABOUTME: Counters are keyed by (user, day) and incremented atomically by the backing store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Usage Limiter
//!
//! A user may run the pipeline `daily_limit` times per day. The day rolls
//! over at local midnight of the configured clock offset, so a counter that
//! was never written for today reads as zero. Exceeding the quota is a normal
//! state, not an error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::UsageLimitConfig;
use crate::errors::AppResult;
use crate::logging::PipelineLogger;
use crate::models::UsageStatus;

/// Storage for daily usage counters
///
/// `increment_daily_count` must be atomic: two concurrent increments for the
/// same key must both be counted.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Current count for a user on a day; zero when no row exists
    async fn get_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32>;

    /// Increment the count for a user on a day and return the new value
    async fn increment_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32>;
}

/// Process-local usage store backed by a sharded concurrent map
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsageStore {
    counts: Arc<DashMap<(String, NaiveDate), u32>>,
}

impl InMemoryUsageStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn get_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32> {
        Ok(self
            .counts
            .get(&(user_id.to_owned(), day))
            .map_or(0, |entry| *entry.value()))
    }

    async fn increment_daily_count(&self, user_id: &str, day: NaiveDate) -> AppResult<u32> {
        // Entry guard holds the shard lock for the read-modify-write
        let mut entry = self.counts.entry((user_id.to_owned(), day)).or_insert(0);
        *entry = entry.saturating_add(1);
        Ok(*entry)
    }
}

/// Daily quota checker
#[derive(Clone)]
pub struct UsageLimiter {
    store: Arc<dyn UsageStore>,
    config: UsageLimitConfig,
}

impl UsageLimiter {
    /// Create a limiter over a store
    #[must_use]
    pub fn new(store: Arc<dyn UsageStore>, config: UsageLimitConfig) -> Self {
        Self { store, config }
    }

    /// Limiter over a fresh in-memory store
    #[must_use]
    pub fn in_memory(config: UsageLimitConfig) -> Self {
        Self::new(Arc::new(InMemoryUsageStore::new()), config)
    }

    /// Configured daily limit
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.config.daily_limit
    }

    /// Calendar day containing `now` on the configured clock
    #[must_use]
    pub fn day_for(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.config.utc_offset).date_naive()
    }

    /// Today's usage status for a user
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be read.
    pub async fn check_usage_limit(&self, user_id: &str) -> AppResult<UsageStatus> {
        self.check_usage_limit_at(user_id, Utc::now()).await
    }

    /// Usage status for a user on the day containing `now`
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be read.
    #[instrument(skip(self), fields(limit = self.config.daily_limit))]
    pub async fn check_usage_limit_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<UsageStatus> {
        let day = self.day_for(now);
        let count = self.store.get_daily_count(user_id, day).await?;
        let status = UsageStatus::new(count, self.config.daily_limit);
        debug!(%day, count, exceeded = status.limit_exceeded, "Checked daily usage");
        Ok(status)
    }

    /// Record one invocation for today and return the new count
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be written.
    pub async fn increment_usage(&self, user_id: &str) -> AppResult<u32> {
        self.increment_usage_at(user_id, Utc::now()).await
    }

    /// Record one invocation on the day containing `now`
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be written.
    #[instrument(skip(self))]
    pub async fn increment_usage_at(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<u32> {
        let day = self.day_for(now);
        let count = self.store.increment_daily_count(user_id, day).await?;
        PipelineLogger::log_usage(user_id, count, self.config.daily_limit);
        Ok(count)
    }
}

impl fmt::Debug for UsageLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn limiter(limit: u32, offset_minutes: i32) -> UsageLimiter {
        UsageLimiter::in_memory(UsageLimitConfig {
            daily_limit: limit,
            utc_offset: FixedOffset::east_opt(offset_minutes * 60).unwrap(),
        })
    }

    #[test]
    fn test_day_boundary_follows_offset() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(
            limiter(10, 0).day_for(instant),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        // One hour ahead of UTC is already the next day
        assert_eq!(
            limiter(10, 60).day_for(instant),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_user_starts_at_zero() {
        let status = limiter(10, 0).check_usage_limit("nobody").await.unwrap();
        assert_eq!(status.current_count, 0);
        assert!(!status.limit_exceeded);
    }

    #[tokio::test]
    async fn test_zero_limit_is_always_exceeded() {
        let status = limiter(0, 0).check_usage_limit("u").await.unwrap();
        assert!(status.limit_exceeded);
    }
}
