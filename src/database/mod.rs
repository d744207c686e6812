// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! `SQLite` persistence for daily usage counters and parsed workouts.
//! Tables are created on connect; every statement is idempotent so a file
//! database can be reopened freely.

mod usage;
mod workouts;

pub use usage::SqliteUsageStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

/// Database manager for usage counters and workouts
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) a database and run migrations
    ///
    /// # Errors
    ///
    /// Returns a database error if the URL is invalid, the connection fails,
    /// or a migration statement fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        if !database_url.starts_with("sqlite:") {
            return Err(AppError::config_invalid(format!(
                "Unsupported database URL '{database_url}': only sqlite: URLs are supported"
            )));
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config_invalid(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        // Every connection to :memory: is a separate database, so pin to one
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Usage store sharing this database's pool
    #[must_use]
    pub fn usage_store(&self) -> SqliteUsageStore {
        SqliteUsageStore::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns a database error if any statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_usage().await?;
        self.migrate_workouts().await?;
        debug!("Migrations applied");
        Ok(())
    }

    async fn migrate_usage(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_usage (
                user_id TEXT NOT NULL,
                day TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, day)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create daily_usage table: {e}")))?;

        Ok(())
    }

    async fn migrate_workouts(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT,
                date TEXT NOT NULL,
                duration REAL,
                notes TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workouts table: {e}")))?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_workouts_user_created
            ON workouts (user_id, created_at)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workouts index: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create workout_exercises table: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_sets (
                id TEXT PRIMARY KEY,
                exercise_id TEXT NOT NULL REFERENCES workout_exercises(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                reps INTEGER,
                weight REAL,
                duration REAL,
                distance REAL,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout_sets table: {e}")))?;

        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[cfg(test)]
pub(crate) async fn create_test_db() -> AppResult<Database> {
    Database::new("sqlite::memory:").await
}
