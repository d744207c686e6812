// ABOUTME: Environment configuration for provider, usage limits, database and runtime mode
// ABOUTME: Resolved once at process start and shared read-only afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use chrono::{FixedOffset, Offset, Utc};
use tracing::{info, warn};

use super::types::{Environment, LlmSettings};
use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};

/// Daily usage limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageLimitConfig {
    /// Pipeline calls allowed per user per day
    pub daily_limit: u32,
    /// Offset of the clock that defines "today"
    pub utc_offset: FixedOffset,
}

impl Default for UsageLimitConfig {
    fn default() -> Self {
        Self {
            daily_limit: defaults::DAILY_LIMIT,
            utc_offset: Utc.fix(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::DATABASE_URL.to_owned(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Runtime environment
    pub environment: Environment,
    /// Selected model provider, `None` when no credential is configured
    pub llm: Option<LlmSettings>,
    /// Usage limiter settings
    pub usage: UsageLimitConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Replace model parsing with a fixed sample workout
    pub demo_mode: bool,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any variable holds an invalid value.
    pub fn from_env() -> AppResult<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any variable holds an invalid value.
    pub fn resolve<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let environment = get("ENVIRONMENT")
            .map(|s| Environment::from_str_or_default(&s))
            .unwrap_or_default();

        let llm = LlmSettings::resolve(&lookup)?;

        let daily_limit = match get(env_vars::DAILY_LIMIT) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                AppError::config_invalid(format!(
                    "{} must be a non-negative integer, got '{raw}'",
                    env_vars::DAILY_LIMIT
                ))
            })?,
            None => defaults::DAILY_LIMIT,
        };

        let utc_offset = match get(env_vars::USAGE_UTC_OFFSET_MINUTES) {
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .and_then(|minutes| minutes.checked_mul(60))
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    AppError::config_invalid(format!(
                        "{} must be minutes within +/-24h, got '{raw}'",
                        env_vars::USAGE_UTC_OFFSET_MINUTES
                    ))
                })?,
            None => UsageLimitConfig::default().utc_offset,
        };

        let demo_mode = get(env_vars::DEMO_MODE)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        let database = DatabaseConfig {
            url: get(env_vars::DATABASE_URL).unwrap_or_else(|| defaults::DATABASE_URL.to_owned()),
        };

        let config = Self {
            environment,
            llm,
            usage: UsageLimitConfig {
                daily_limit,
                utc_offset,
            },
            database,
            demo_mode,
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        match &self.llm {
            Some(settings) => info!(
                provider = %settings.provider,
                model = settings.model.as_deref().unwrap_or("default"),
                timeout_secs = settings.request_timeout.as_secs(),
                "LLM provider configured"
            ),
            None => warn!("No LLM provider configured; pipeline calls will fail"),
        }
        if self.demo_mode {
            warn!("{} is enabled: workouts are sample data", env_vars::DEMO_MODE);
        }
        info!(
            environment = %self.environment,
            daily_limit = self.usage.daily_limit,
            usage_utc_offset = %self.usage.utc_offset,
            "Configuration loaded"
        );
    }
}
