// ABOUTME: Workout text pipeline facade: validate, check quota, normalize units, parse
// ABOUTME: Exposes the operations callers use and the full process flow with usage accounting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workout Pipeline
//!
//! Each invocation runs strictly in sequence:
//!
//! 1. [`WorkoutValidator`] rejects text that is not about a workout
//! 2. [`UsageLimiter`] rejects users over today's quota
//! 3. [`TextNormalizer`] rewrites quantities into pounds, meters and seconds
//! 4. [`WorkoutParser`] produces the typed [`ParsedWorkout`]
//!
//! Usage is counted only after a successful parse.
//!
//! ## Example
//!
//! ```rust,no_run
//! use liftscribe::config::AppConfig;
//! use liftscribe::pipeline::{PipelineOutcome, WorkoutPipeline};
//! use liftscribe::usage_limiter::UsageLimiter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), liftscribe::errors::AppError> {
//!     let config = AppConfig::from_env()?;
//!     let limiter = UsageLimiter::in_memory(config.usage);
//!     let pipeline = WorkoutPipeline::from_config(&config, limiter)?;
//!     match pipeline.process_workout_text("user-1", "3x10 pushups").await? {
//!         PipelineOutcome::Parsed(workout) => println!("{} sets", workout.total_sets()),
//!         PipelineOutcome::Rejected(reason) => println!("rejected: {reason}"),
//!     }
//!     Ok(())
//! }
//! ```

/// Lenient JSON value coercion
pub mod coercion;
/// Fixed sample workout for demo mode
pub mod demo;
/// Unit normalization via tool calls
pub mod normalizer;
/// JSON workout extraction
pub mod parser;
/// Workout/non-workout classification
pub mod validator;

pub use normalizer::TextNormalizer;
pub use parser::{canonical_exercise_name, WorkoutParser};
pub use validator::WorkoutValidator;

use std::fmt;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::LlmClient;
use crate::logging::PipelineLogger;
use crate::models::{ParsedWorkout, UsageStatus};
use crate::usage_limiter::UsageLimiter;

/// Why a text was not turned into a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The validator judged the text unrelated to exercise
    NotWorkout,
    /// The user reached today's limit
    QuotaExceeded(UsageStatus),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotWorkout => write!(f, "text does not describe a workout"),
            Self::QuotaExceeded(status) => write!(
                f,
                "daily limit reached ({}/{})",
                status.current_count, status.limit
            ),
        }
    }
}

/// Result of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The text was parsed and usage was recorded
    Parsed(ParsedWorkout),
    /// The text was rejected before any parsing
    Rejected(RejectionReason),
}

/// The workout text pipeline
#[derive(Debug, Clone)]
pub struct WorkoutPipeline {
    validator: WorkoutValidator,
    normalizer: TextNormalizer,
    parser: WorkoutParser,
    limiter: UsageLimiter,
    demo_mode: bool,
}

impl WorkoutPipeline {
    /// Create a pipeline over one model client and a usage limiter
    #[must_use]
    pub fn new(client: LlmClient, limiter: UsageLimiter) -> Self {
        Self {
            validator: WorkoutValidator::new(client.clone()),
            normalizer: TextNormalizer::new(client.clone()),
            parser: WorkoutParser::new(client),
            limiter,
            demo_mode: false,
        }
    }

    /// Create a pipeline from application configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured provider cannot be constructed.
    pub fn from_config(config: &AppConfig, limiter: UsageLimiter) -> AppResult<Self> {
        let client = LlmClient::from_settings(config.llm.as_ref())?;
        Ok(Self::new(client, limiter).with_demo_mode(config.demo_mode))
    }

    /// Replace parsing with the fixed sample workout
    #[must_use]
    pub const fn with_demo_mode(mut self, enabled: bool) -> Self {
        self.demo_mode = enabled;
        self
    }

    /// The usage limiter shared by this pipeline
    #[must_use]
    pub const fn usage_limiter(&self) -> &UsageLimiter {
        &self.limiter
    }

    /// Whether `text` describes a workout
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank text, a provider error if the call
    /// fails, or `ParsingFailed` for an unexpected verdict.
    pub async fn validate_workout_text(&self, text: &str) -> AppResult<bool> {
        let text = require_text(text)?;
        timed("validate", self.validator.is_workout_related(text)).await
    }

    /// Today's usage status for a user
    ///
    /// # Errors
    ///
    /// Returns a database error if the usage store fails.
    pub async fn check_usage_limit(&self, user_id: &str) -> AppResult<UsageStatus> {
        self.limiter.check_usage_limit(user_id).await
    }

    /// Rewrite quantities in `text` into canonical units
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank text or a provider error if the first
    /// model call fails.
    pub async fn normalize_workout_text(&self, text: &str) -> AppResult<String> {
        let text = require_text(text)?;
        timed("normalize", self.normalizer.normalize(text)).await
    }

    /// Normalize and parse `text` into a workout
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank text, a provider error if a model call
    /// fails, or `ParsingFailed` if the model output cannot be decoded.
    #[instrument(skip_all, fields(text_len = text.len(), demo = self.demo_mode))]
    pub async fn parse_workout_text(&self, text: &str) -> AppResult<ParsedWorkout> {
        let text = require_text(text)?;
        if self.demo_mode {
            warn!("Demo mode enabled: returning sample workout instead of parsing");
            return Ok(demo::sample_workout());
        }
        let normalized = timed("normalize", self.normalizer.normalize(text)).await?;
        timed("parse", self.parser.parse(&normalized)).await
    }

    /// Run validation, quota check, normalization and parsing for a user
    ///
    /// Usage is incremented only when a workout is returned. In demo mode the
    /// model-backed validation is skipped and the sample workout is returned,
    /// still subject to the daily limit.
    ///
    /// # Errors
    ///
    /// Propagates any error from the individual stages.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn process_workout_text(
        &self,
        user_id: &str,
        text: &str,
    ) -> AppResult<PipelineOutcome> {
        let text = require_text(text)?;

        if self.demo_mode {
            warn!("Demo mode enabled: skipping workout validation");
        } else if !self.validate_workout_text(text).await? {
            info!("Rejected text that is not about a workout");
            return Ok(PipelineOutcome::Rejected(RejectionReason::NotWorkout));
        }

        let status = self.check_usage_limit(user_id).await?;
        if status.limit_exceeded {
            info!(count = status.current_count, limit = status.limit, "Daily limit reached");
            return Ok(PipelineOutcome::Rejected(RejectionReason::QuotaExceeded(
                status,
            )));
        }

        let workout = self.parse_workout_text(text).await?;
        self.limiter.increment_usage(user_id).await?;
        Ok(PipelineOutcome::Parsed(workout))
    }
}

fn require_text(text: &str) -> AppResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("workout text must not be empty"));
    }
    Ok(trimmed)
}

async fn timed<T>(
    stage: &str,
    future: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    let started = Instant::now();
    let result = future.await;
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    PipelineLogger::log_stage(stage, result.is_ok(), elapsed);
    result
}
