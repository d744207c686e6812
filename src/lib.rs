// ABOUTME: Main library entry point for the LiftScribe workout text pipeline
// ABOUTME: Turns free-form workout descriptions into structured, unit-normalized records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # LiftScribe
//!
//! A natural-language workout pipeline. A user types something like
//! "bench 3x8 at 60kg, then ran 5km in 25:00" and gets back a typed workout
//! with weights in pounds, distances in meters and durations in seconds.
//!
//! ## Features
//!
//! - **Multi-provider support**: OpenAI-compatible, Anthropic, Gemini or a custom HTTP endpoint
//! - **Unit normalization**: Conversions are computed locally through model tool calls
//! - **Lenient parsing**: Model JSON is coerced, de-duplicated and canonicalized
//! - **Daily quotas**: Per-user counters with atomic increments
//! - **Persistence**: `SQLite` storage for usage and parsed workouts
//!
//! ## Architecture
//!
//! - **LLM**: Provider abstraction and the chat types shared by all stages
//! - **Pipeline**: Validator, normalizer and parser plus the facade tying them together
//! - **Usage limiter**: Quota checks over a pluggable counter store
//! - **Database**: `SQLite` implementation of that store and workout storage
//! - **Config**: Environment-driven configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use liftscribe::config::AppConfig;
//! use liftscribe::database::Database;
//! use liftscribe::errors::AppResult;
//! use liftscribe::pipeline::WorkoutPipeline;
//! use liftscribe::usage_limiter::UsageLimiter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let database = Database::new(&config.database.url).await?;
//!     let limiter = UsageLimiter::new(Arc::new(database.usage_store()), config.usage);
//!     let pipeline = WorkoutPipeline::from_config(&config, limiter)?;
//!
//!     let workout = pipeline.parse_workout_text("3x10 pushups").await?;
//!     println!("{} exercises", workout.exercises.len());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants and environment variable names
pub mod constants;

/// `SQLite` persistence for usage counters and workouts
pub mod database;

/// Unified error handling
pub mod errors;

/// Language model providers and chat types
pub mod llm;

/// Structured logging configuration
pub mod logging;

/// Workout, set and usage data models
pub mod models;

/// Validation, normalization and parsing of workout text
pub mod pipeline;

/// Pure unit conversions
pub mod units;

/// Per-user daily usage quota
pub mod usage_limiter;

/// Shared HTTP helpers
pub mod utils;
