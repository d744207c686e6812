// ABOUTME: LiftScribe CLI - runs the workout text pipeline from the command line
// ABOUTME: Prints JSON results on stdout; logs go to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Is this text about a workout?
//! liftscribe-cli validate "bench 3x8 at 60kg"
//!
//! # Rewrite quantities into pounds, meters and seconds
//! liftscribe-cli normalize "ran 5km in 25:00"
//!
//! # Parse into a structured workout
//! liftscribe-cli parse "3 sets of 10 pushups"
//!
//! # Full flow with quota accounting and storage
//! liftscribe-cli process --user alice "squats 5x5 at 100kg"
//!
//! # Today's usage and stored workouts
//! liftscribe-cli usage --user alice
//! liftscribe-cli workouts --user alice --limit 5
//!
//! # Text can also come from stdin
//! echo "deadlift 3x5 140kg" | liftscribe-cli parse
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use liftscribe::{
    config::AppConfig,
    database::Database,
    logging::LoggingConfig,
    pipeline::{PipelineOutcome, RejectionReason, WorkoutPipeline},
    usage_limiter::UsageLimiter,
};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "liftscribe-cli",
    about = "LiftScribe workout text pipeline",
    long_about = "Validate, normalize and parse free-form workout descriptions into structured JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Return the sample workout instead of calling the model for parsing
    #[arg(long, global = true)]
    demo: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Check whether text describes a workout
    Validate {
        /// Workout text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Rewrite quantities into canonical units
    Normalize {
        /// Workout text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Parse text into a structured workout
    Parse {
        /// Workout text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Validate, check quota, parse, count usage and store the workout
    Process {
        /// User the call is accounted to
        #[arg(long)]
        user: String,

        /// Skip storing the parsed workout
        #[arg(long)]
        no_store: bool,

        /// Workout text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Show today's usage for a user
    Usage {
        /// User to inspect
        #[arg(long)]
        user: String,
    },

    /// List a user's stored workouts, newest first
    Workouts {
        /// User to inspect
        #[arg(long)]
        user: String,

        /// Maximum number of workouts
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Show one stored workout
    Show {
        /// Workout id
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config.demo_mode |= cli.demo;

    match cli.command {
        Command::Validate { text } => {
            let pipeline = offline_pipeline(&config)?;
            let related = pipeline.validate_workout_text(&read_text(text)?).await?;
            print_json(&json!({ "isWorkoutRelated": related }))
        }
        Command::Normalize { text } => {
            let pipeline = offline_pipeline(&config)?;
            let normalized = pipeline.normalize_workout_text(&read_text(text)?).await?;
            print_json(&json!({ "normalizedText": normalized }))
        }
        Command::Parse { text } => {
            let pipeline = offline_pipeline(&config)?;
            let workout = pipeline.parse_workout_text(&read_text(text)?).await?;
            print_json(&workout)
        }
        Command::Process {
            user,
            no_store,
            text,
        } => {
            let text = read_text(text)?;
            let database = open_database(&config).await?;
            let pipeline = stored_pipeline(&config, &database)?;
            info!(user = %user, "Processing workout text");

            match pipeline.process_workout_text(&user, &text).await? {
                PipelineOutcome::Parsed(workout) => {
                    let id = if no_store {
                        None
                    } else {
                        Some(database.create_workout(&user, &workout).await?.id)
                    };
                    print_json(&json!({
                        "status": "parsed",
                        "workoutId": id,
                        "workout": workout,
                    }))
                }
                PipelineOutcome::Rejected(reason) => {
                    let usage = match reason {
                        RejectionReason::QuotaExceeded(status) => Some(status),
                        RejectionReason::NotWorkout => None,
                    };
                    print_json(&json!({
                        "status": "rejected",
                        "reason": reason.to_string(),
                        "usage": usage,
                    }))
                }
            }
        }
        Command::Usage { user } => {
            let database = open_database(&config).await?;
            let pipeline = stored_pipeline(&config, &database)?;
            let status = pipeline.check_usage_limit(&user).await?;
            print_json(&status)
        }
        Command::Workouts { user, limit } => {
            let database = open_database(&config).await?;
            print_json(&database.list_workouts(&user, limit).await?)
        }
        Command::Show { id } => {
            let database = open_database(&config).await?;
            match database.get_workout(id).await? {
                Some(workout) => print_json(&workout),
                None => bail!("workout {id} not found"),
            }
        }
    }
}

/// Pipeline for single-shot commands that never touch stored usage
fn offline_pipeline(config: &AppConfig) -> Result<WorkoutPipeline> {
    let limiter = UsageLimiter::in_memory(config.usage);
    Ok(WorkoutPipeline::from_config(config, limiter)?)
}

fn stored_pipeline(config: &AppConfig, database: &Database) -> Result<WorkoutPipeline> {
    let limiter = UsageLimiter::new(Arc::new(database.usage_store()), config.usage);
    Ok(WorkoutPipeline::from_config(config, limiter)?)
}

async fn open_database(config: &AppConfig) -> Result<Database> {
    info!("Connecting to database: {}", config.database.url);
    Database::new(&config.database.url)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))
}

fn read_text(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read workout text from stdin")?;
    Ok(buffer)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
