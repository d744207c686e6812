// ABOUTME: Core data models for parsed workouts, exercises, sets and usage status
// ABOUTME: Value objects produced by the pipeline and handed to the persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! All quantities are in canonical units: weight in pounds, duration in
//! seconds (workout-level duration in minutes), distance in meters. Numeric
//! fields are either finite or `None`; absent fields are skipped on
//! serialization while `exercises` and `sets` are always arrays.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workout decoded from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkout {
    /// Optional short label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Workout date; always today at midnight UTC
    pub date: DateTime<Utc>,
    /// Total duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Exercises in mention order
    #[serde(default)]
    pub exercises: Vec<ParsedExercise>,
}

impl ParsedWorkout {
    /// Create an empty workout dated today at midnight UTC
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            date: today_midnight_utc(),
            duration: None,
            notes: None,
            exercises: Vec::new(),
        }
    }

    /// Total number of sets across all exercises
    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

impl Default for ParsedWorkout {
    fn default() -> Self {
        Self::new()
    }
}

/// One exercise within a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExercise {
    /// Canonical exercise name (e.g. "Bench Press", "Pushups")
    pub name: String,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Sets in order; empty when the text had no quantifiable detail
    #[serde(default)]
    pub sets: Vec<ParsedSet>,
}

impl ParsedExercise {
    /// Create an exercise with no sets
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
            sets: Vec::new(),
        }
    }
}

/// One set of an exercise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSet {
    /// Repetition count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Weight in pounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ParsedSet {
    /// A set with only a rep count
    #[must_use]
    pub const fn reps(reps: u32) -> Self {
        Self {
            reps: Some(reps),
            weight: None,
            duration: None,
            distance: None,
            notes: None,
        }
    }

    /// Attach a weight in pounds
    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Result of a daily usage check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatus {
    /// Whether the user has reached today's limit
    pub limit_exceeded: bool,
    /// Calls recorded today
    pub current_count: u32,
    /// Configured daily limit
    pub limit: u32,
}

impl UsageStatus {
    /// Build a status from a count and limit
    #[must_use]
    pub const fn new(current_count: u32, limit: u32) -> Self {
        Self {
            limit_exceeded: current_count >= limit,
            current_count,
            limit,
        }
    }

    /// Calls left today
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.current_count)
    }
}

/// A workout after the persistence layer assigned identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWorkout {
    /// Storage key
    pub id: Uuid,
    /// Owning user
    pub user_id: String,
    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
    /// The stored record
    pub workout: ParsedWorkout,
}

/// Today's date at 00:00:00 UTC
#[must_use]
pub fn today_midnight_utc() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
