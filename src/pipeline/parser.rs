// ABOUTME: Workout parser turning normalized text into a typed ParsedWorkout via one JSON-mode model call
// ABOUTME: Decoding coerces numbers, applies the synonym table, expands set multipliers and merges duplicate exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workout Parser
//!
//! The model does the language work (splitting exercises, expanding `3x10`,
//! grouping mixed sets). Decoding then enforces the data model regardless of
//! how well the model followed instructions:
//!
//! - every numeric field is finite or absent
//! - `sets` is always present
//! - exercise names go through [`canonical_exercise_name`]
//! - entries with the same canonical name are merged in mention order

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

use super::coercion::{coerce_measurement, coerce_number, coerce_reps, coerce_text};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::PARSER_SYSTEM_PROMPT;
use crate::llm::{CallOptions, ChatMessage, LlmClient};
use crate::models::{ParsedExercise, ParsedSet, ParsedWorkout};

/// Upper bound for a `count`/`sets` multiplier on a single set entry
const MAX_SET_MULTIPLIER: u32 = 100;

/// Numeric fields that make a JSON object describe a set
const SET_FIELDS: [&str; 4] = ["reps", "weight", "duration", "distance"];

static CODE_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\s*```\s*$").ok()
});

/// Alias → canonical exercise name; aliases are lowercase with single spaces
const SYNONYMS: &[(&str, &str)] = &[
    ("pushup", "Pushups"),
    ("pushups", "Pushups"),
    ("push up", "Pushups"),
    ("push ups", "Pushups"),
    ("pullup", "Pullups"),
    ("pullups", "Pullups"),
    ("pull up", "Pullups"),
    ("pull ups", "Pullups"),
    ("chin up", "Pullups"),
    ("chin ups", "Pullups"),
    ("chinups", "Pullups"),
    ("situp", "Situps"),
    ("situps", "Situps"),
    ("sit up", "Situps"),
    ("sit ups", "Situps"),
    ("burpee", "Burpees"),
    ("dip", "Dips"),
    ("crunch", "Crunches"),
    ("lunge", "Lunges"),
    ("squat", "Squats"),
    ("squats", "Squats"),
    ("back squat", "Squats"),
    ("back squats", "Squats"),
    ("bench", "Bench Press"),
    ("benchpress", "Bench Press"),
    ("bench press", "Bench Press"),
    ("flat bench", "Bench Press"),
    ("flat bench press", "Bench Press"),
    ("deadlift", "Deadlift"),
    ("deadlifts", "Deadlift"),
    ("deads", "Deadlift"),
    ("ohp", "Overhead Press"),
    ("overhead press", "Overhead Press"),
    ("shoulder press", "Overhead Press"),
    ("military press", "Overhead Press"),
    ("run", "Running"),
    ("ran", "Running"),
    ("jog", "Running"),
    ("jogging", "Running"),
    ("running", "Running"),
    ("row", "Rowing"),
    ("rowing", "Rowing"),
    ("erg", "Rowing"),
    ("bike", "Cycling"),
    ("biked", "Cycling"),
    ("biking", "Cycling"),
    ("cycling", "Cycling"),
];

/// Map an exercise name to its canonical form
///
/// Known aliases resolve through the synonym table. Other names keep their
/// casing unless they are entirely lowercase, in which case they are
/// title-cased.
#[must_use]
pub fn canonical_exercise_name(name: &str) -> String {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let key = cleaned
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some((_, canonical)) = SYNONYMS.iter().find(|(alias, _)| *alias == key) {
        return (*canonical).to_owned();
    }

    if cleaned.chars().any(char::is_uppercase) {
        cleaned
    } else {
        title_case(&cleaned)
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip an optional Markdown code fence around a model payload
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str().trim())
}

/// Decode a model payload into a workout dated today at midnight UTC
///
/// # Errors
///
/// Returns `ParsingFailed` if the payload is not a JSON object.
pub fn decode_workout(raw: &str) -> AppResult<ParsedWorkout> {
    let payload = strip_code_fence(raw);
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        AppError::parsing_failed(format!("model returned invalid JSON: {e}")).with_source(e)
    })?;
    let Value::Object(root) = value else {
        return Err(AppError::parsing_failed("model output is not a JSON object"));
    };

    let mut workout = ParsedWorkout::new();
    workout.name = coerce_text(root.get("name"));
    workout.duration = coerce_measurement(root.get("duration"));
    workout.notes = coerce_text(root.get("notes"));

    let entries: &[Value] = match root.get("exercises") {
        Some(Value::Array(entries)) => entries.as_slice(),
        None | Some(Value::Null) => &[],
        Some(other) => {
            warn!(kind = json_kind(other), "Ignoring non-array exercises field");
            &[]
        }
    };

    let decoded = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| decode_exercise(index, entry));
    workout.exercises = merge_exercises(decoded);

    debug!(
        exercises = workout.exercises.len(),
        sets = workout.total_sets(),
        "Decoded workout"
    );
    Ok(workout)
}

fn decode_exercise(index: usize, entry: &Value) -> Option<ParsedExercise> {
    let Value::Object(obj) = entry else {
        warn!(index, kind = json_kind(entry), "Skipping exercise entry that is not an object");
        return None;
    };
    let Some(name) = coerce_text(obj.get("name")) else {
        warn!(index, "Skipping exercise entry without a name");
        return None;
    };

    let mut exercise = ParsedExercise::new(canonical_exercise_name(&name));
    exercise.notes = coerce_text(obj.get("notes"));
    exercise.sets = decode_sets(obj);
    Some(exercise)
}

fn decode_sets(exercise: &Map<String, Value>) -> Vec<ParsedSet> {
    match exercise.get("sets") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(obj) => Some(expand_set(obj)),
                other => {
                    warn!(kind = json_kind(other), "Skipping set entry that is not an object");
                    None
                }
            })
            .flatten()
            .collect(),
        // Flattened shorthand: {"name": "Pushups", "sets": 3, "reps": 10}
        Some(count @ (Value::Number(_) | Value::String(_))) if has_set_fields(exercise) => {
            let times = coerce_reps(Some(count)).map_or(1, clamp_multiplier);
            vec![decode_set(exercise); times as usize]
        }
        None | Some(Value::Null) if has_set_fields(exercise) => vec![decode_set(exercise)],
        _ => Vec::new(),
    }
}

fn expand_set(obj: &Map<String, Value>) -> Vec<ParsedSet> {
    let set = decode_set(obj);
    let times = obj
        .get("count")
        .or_else(|| obj.get("sets"))
        .and_then(|v| coerce_reps(Some(v)))
        .map_or(1, clamp_multiplier);
    vec![set; times as usize]
}

fn clamp_multiplier(count: u32) -> u32 {
    match count {
        0 => 1,
        n if n > MAX_SET_MULTIPLIER => {
            warn!(count = n, "Ignoring implausible set multiplier");
            1
        }
        n => n,
    }
}

fn has_set_fields(obj: &Map<String, Value>) -> bool {
    SET_FIELDS
        .iter()
        .any(|field| coerce_number(obj.get(*field)).is_some())
}

fn decode_set(obj: &Map<String, Value>) -> ParsedSet {
    ParsedSet {
        reps: coerce_reps(obj.get("reps")),
        weight: coerce_measurement(obj.get("weight")),
        duration: coerce_measurement(obj.get("duration")),
        distance: coerce_measurement(obj.get("distance")),
        notes: coerce_text(obj.get("notes")),
    }
}

/// Merge exercises with the same canonical name, keeping first-mention order
fn merge_exercises(exercises: impl Iterator<Item = ParsedExercise>) -> Vec<ParsedExercise> {
    let mut merged: Vec<ParsedExercise> = Vec::new();
    for exercise in exercises {
        let key = exercise.name.to_lowercase();
        if let Some(existing) = merged.iter_mut().find(|e| e.name.to_lowercase() == key) {
            debug!(name = %exercise.name, "Merging repeated exercise");
            existing.sets.extend(exercise.sets);
            if existing.notes.is_none() {
                existing.notes = exercise.notes;
            }
        } else {
            merged.push(exercise);
        }
    }
    merged
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Model-backed workout parser
#[derive(Debug, Clone)]
pub struct WorkoutParser {
    client: LlmClient,
}

impl WorkoutParser {
    /// Create a parser over a model client
    #[must_use]
    pub const fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Parse normalized workout text
    ///
    /// # Errors
    ///
    /// Returns a provider error if the model call fails, or `ParsingFailed`
    /// if the model output is empty or not a JSON object.
    #[instrument(skip_all, fields(text_len = normalized_text.len()))]
    pub async fn parse(&self, normalized_text: &str) -> AppResult<ParsedWorkout> {
        let messages = vec![
            ChatMessage::system(PARSER_SYSTEM_PROMPT),
            ChatMessage::user(normalized_text),
        ];
        let response = self
            .client
            .call(messages, CallOptions::json().with_temperature(0.0))
            .await?;
        let raw = response
            .text()
            .ok_or_else(|| AppError::parsing_failed("model returned no content"))?;
        decode_workout(raw)
    }
}
