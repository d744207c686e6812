// ABOUTME: Workout validator asking the model whether text describes a workout
// ABOUTME: Expects {"isWorkoutRelated": bool}; any other shape is an error, never a silent false
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Deserialize;
use tracing::{debug, instrument};

use super::parser::strip_code_fence;
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::VALIDATOR_SYSTEM_PROMPT;
use crate::llm::{CallOptions, ChatMessage, LlmClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Verdict {
    is_workout_related: bool,
}

/// Decode the validator's JSON verdict
///
/// # Errors
///
/// Returns `ParsingFailed` unless the payload is an object with a boolean
/// `isWorkoutRelated` field.
pub fn decode_verdict(raw: &str) -> AppResult<bool> {
    serde_json::from_str::<Verdict>(strip_code_fence(raw))
        .map(|v| v.is_workout_related)
        .map_err(|e| {
            AppError::parsing_failed(format!("unexpected validator response: {e}")).with_source(e)
        })
}

/// Model-backed workout/non-workout classifier
#[derive(Debug, Clone)]
pub struct WorkoutValidator {
    client: LlmClient,
}

impl WorkoutValidator {
    /// Create a validator over a model client
    #[must_use]
    pub const fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Whether `text` describes a workout
    ///
    /// # Errors
    ///
    /// Returns a provider error if the call fails, or `ParsingFailed` if the
    /// response is not the expected verdict object.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub async fn is_workout_related(&self, text: &str) -> AppResult<bool> {
        let messages = vec![
            ChatMessage::system(VALIDATOR_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ];
        let response = self
            .client
            .call(messages, CallOptions::json().with_temperature(0.0))
            .await?;
        let raw = response
            .text()
            .ok_or_else(|| AppError::parsing_failed("validator returned no content"))?;
        let verdict = decode_verdict(raw)?;
        debug!(verdict, "Validated workout text");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdicts() {
        assert!(decode_verdict(r#"{"isWorkoutRelated": true}"#).unwrap());
        assert!(!decode_verdict("```json\n{\"isWorkoutRelated\": false}\n```").unwrap());
    }

    #[test]
    fn test_malformed_verdicts_are_errors() {
        assert!(decode_verdict(r#"{"isWorkoutRelated": "yes"}"#).is_err());
        assert!(decode_verdict(r#"{"related": true}"#).is_err());
        assert!(decode_verdict("true").is_err());
    }
}
