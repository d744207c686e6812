// ABOUTME: Text normalizer rewriting workout text into canonical units through model tool calls
// ABOUTME: The model picks the quantities; conversions are computed locally with the units module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Text Normalizer
//!
//! One round trip when nothing needs converting, two otherwise:
//!
//! 1. The model sees the text and three conversion tools.
//! 2. Each requested conversion runs locally and its result goes back as a
//!    tool message; the model then answers with the rewritten text.
//!
//! A failed first call is an error. A failed or empty second call falls back
//! to the original text.

use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::coercion::{coerce_measurement, coerce_text};
use crate::errors::AppResult;
use crate::llm::prompts::NORMALIZER_SYSTEM_PROMPT;
use crate::llm::{CallOptions, ChatMessage, LlmClient, ToolCall, ToolChoice, ToolDefinition};
use crate::units::{
    hours_to_seconds, kg_to_lbs, km_to_meters, miles_to_meters, minutes_to_seconds,
    mmss_to_seconds,
};

/// Tool converting kilograms to pounds
pub const CONVERT_WEIGHT: &str = "convert_weight";
/// Tool converting kilometers or miles to meters
pub const CONVERT_DISTANCE: &str = "convert_distance";
/// Tool converting mm:ss, minutes or hours to seconds
pub const CONVERT_DURATION: &str = "convert_duration";

/// Tool result sent when a call cannot be evaluated
const CONVERSION_UNAVAILABLE: &str = "conversion unavailable; keep the original value";

/// Definitions of the three conversion tools offered to the model
#[must_use]
pub fn conversion_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            CONVERT_WEIGHT,
            "Convert a weight in kilograms to pounds.",
            json!({
                "type": "object",
                "properties": {
                    "value": {"type": "number", "description": "Weight in kilograms"},
                    "unit": {"type": "string", "enum": ["kg"]}
                },
                "required": ["value", "unit"]
            }),
        ),
        ToolDefinition::new(
            CONVERT_DISTANCE,
            "Convert a distance in kilometers or miles to meters.",
            json!({
                "type": "object",
                "properties": {
                    "value": {"type": "number", "description": "Distance in the given unit"},
                    "unit": {"type": "string", "enum": ["km", "miles"]}
                },
                "required": ["value", "unit"]
            }),
        ),
        ToolDefinition::new(
            CONVERT_DURATION,
            "Convert a duration written as mm:ss, minutes or hours to seconds.",
            json!({
                "type": "object",
                "properties": {
                    "format": {"type": "string", "enum": ["mm:ss", "minutes", "hours"]},
                    "value": {
                        "type": "string",
                        "description": "The duration as written, e.g. \"3:45\", \"20\" or \"1.5\""
                    }
                },
                "required": ["format", "value"]
            }),
        ),
    ]
}

/// Evaluate one tool call; `None` when the call cannot be evaluated
///
/// Arguments must name a known unit and a finite, non-negative value.
#[must_use]
pub fn execute_tool_call(call: &ToolCall) -> Option<String> {
    let args = call.parsed_arguments();
    match call.name.as_str() {
        CONVERT_WEIGHT => {
            let value = coerce_measurement(args.get("value"))?;
            match unit_of(&args)?.as_str() {
                "kg" | "kgs" | "kilograms" => Some(format!("{} lbs", format_quantity(kg_to_lbs(value)))),
                _ => None,
            }
        }
        CONVERT_DISTANCE => {
            let value = coerce_measurement(args.get("value"))?;
            let meters = match unit_of(&args)?.as_str() {
                "km" | "kilometers" | "kilometres" => km_to_meters(value),
                "miles" | "mile" | "mi" => miles_to_meters(value),
                _ => return None,
            };
            Some(format!("{} meters", format_quantity(meters)))
        }
        CONVERT_DURATION => {
            let format = coerce_text(args.get("format"))?.to_lowercase();
            let seconds = match format.as_str() {
                "mm:ss" => {
                    let raw = duration_text(args.get("value"))?;
                    mmss_to_seconds(&raw)
                }
                "minutes" => minutes_to_seconds(coerce_measurement(args.get("value"))?),
                "hours" => hours_to_seconds(coerce_measurement(args.get("value"))?),
                _ => return None,
            };
            (seconds.is_finite() && seconds >= 0.0)
                .then(|| format!("{} seconds", format_quantity(seconds)))
        }
        _ => None,
    }
}

fn unit_of(args: &Value) -> Option<String> {
    coerce_text(args.get("unit")).map(|u| u.to_lowercase())
}

fn duration_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Format a computed value with at most two decimals and no trailing zeros
#[must_use]
pub fn format_quantity(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Model-backed unit normalizer
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    client: LlmClient,
}

impl TextNormalizer {
    /// Create a normalizer over a model client
    #[must_use]
    pub const fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Rewrite `text` so every quantity uses canonical units
    ///
    /// # Errors
    ///
    /// Returns a provider error if the first model call fails. Failures of the
    /// second call are absorbed and yield the original text.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub async fn normalize(&self, text: &str) -> AppResult<String> {
        let mut messages = vec![
            ChatMessage::system(NORMALIZER_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ];
        let options = || {
            CallOptions::text()
                .with_tools(conversion_tools(), ToolChoice::Auto)
                .with_temperature(0.0)
        };

        let first = self.client.call(messages.clone(), options()).await?;
        let Some(candidate) = first.first() else {
            debug!("Model returned no candidates; keeping original text");
            return Ok(text.to_owned());
        };

        if candidate.tool_calls.is_empty() {
            debug!("No conversions requested");
            return Ok(candidate
                .content
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(text)
                .to_owned());
        }

        let calls = candidate.tool_calls.clone();
        info!(count = calls.len(), "Model requested unit conversions");
        messages.push(ChatMessage::assistant_tool_calls(
            candidate.content.clone(),
            calls.clone(),
        ));
        for call in &calls {
            let result = execute_tool_call(call).unwrap_or_else(|| {
                warn!(tool = %call.name, arguments = %call.arguments, "Conversion unavailable");
                CONVERSION_UNAVAILABLE.to_owned()
            });
            debug!(tool = %call.name, result = %result, "Conversion evaluated");
            messages.push(ChatMessage::tool_result(call, result));
        }

        // Tools stay declared so tool-call history remains valid, but the model must answer in text
        let second_options = CallOptions {
            tool_choice: ToolChoice::None,
            ..options()
        };
        match self.client.call(messages, second_options).await {
            Ok(response) => Ok(response.text().map_or_else(
                || {
                    warn!("Second normalization call returned no text; keeping original");
                    text.to_owned()
                },
                |t| t.trim().to_owned(),
            )),
            Err(e) => {
                warn!(error = %e, "Second normalization call failed; keeping original");
                Ok(text.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_0".to_owned(),
            name: name.to_owned(),
            arguments: arguments.to_owned(),
        }
    }

    #[test]
    fn test_format_quantity_drops_noise() {
        assert_eq!(format_quantity(5000.0), "5000");
        assert_eq!(format_quantity(220.462), "220.46");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn test_weight_and_distance_conversions() {
        assert_eq!(
            execute_tool_call(&call(CONVERT_WEIGHT, r#"{"value":100,"unit":"kg"}"#)).as_deref(),
            Some("220.46 lbs")
        );
        assert_eq!(
            execute_tool_call(&call(CONVERT_DISTANCE, r#"{"value":5,"unit":"km"}"#)).as_deref(),
            Some("5000 meters")
        );
        assert_eq!(
            execute_tool_call(&call(CONVERT_DISTANCE, r#"{"value":"1","unit":"miles"}"#))
                .as_deref(),
            Some("1609.34 meters")
        );
    }

    #[test]
    fn test_duration_conversions() {
        assert_eq!(
            execute_tool_call(&call(CONVERT_DURATION, r#"{"format":"mm:ss","value":"3:45"}"#))
                .as_deref(),
            Some("225 seconds")
        );
        assert_eq!(
            execute_tool_call(&call(CONVERT_DURATION, r#"{"format":"minutes","value":20}"#))
                .as_deref(),
            Some("1200 seconds")
        );
        assert_eq!(
            execute_tool_call(&call(CONVERT_DURATION, r#"{"format":"hours","value":"1.5"}"#))
                .as_deref(),
            Some("5400 seconds")
        );
    }

    #[test]
    fn test_unusable_calls_yield_nothing() {
        assert!(execute_tool_call(&call(CONVERT_WEIGHT, r#"{"value":100,"unit":"stone"}"#)).is_none());
        assert!(execute_tool_call(&call(CONVERT_WEIGHT, r#"{"unit":"kg"}"#)).is_none());
        assert!(execute_tool_call(&call(CONVERT_DISTANCE, "not json")).is_none());
        assert!(execute_tool_call(&call("convert_volume", r#"{"value":1}"#)).is_none());
        assert!(execute_tool_call(&call(CONVERT_WEIGHT, r#"{"value":-5,"unit":"kg"}"#)).is_none());
    }
}
