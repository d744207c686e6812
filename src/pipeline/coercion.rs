// ABOUTME: Lenient coercion of model-emitted JSON values into finite numbers, rep counts and text
// ABOUTME: Anything that is not a usable value becomes None rather than an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::Value;

/// Coerce a JSON value into a finite number
///
/// Numbers and numeric strings (surrounding whitespace ignored) yield a
/// value. Absent, `null`, booleans, arrays, objects, empty or non-numeric
/// strings, and non-finite results yield `None`.
#[must_use]
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|v| v.is_finite())
}

/// Coerce a JSON value into a repetition count
///
/// The number must be non-negative and whole; `10.0` is accepted as 10.
#[must_use]
pub fn coerce_reps(value: Option<&Value>) -> Option<u32> {
    let number = coerce_number(value)?;
    if number < 0.0 || (number - number.round()).abs() > f64::EPSILON {
        return None;
    }
    let rounded = number.round();
    if rounded > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(rounded as u32)
}

/// Coerce a JSON value into a non-negative measurement
#[must_use]
pub fn coerce_measurement(value: Option<&Value>) -> Option<f64> {
    coerce_number(value).filter(|v| *v >= 0.0)
}

/// Coerce a JSON value into trimmed, non-empty text
#[must_use]
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        _ => None,
    }
}
