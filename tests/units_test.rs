// ABOUTME: Integration tests for unit conversions and lenient value coercion
// ABOUTME: Covers round trips, the mm:ss edge cases and coercion idempotence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use liftscribe::pipeline::coercion::{coerce_number, coerce_reps};
use liftscribe::units::{
    kg_to_lbs, lbs_to_kg, meters_to_miles, miles_to_meters, mmss_to_seconds, seconds_to_mmss,
};
use serde_json::{json, Value};

fn within_relative(a: f64, b: f64, tolerance: f64) -> bool {
    ((a - b) / b).abs() <= tolerance
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn test_weight_and_distance_round_trips() {
    for x in [0.5, 1.0, 45.0, 100.0, 227.3, 1_000_000.0] {
        assert!(within_relative(kg_to_lbs(lbs_to_kg(x)), x, 1e-6), "weight {x}");
        assert!(
            within_relative(miles_to_meters(meters_to_miles(x)), x, 1e-6),
            "distance {x}"
        );
    }
}

#[test]
fn test_mmss_conversions() {
    assert_eq!(seconds_to_mmss(mmss_to_seconds("3:45")), "3:45");
    assert!((mmss_to_seconds("1:30") - 90.0).abs() < f64::EPSILON);
    assert!((mmss_to_seconds("2") - 120.0).abs() < f64::EPSILON);
    assert_eq!(seconds_to_mmss(65.0), "1:05");
}

// ============================================================================
// Coercion
// ============================================================================

#[test]
fn test_coercion_is_idempotent() {
    let samples = [
        json!(12.5),
        json!("12.5"),
        json!(" 7 "),
        json!("abc"),
        json!(""),
        Value::Null,
        json!(true),
        json!([3]),
    ];
    for sample in &samples {
        let once = coerce_number(Some(sample));
        let twice = coerce_number(once.map(Value::from).as_ref());
        assert_eq!(once, twice, "sample {sample}");
    }
}

#[test]
fn test_coercion_basics() {
    assert_eq!(coerce_number(None), None);
    assert_eq!(coerce_number(Some(&Value::Null)), None);
    assert_eq!(coerce_number(Some(&json!("12.5"))), Some(12.5));
    assert_eq!(coerce_number(Some(&json!("abc"))), None);
    assert_eq!(coerce_number(Some(&json!("NaN"))), None);
}

#[test]
fn test_rep_counts_must_be_whole() {
    assert_eq!(coerce_reps(Some(&json!(10))), Some(10));
    assert_eq!(coerce_reps(Some(&json!("10"))), Some(10));
    assert_eq!(coerce_reps(Some(&json!(10.0))), Some(10));
    assert_eq!(coerce_reps(Some(&json!(8.5))), None);
    assert_eq!(coerce_reps(Some(&json!(-3))), None);
}
