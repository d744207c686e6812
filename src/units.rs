// ABOUTME: Pure unit conversion functions for mass, distance and time
// ABOUTME: Canonical units are pounds, meters and seconds; nothing here can fail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unit Conversion
//!
//! Deterministic conversions used by the text normalizer. Callers guarantee
//! non-negative, finite inputs.

use crate::constants::units::{
    LBS_PER_KG, METERS_PER_KM, METERS_PER_MILE, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};

/// Kilograms to pounds
#[must_use]
pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

/// Pounds to kilograms
#[must_use]
pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / LBS_PER_KG
}

/// Kilometers to meters
#[must_use]
pub fn km_to_meters(km: f64) -> f64 {
    km * METERS_PER_KM
}

/// Miles to meters
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Meters to kilometers
#[must_use]
pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

/// Meters to miles
#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Parse an `MM:SS` string into seconds.
///
/// A value without a colon is taken as whole minutes, so `"2"` is 120
/// seconds. Components that do not parse count as zero.
#[must_use]
pub fn mmss_to_seconds(value: &str) -> f64 {
    let mut parts = value.trim().splitn(2, ':');
    let minutes = parse_component(parts.next());
    let seconds = parse_component(parts.next());
    minutes.mul_add(SECONDS_PER_MINUTE, seconds)
}

fn parse_component(part: Option<&str>) -> f64 {
    part.and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Minutes to seconds
#[must_use]
pub fn minutes_to_seconds(minutes: f64) -> f64 {
    minutes * SECONDS_PER_MINUTE
}

/// Hours to seconds
#[must_use]
pub fn hours_to_seconds(hours: f64) -> f64 {
    hours * SECONDS_PER_HOUR
}

/// Format seconds as `M:SS` (minutes unpadded, seconds zero-padded)
#[must_use]
pub fn seconds_to_mmss(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-6
    }

    #[test]
    fn test_mmss_round_trip() {
        assert_eq!(seconds_to_mmss(mmss_to_seconds("3:45")), "3:45");
        assert!((mmss_to_seconds("1:30") - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bare_minutes_without_colon() {
        assert!((mmss_to_seconds("2") - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seconds_to_mmss_pads_seconds_only() {
        assert_eq!(seconds_to_mmss(65.0), "1:05");
        assert_eq!(seconds_to_mmss(600.0), "10:00");
        assert_eq!(seconds_to_mmss(5.0), "0:05");
    }

    #[test]
    fn test_unit_round_trips() {
        for x in [0.5, 1.0, 42.0, 225.0, 10_000.0] {
            assert!(approx_eq(kg_to_lbs(lbs_to_kg(x)), x));
            assert!(approx_eq(miles_to_meters(meters_to_miles(x)), x));
            assert!(approx_eq(km_to_meters(meters_to_km(x)), x));
        }
    }

    #[test]
    fn test_time_factors() {
        assert!((minutes_to_seconds(30.0) - 1800.0).abs() < f64::EPSILON);
        assert!((hours_to_seconds(1.5) - 5400.0).abs() < f64::EPSILON);
    }
}
