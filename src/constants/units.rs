// ABOUTME: Unit conversion constants for mass, distance, and time
// ABOUTME: Provides named factors used by the unit conversion library
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.20462;

/// Meters per kilometer conversion factor
pub const METERS_PER_KM: f64 = 1000.0;

/// Meters per statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Seconds per minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;
