// ABOUTME: Fixed sample workout returned by the parser when demo mode is enabled
// ABOUTME: Lets the CLI and front ends run without a model provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{ParsedExercise, ParsedSet, ParsedWorkout};

/// Sample workout dated today at midnight UTC
#[must_use]
pub fn sample_workout() -> ParsedWorkout {
    let mut bench = ParsedExercise::new("Bench Press");
    bench.sets = vec![
        ParsedSet::reps(8).with_weight(135.0),
        ParsedSet::reps(8).with_weight(135.0),
        ParsedSet::reps(6).with_weight(155.0),
    ];

    let mut pushups = ParsedExercise::new("Pushups");
    pushups.sets = vec![ParsedSet::reps(15); 3];

    let mut running = ParsedExercise::new("Running");
    running.sets = vec![ParsedSet {
        duration: Some(1500.0),
        distance: Some(5000.0),
        ..ParsedSet::default()
    }];

    let mut workout = ParsedWorkout::new();
    workout.name = Some("Demo Workout".to_owned());
    workout.duration = Some(45.0);
    workout.notes = Some("Sample data; demo mode is enabled".to_owned());
    workout.exercises = vec![bench, pushups, running, ParsedExercise::new("Stretching")];
    workout
}
