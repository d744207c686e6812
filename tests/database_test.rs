// ABOUTME: Integration tests for SQLite workout storage and usage persistence
// ABOUTME: Uses file-backed databases in temp directories to check durability across reopen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::NaiveDate;
use common::init_test_logging;
use liftscribe::database::Database;
use liftscribe::models::{ParsedExercise, ParsedSet, ParsedWorkout};
use liftscribe::pipeline::demo::sample_workout;
use liftscribe::usage_limiter::UsageStore;
use tempfile::TempDir;
use uuid::Uuid;

fn file_url(dir: &TempDir) -> String {
    format!(
        "sqlite:{}",
        dir.path().join("nested").join("liftscribe.db").display()
    )
}

fn leg_day() -> ParsedWorkout {
    let mut squats = ParsedExercise::new("Squats");
    squats.notes = Some("felt heavy".to_owned());
    squats.sets = vec![
        ParsedSet::reps(5).with_weight(225.0),
        ParsedSet {
            notes: Some("paused".to_owned()),
            ..ParsedSet::reps(3).with_weight(245.5)
        },
    ];

    let mut workout = ParsedWorkout::new();
    workout.name = Some("Leg day".to_owned());
    workout.duration = Some(50.0);
    workout.exercises = vec![squats, ParsedExercise::new("Stretching")];
    workout
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = file_url(&dir);
    let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

    let stored = {
        let db = Database::new(&url).await.unwrap();
        let store = db.usage_store();
        store.increment_daily_count("ivan", day).await.unwrap();
        store.increment_daily_count("ivan", day).await.unwrap();
        db.create_workout("ivan", &leg_day()).await.unwrap()
    };

    let reopened = Database::new(&url).await.unwrap();
    assert_eq!(
        reopened
            .usage_store()
            .get_daily_count("ivan", day)
            .await
            .unwrap(),
        2
    );
    let loaded = reopened.get_workout(stored.id).await.unwrap().unwrap();
    assert_eq!(loaded.workout, leg_day_with_date(&stored.workout));
    assert_eq!(loaded.created_at, stored.created_at);
}

fn leg_day_with_date(reference: &ParsedWorkout) -> ParsedWorkout {
    let mut expected = leg_day();
    expected.date = reference.date;
    expected
}

#[tokio::test]
async fn test_list_workouts_is_per_user_newest_first() {
    init_test_logging();
    let db = Database::new("sqlite::memory:").await.unwrap();

    let first = db.create_workout("judy", &sample_workout()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = db.create_workout("judy", &leg_day()).await.unwrap();
    db.create_workout("mallory", &leg_day()).await.unwrap();

    let listed = db.list_workouts("judy", 10).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(listed.iter().all(|w| w.user_id == "judy"));

    assert_eq!(db.list_workouts("judy", 1).await.unwrap().len(), 1);
    assert!(db.list_workouts("nobody", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_workout_is_none() {
    init_test_logging();
    let db = Database::new("sqlite::memory:").await.unwrap();
    assert!(db.get_workout(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    init_test_logging();
    assert!(Database::new("postgres://localhost/nope").await.is_err());
}
