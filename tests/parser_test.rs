// ABOUTME: Integration tests for workout parsing over a scripted model
// ABOUTME: Covers multi-set expansion, mixed-set grouping, empty sets and decoding failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{scripted_pipeline, ScriptedProvider};
use liftscribe::errors::ErrorCode;
use liftscribe::llm::ResponseFormat;
use liftscribe::models::ParsedSet;
use liftscribe::pipeline::parser::decode_workout;
use liftscribe::pipeline::WorkoutParser;

// ============================================================================
// Full parse through the pipeline (normalize, then parse)
// ============================================================================

#[tokio::test]
async fn test_multi_set_expansion() {
    let provider = ScriptedProvider::new()
        .reply("3x10 pushups")
        .reply(r#"{"exercises":[{"name":"push-ups","sets":[{"reps":10,"count":3}]}]}"#);
    let pipeline = scripted_pipeline(&provider, 10);

    let workout = pipeline.parse_workout_text("3x10 pushups").await.unwrap();

    assert_eq!(workout.exercises.len(), 1);
    let exercise = &workout.exercises[0];
    assert_eq!(exercise.name, "Pushups");
    assert_eq!(exercise.sets, vec![ParsedSet::reps(10); 3]);
    assert!(exercise.sets.iter().all(|s| s.weight.is_none()));
}

#[tokio::test]
async fn test_mixed_sets_are_grouped_under_one_exercise() {
    let text = "2 sets of 8 reps at 100lb bench press, then 1 set of 10 reps at 115lb bench press";
    let provider = ScriptedProvider::new().reply(text).reply(
        r#"{"exercises":[
            {"name":"bench press","sets":[{"reps":8,"weight":100,"count":2}]},
            {"name":"Bench Press","sets":[{"reps":10,"weight":"115"}]}
        ]}"#,
    );
    let pipeline = scripted_pipeline(&provider, 10);

    let workout = pipeline.parse_workout_text(text).await.unwrap();

    assert_eq!(workout.exercises.len(), 1);
    let bench = &workout.exercises[0];
    assert_eq!(bench.name, "Bench Press");
    assert_eq!(
        bench.sets,
        vec![
            ParsedSet::reps(8).with_weight(100.0),
            ParsedSet::reps(8).with_weight(100.0),
            ParsedSet::reps(10).with_weight(115.0),
        ]
    );
}

#[tokio::test]
async fn test_exercise_without_detail_has_empty_sets() {
    let provider = ScriptedProvider::new()
        .reply("did some stretching")
        .reply(r#"{"exercises":[{"name":"stretching"}]}"#);
    let pipeline = scripted_pipeline(&provider, 10);

    let workout = pipeline.parse_workout_text("did some stretching").await.unwrap();

    assert_eq!(workout.exercises[0].name, "Stretching");
    assert!(workout.exercises[0].sets.is_empty());
    let json = serde_json::to_value(&workout).unwrap();
    assert_eq!(json["exercises"][0]["sets"], serde_json::json!([]));
}

#[tokio::test]
async fn test_parser_requests_json_mode() {
    let provider = ScriptedProvider::new().reply(r#"{"exercises":[]}"#);
    let parser = WorkoutParser::new(provider.client());

    parser.parse("walked 2000 meters").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].response_format, ResponseFormat::Json);
    assert!(requests[0].tools.is_empty());
    assert!(requests[0].system_prompt().is_some());
}

#[tokio::test]
async fn test_invalid_model_output_is_a_parsing_error() {
    let provider = ScriptedProvider::new().reply("Sure! Here is your workout.");
    let parser = WorkoutParser::new(provider.client());

    let err = parser.parse("3x10 pushups").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ParsingFailed);
}

// ============================================================================
// Decoding tolerance
// ============================================================================

#[test]
fn test_fenced_output_with_loose_values() {
    let workout = decode_workout(
        "```json\n{\"name\":\"Leg day\",\"duration\":\"45\",\"exercises\":[\
         {\"name\":\"squat\",\"sets\":[{\"reps\":\"5\",\"weight\":\"abc\"},\"oops\"]},\
         {\"notes\":\"no name\"},\
         {\"name\":\"running\",\"sets\":[{\"distance\":5000,\"duration\":1500}]}]}\n```",
    )
    .unwrap();

    assert_eq!(workout.name.as_deref(), Some("Leg day"));
    assert_eq!(workout.duration, Some(45.0));
    assert_eq!(workout.exercises.len(), 2);
    assert_eq!(workout.exercises[0].name, "Squats");
    assert_eq!(workout.exercises[0].sets, vec![ParsedSet::reps(5)]);
    assert_eq!(workout.exercises[1].name, "Running");
    assert_eq!(workout.exercises[1].sets[0].distance, Some(5000.0));
}

#[test]
fn test_missing_exercises_field_is_an_empty_workout() {
    let workout = decode_workout(r#"{"notes":"rest day"}"#).unwrap();
    assert!(workout.exercises.is_empty());
    assert_eq!(workout.notes.as_deref(), Some("rest day"));
}

#[test]
fn test_implausible_multiplier_is_ignored() {
    let workout =
        decode_workout(r#"{"exercises":[{"name":"Dips","sets":[{"reps":10,"count":5000}]}]}"#)
            .unwrap();
    assert_eq!(workout.exercises[0].sets.len(), 1);
}
