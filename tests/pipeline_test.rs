// ABOUTME: Integration tests for the full workout pipeline facade
// ABOUTME: Covers validation gating, quota rejection, usage accounting and demo mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{init_test_logging, scripted_pipeline, usage_config, ScriptedProvider};
use liftscribe::errors::ErrorCode;
use liftscribe::llm::LlmClient;
use liftscribe::pipeline::demo::sample_workout;
use liftscribe::pipeline::{PipelineOutcome, RejectionReason, WorkoutPipeline};
use liftscribe::usage_limiter::UsageLimiter;

const WORKOUT_JSON: &str = r#"{"exercises":[{"name":"pushups","sets":[{"reps":10,"count":3}]}]}"#;

/// Script one successful process run: verdict, normalization, parse
fn successful_run(provider: ScriptedProvider) -> ScriptedProvider {
    provider
        .reply(r#"{"isWorkoutRelated": true}"#)
        .reply("3x10 pushups")
        .reply(WORKOUT_JSON)
}

// ============================================================================
// Process flow
// ============================================================================

#[tokio::test]
async fn test_process_parses_and_counts_usage() {
    let provider = successful_run(ScriptedProvider::new());
    let pipeline = scripted_pipeline(&provider, 10);

    let outcome = pipeline
        .process_workout_text("alice", "3x10 pushups")
        .await
        .unwrap();

    let PipelineOutcome::Parsed(workout) = outcome else {
        panic!("expected a parsed workout, got {outcome:?}");
    };
    assert_eq!(workout.exercises[0].name, "Pushups");
    assert_eq!(workout.total_sets(), 3);
    assert_eq!(provider.call_count(), 3);

    let status = pipeline.check_usage_limit("alice").await.unwrap();
    assert_eq!(status.current_count, 1);
    assert!(!status.limit_exceeded);
}

#[tokio::test]
async fn test_non_workout_text_is_rejected_without_parsing() {
    let provider = ScriptedProvider::new().reply(r#"{"isWorkoutRelated": false}"#);
    let pipeline = scripted_pipeline(&provider, 10);

    let outcome = pipeline
        .process_workout_text("alice", "what's the weather tomorrow?")
        .await
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::Rejected(RejectionReason::NotWorkout));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(pipeline.check_usage_limit("alice").await.unwrap().current_count, 0);
}

#[tokio::test]
async fn test_quota_rejects_before_model_parsing() {
    let provider = successful_run(ScriptedProvider::new()).reply(r#"{"isWorkoutRelated": true}"#);
    let pipeline = scripted_pipeline(&provider, 1);

    let first = pipeline.process_workout_text("bob", "3x10 pushups").await.unwrap();
    assert!(matches!(first, PipelineOutcome::Parsed(_)));

    let second = pipeline.process_workout_text("bob", "3x10 pushups").await.unwrap();
    let PipelineOutcome::Rejected(RejectionReason::QuotaExceeded(status)) = second else {
        panic!("expected quota rejection, got {second:?}");
    };
    assert!(status.limit_exceeded);
    assert_eq!(status.current_count, 1);
    assert_eq!(status.limit, 1);
    // Only the verdict call was made for the rejected run
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn test_failed_parse_does_not_count_usage() {
    let provider = ScriptedProvider::new()
        .reply(r#"{"isWorkoutRelated": true}"#)
        .reply("3x10 pushups")
        .reply("not json at all");
    let pipeline = scripted_pipeline(&provider, 10);

    let err = pipeline
        .process_workout_text("carol", "3x10 pushups")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ParsingFailed);
    assert_eq!(pipeline.check_usage_limit("carol").await.unwrap().current_count, 0);
}

#[tokio::test]
async fn test_malformed_verdict_is_an_error() {
    let provider = ScriptedProvider::new().reply(r#"{"isWorkoutRelated": "maybe"}"#);
    let pipeline = scripted_pipeline(&provider, 10);

    let err = pipeline.validate_workout_text("3x10 pushups").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ParsingFailed);
}

// ============================================================================
// Input and configuration edge cases
// ============================================================================

#[tokio::test]
async fn test_blank_text_is_invalid_input() {
    let provider = ScriptedProvider::new();
    let pipeline = scripted_pipeline(&provider, 10);

    for text in ["", "   \n\t"] {
        let err = pipeline.parse_workout_text(text).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_unconfigured_provider_fails_every_model_operation() {
    init_test_logging();
    let pipeline = WorkoutPipeline::new(
        LlmClient::unavailable(),
        UsageLimiter::in_memory(usage_config(10)),
    );

    let validate = pipeline.validate_workout_text("3x10 pushups").await.unwrap_err();
    let parse = pipeline.parse_workout_text("3x10 pushups").await.unwrap_err();
    assert_eq!(validate.code, ErrorCode::ConfigMissing);
    assert_eq!(parse.code, ErrorCode::ConfigMissing);

    // Usage checks need no model
    let status = pipeline.check_usage_limit("dave").await.unwrap();
    assert_eq!(status.current_count, 0);
}

#[tokio::test]
async fn test_demo_mode_returns_sample_without_model() {
    init_test_logging();
    let pipeline = WorkoutPipeline::new(
        LlmClient::unavailable(),
        UsageLimiter::in_memory(usage_config(10)),
    )
    .with_demo_mode(true);

    let workout = pipeline.parse_workout_text("anything").await.unwrap();
    assert!(!workout.exercises.is_empty());
    assert!(workout.exercises.iter().any(|e| e.sets.is_empty()));
}

#[tokio::test]
async fn test_demo_mode_processes_without_model() {
    init_test_logging();
    let pipeline = WorkoutPipeline::new(
        LlmClient::unavailable(),
        UsageLimiter::in_memory(usage_config(1)),
    )
    .with_demo_mode(true);

    let outcome = pipeline
        .process_workout_text("oscar", "3x10 pushups")
        .await
        .unwrap();
    match outcome {
        PipelineOutcome::Parsed(workout) => assert_eq!(workout, sample_workout()),
        other => panic!("expected sample workout, got {other:?}"),
    }
    assert_eq!(pipeline.check_usage_limit("oscar").await.unwrap().current_count, 1);

    // The daily limit still applies in demo mode
    let outcome = pipeline
        .process_workout_text("oscar", "3x10 pushups")
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        PipelineOutcome::Rejected(RejectionReason::QuotaExceeded(_))
    ));
}
