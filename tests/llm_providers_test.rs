// ABOUTME: HTTP-level tests for the OpenAI-compatible, Anthropic, Gemini and custom providers
// ABOUTME: Mock servers check request shape, response mapping and status-code error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::init_test_logging;
use liftscribe::errors::ErrorCode;
use liftscribe::llm::{
    AnthropicConfig, AnthropicProvider, CallOptions, ChatMessage, ChatRequest, ChatResponse,
    CustomHttpConfig, CustomHttpProvider, GeminiConfig, GeminiProvider, LlmProvider,
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, ToolChoice,
};
use liftscribe::pipeline::normalizer::{conversion_tools, CONVERT_DISTANCE};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json_request() -> ChatRequest {
    ChatRequest::from_options(
        vec![
            ChatMessage::system("Classify the text."),
            ChatMessage::user("3x10 pushups"),
        ],
        CallOptions::json().with_temperature(0.0),
    )
}

fn tool_request() -> ChatRequest {
    ChatRequest::from_options(
        vec![
            ChatMessage::system("Normalize units."),
            ChatMessage::user("Ran for 5km"),
        ],
        CallOptions::text().with_tools(conversion_tools(), ToolChoice::Auto),
    )
}

// ============================================================================
// OpenAI-compatible
// ============================================================================

fn openai(server: &MockServer) -> OpenAiCompatibleProvider {
    init_test_logging();
    OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url: server.uri(),
        api_key: Some("sk-test".to_owned()),
        default_model: "gpt-test".to_owned(),
        ..OpenAiCompatibleConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_openai_json_mode_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "response_format": {"type": "json_object"},
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-test",
            "choices": [{
                "message": {"role": "assistant", "content": "{\"isWorkoutRelated\": true}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = openai(&server).complete(&json_request()).await.unwrap();

    assert_eq!(response.text(), Some("{\"isWorkoutRelated\": true}"));
    assert_eq!(response.model, "gpt-test");
    assert_eq!(response.usage.unwrap().total_tokens, 18);
}

#[tokio::test]
async fn test_openai_tool_calls_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"tool_choice": "auto"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-test",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "convert_distance",
                            "arguments": "{\"value\":5,\"unit\":\"km\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let response = openai(&server).complete(&tool_request()).await.unwrap();

    let calls = response.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "call_abc");
    assert_eq!(calls[0].name, CONVERT_DISTANCE);
    assert_eq!(calls[0].parsed_arguments()["value"], 5);
}

#[tokio::test]
async fn test_openai_status_codes_map_to_error_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider = openai(&server);
    let auth = provider.complete(&json_request()).await.unwrap_err();
    assert_eq!(auth.code, ErrorCode::ExternalAuthFailed);
    assert!(auth.message.contains("Incorrect API key"));

    let limited = provider.complete(&json_request()).await.unwrap_err();
    assert_eq!(limited.code, ErrorCode::ExternalRateLimited);
}

// ============================================================================
// Anthropic
// ============================================================================

fn anthropic(server: &MockServer) -> AnthropicProvider {
    init_test_logging();
    AnthropicProvider::new(AnthropicConfig {
        base_url: server.uri(),
        default_model: "claude-test".to_owned(),
        ..AnthropicConfig::new("ak-test")
    })
    .unwrap()
}

#[tokio::test]
async fn test_anthropic_request_shape_and_tool_use() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "system": "Normalize units.",
            "tool_choice": {"type": "auto"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "claude-test",
            "stop_reason": "tool_use",
            "content": [
                {"type": "text", "text": "Converting."},
                {"type": "tool_use", "id": "toolu_1", "name": "convert_distance",
                 "input": {"value": 5, "unit": "km"}}
            ],
            "usage": {"input_tokens": 20, "output_tokens": 10}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = anthropic(&server).complete(&tool_request()).await.unwrap();

    let calls = response.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "toolu_1");
    assert_eq!(calls[0].parsed_arguments()["unit"], "km");
    assert_eq!(response.text(), Some("Converting."));
}

#[tokio::test]
async fn test_anthropic_overload_is_an_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .mount(&server)
        .await;

    let err = anthropic(&server).complete(&json_request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

// ============================================================================
// Gemini
// ============================================================================

fn gemini(server: &MockServer) -> GeminiProvider {
    init_test_logging();
    GeminiProvider::new(GeminiConfig {
        base_url: server.uri(),
        default_model: "gemini-test".to_owned(),
        ..GeminiConfig::new("gk-test")
    })
    .unwrap()
}

#[tokio::test]
async fn test_gemini_json_mode_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(query_param("key", "gk-test"))
        .and(body_partial_json(json!({
            "generation_config": {"response_mime_type": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"isWorkoutRelated\": false}"}]},
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-test-001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gemini(&server).complete(&json_request()).await.unwrap();

    assert_eq!(response.text(), Some("{\"isWorkoutRelated\": false}"));
    assert_eq!(response.model, "gemini-test-001");
}

#[tokio::test]
async fn test_gemini_function_calls_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "convert_distance", "args": {"value": 5, "unit": "km"}}}
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let response = gemini(&server).complete(&tool_request()).await.unwrap();

    let calls = response.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, CONVERT_DISTANCE);
    assert_eq!(calls[0].parsed_arguments()["value"], 5);
}

#[tokio::test]
async fn test_gemini_forbidden_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = gemini(&server).complete(&json_request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
}

// ============================================================================
// Custom HTTP
// ============================================================================

#[tokio::test]
async fn test_custom_endpoint_round_trip() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/llm"))
        .and(header("authorization", "Bearer custom-token"))
        .and(body_partial_json(json!({
            "model": "custom",
            "response_format": "json"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ChatResponse::from_text("house-model", "{\"exercises\":[]}")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = CustomHttpProvider::new(CustomHttpConfig {
        api_key: Some("custom-token".to_owned()),
        ..CustomHttpConfig::new(format!("{}/llm", server.uri()))
    })
    .unwrap();

    let response = provider.complete(&json_request()).await.unwrap();
    assert_eq!(response.model, "house-model");
    assert_eq!(response.text(), Some("{\"exercises\":[]}"));
}

#[tokio::test]
async fn test_custom_endpoint_server_error() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let provider = CustomHttpProvider::new(CustomHttpConfig::new(server.uri())).unwrap();
    let err = provider.complete(&json_request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
}
