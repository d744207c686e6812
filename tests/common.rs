// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, a scripted model provider and pipeline builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `liftscribe`

use async_trait::async_trait;
use liftscribe::config::UsageLimitConfig;
use liftscribe::errors::{AppError, AppResult};
use liftscribe::llm::{
    Candidate, ChatRequest, ChatResponse, LlmCapabilities, LlmClient, LlmProvider, ToolCall,
};
use liftscribe::pipeline::WorkoutPipeline;
use liftscribe::usage_limiter::UsageLimiter;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Provider replaying queued responses and recording every request
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<AppResult<ChatResponse>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text answer
    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(ChatResponse::from_text("scripted", text)))
    }

    /// Queue an answer carrying tool calls as `(name, json arguments)`
    pub fn tool_calls(self, calls: &[(&str, &str)]) -> Self {
        let tool_calls = calls
            .iter()
            .enumerate()
            .map(|(i, (name, arguments))| ToolCall {
                id: format!("call_{i}"),
                name: (*name).to_owned(),
                arguments: (*arguments).to_owned(),
            })
            .collect();
        self.push(Ok(ChatResponse {
            candidates: vec![Candidate {
                content: None,
                tool_calls,
                finish_reason: Some("tool_calls".to_owned()),
            }],
            model: "scripted".to_owned(),
            usage: None,
        }))
    }

    /// Queue a provider failure
    pub fn fail(self, error: AppError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: AppResult<ChatResponse>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn client(&self) -> LlmClient {
        LlmClient::with_provider(self.clone())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::internal("scripted provider has no more responses")))
    }
}

pub fn usage_config(daily_limit: u32) -> UsageLimitConfig {
    UsageLimitConfig {
        daily_limit,
        ..UsageLimitConfig::default()
    }
}

/// Pipeline over a scripted provider and a fresh in-memory limiter
pub fn scripted_pipeline(provider: &ScriptedProvider, daily_limit: u32) -> WorkoutPipeline {
    init_test_logging();
    WorkoutPipeline::new(
        provider.client(),
        UsageLimiter::in_memory(usage_config(daily_limit)),
    )
}
