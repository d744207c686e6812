// ABOUTME: Anthropic messages API provider
// ABOUTME: Maps tool calls to tool_use/tool_result content blocks and emulates JSON mode with an instruction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Anthropic Provider
//!
//! ## Configuration
//!
//! - `ANTHROPIC_API_KEY`: API key
//! - `ANTHROPIC_BASE_URL`: Base URL (default: <https://api.anthropic.com>)
//! - `LIFTSCRIBE_LLM_MODEL`: Model override (default: `claude-3-5-haiku-latest`)
//!
//! The messages API has no native JSON mode. When a request asks for JSON the
//! provider appends an instruction to the system prompt instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{
    Candidate, ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole,
    ResponseFormat, TokenUsage, ToolCall, ToolChoice,
};
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::{create_client_with_timeout, map_status_error, send_for_body};

const SERVICE: &str = "Anthropic";

/// Default base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// API version header value
const API_VERSION: &str = "2023-06-01";

const JSON_INSTRUCTION: &str =
    "Respond with a single JSON object only. Do not wrap it in Markdown or add any other text.";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<AnthropicToolChoice>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicToolChoice {
    Auto,
    Tool { name: String },
    None,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicResponseContent>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicResponseContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type", default)]
    error_type: String,
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Configuration for the Anthropic provider
#[derive(Clone)]
pub struct AnthropicConfig {
    /// Base URL for the API
    pub base_url: String,
    /// API key sent as `x-api-key`
    pub api_key: String,
    /// Default model to use
    pub default_model: String,
    /// Bound on each call
    pub request_timeout: Duration,
}

impl AnthropicConfig {
    /// Configuration for the hosted API
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.to_owned(),
            request_timeout: Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        }
    }
}

impl Debug for AnthropicConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnthropicConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Anthropic messages API provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AnthropicConfig) -> AppResult<Self> {
        let client = create_client_with_timeout(
            config.request_timeout,
            Duration::from_secs(defaults::LLM_CONNECT_TIMEOUT_SECS),
        )?;
        info!(model = %config.default_model, "Initializing Anthropic provider");
        Ok(Self { client, config })
    }

    /// Convert messages, merging consecutive tool results into one user turn
    fn convert_messages(messages: &[ChatMessage]) -> Vec<AnthropicMessage> {
        let mut converted: Vec<AnthropicMessage> = Vec::new();
        for msg in messages {
            match msg.role {
                MessageRole::System => {}
                MessageRole::User => converted.push(AnthropicMessage {
                    role: "user",
                    content: vec![AnthropicContent::Text {
                        text: msg.content.clone(),
                    }],
                }),
                MessageRole::Assistant => {
                    let mut content = Vec::with_capacity(msg.tool_calls.len() + 1);
                    if !msg.content.is_empty() {
                        content.push(AnthropicContent::Text {
                            text: msg.content.clone(),
                        });
                    }
                    content.extend(msg.tool_calls.iter().map(|call| AnthropicContent::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.parsed_arguments(),
                    }));
                    converted.push(AnthropicMessage {
                        role: "assistant",
                        content,
                    });
                }
                MessageRole::Tool => {
                    let block = AnthropicContent::ToolResult {
                        tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                        content: msg.content.clone(),
                    };
                    match converted.last_mut() {
                        Some(last)
                            if last.role == "user"
                                && last
                                    .content
                                    .iter()
                                    .all(|c| matches!(c, AnthropicContent::ToolResult { .. })) =>
                        {
                            last.content.push(block);
                        }
                        _ => converted.push(AnthropicMessage {
                            role: "user",
                            content: vec![block],
                        }),
                    }
                }
            }
        }
        converted
    }

    fn system_prompt(request: &ChatRequest) -> Option<String> {
        let system = request.system_prompt();
        if request.response_format != ResponseFormat::Json {
            return system;
        }
        Some(system.map_or_else(
            || JSON_INSTRUCTION.to_owned(),
            |s| format!("{s}\n\n{JSON_INSTRUCTION}"),
        ))
    }

    fn build_request(&self, request: &ChatRequest) -> AnthropicRequest {
        let has_tools = request.has_tools();
        AnthropicRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            max_tokens: request.max_tokens.unwrap_or(defaults::MAX_OUTPUT_TOKENS),
            system: Self::system_prompt(request),
            messages: Self::convert_messages(&request.messages),
            temperature: request.temperature,
            tools: request
                .tools
                .iter()
                .map(|tool| AnthropicTool {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    input_schema: tool.parameters.clone(),
                })
                .collect(),
            tool_choice: has_tools.then(|| match &request.tool_choice {
                ToolChoice::Auto => AnthropicToolChoice::Auto,
                ToolChoice::Forced(name) => AnthropicToolChoice::Tool { name: name.clone() },
                ToolChoice::None => AnthropicToolChoice::None,
            }),
        }
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<AnthropicErrorResponse>(body).map_or_else(
            |_| body.to_owned(),
            |e| format!("{} - {}", e.error.error_type, e.error.message),
        );
        map_status_error(SERVICE, status, &message)
    }

    fn convert_response(response: AnthropicResponse) -> ChatResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                AnthropicResponseContent::Text { text: t } => text.push_str(&t),
                AnthropicResponseContent::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                }),
                AnthropicResponseContent::Other => {}
            }
        }
        ChatResponse {
            candidates: vec![Candidate {
                content: (!text.is_empty()).then_some(text),
                tool_calls,
                finish_reason: response.stop_reason,
            }],
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens.saturating_add(u.output_tokens),
            }),
        }
    }
}

impl Debug for AnthropicProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnthropicProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn display_name(&self) -> &'static str {
        "Anthropic Claude"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::FUNCTION_CALLING | LlmCapabilities::SYSTEM_MESSAGES
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let body = self.build_request(request);
        debug!(
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending messages request"
        );

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let http_request = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let (status, text) = send_for_body(SERVICE, http_request).await?;

        if !status.is_success() {
            error!(status = %status, "Anthropic API error");
            return Err(Self::parse_error_response(status, &text));
        }

        let response: AnthropicResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to decode Anthropic response");
            AppError::external_service(SERVICE, format!("invalid response payload: {e}"))
                .with_source(e)
        })?;
        Ok(Self::convert_response(response))
    }
}
