// ABOUTME: Google Gemini LLM provider implementation
// ABOUTME: Maps tools to function declarations and tool results to functionResponse parts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! Implementation of `LlmProvider` for the Google Gemini generative language
//! API.
//!
//! ## Configuration
//!
//! - `GEMINI_API_KEY` (or `GOOGLE_API_KEY`): API key
//! - `GEMINI_BASE_URL`: Base URL (default: <https://generativelanguage.googleapis.com/v1beta>)
//! - `LIFTSCRIBE_LLM_MODEL`: Model override (default: `gemini-2.5-flash`)
//!
//! Gemini does not assign ids to function calls, so ids are synthesized as
//! `{name}_{index}` and mapped back to function names when results are sent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
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

const SERVICE: &str = "Gemini";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Part of content (text, function call, or function response)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    #[serde(rename = "modelVersion")]
    model_version: Option<String>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Configuration for the Gemini provider
#[derive(Clone)]
pub struct GeminiConfig {
    /// Base URL for the API
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Default model to use
    pub default_model: String,
    /// Bound on each call
    pub request_timeout: Duration,
}

impl GeminiConfig {
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

impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Google Gemini LLM provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GeminiConfig) -> AppResult<Self> {
        let client = create_client_with_timeout(
            config.request_timeout,
            Duration::from_secs(defaults::LLM_CONNECT_TIMEOUT_SECS),
        )?;
        info!(model = %config.default_model, "Initializing Gemini provider");
        Ok(Self { client, config })
    }

    /// Convert our message role to Gemini's role format
    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::Assistant => "model",
            MessageRole::System | MessageRole::User | MessageRole::Tool => "user",
        }
    }

    /// Convert chat messages to Gemini contents
    ///
    /// System messages are carried by `system_instruction`. Consecutive tool
    /// results collapse into one user turn of `functionResponse` parts.
    fn convert_messages(messages: &[ChatMessage]) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = Vec::new();
        for message in messages {
            match message.role {
                MessageRole::System => {}
                MessageRole::Tool => {
                    let part = ContentPart::FunctionResponse {
                        function_response: FunctionResponse {
                            name: message.name.clone().unwrap_or_default(),
                            response: json!({ "result": message.content }),
                        },
                    };
                    match contents.last_mut() {
                        Some(last)
                            if last.parts.iter().all(|p| {
                                matches!(p, ContentPart::FunctionResponse { .. })
                            }) && !last.parts.is_empty() =>
                        {
                            last.parts.push(part);
                        }
                        _ => contents.push(GeminiContent {
                            role: Some(Self::convert_role(MessageRole::Tool).to_owned()),
                            parts: vec![part],
                        }),
                    }
                }
                role => {
                    let mut parts = Vec::with_capacity(message.tool_calls.len() + 1);
                    if !message.content.is_empty() {
                        parts.push(ContentPart::Text {
                            text: message.content.clone(),
                        });
                    }
                    parts.extend(message.tool_calls.iter().map(|call| ContentPart::FunctionCall {
                        function_call: FunctionCall {
                            name: call.name.clone(),
                            args: call.parsed_arguments(),
                        },
                    }));
                    contents.push(GeminiContent {
                        role: Some(Self::convert_role(role).to_owned()),
                        parts,
                    });
                }
            }
        }
        contents
    }

    fn build_tool_config(choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => json!({"function_calling_config": {"mode": "AUTO"}}),
            ToolChoice::None => json!({"function_calling_config": {"mode": "NONE"}}),
            ToolChoice::Forced(name) => json!({
                "function_calling_config": {"mode": "ANY", "allowed_function_names": [name]}
            }),
        }
    }

    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let json_mode = request.response_format == ResponseFormat::Json;
        let generation_config =
            (request.temperature.is_some() || request.max_tokens.is_some() || json_mode).then(
                || GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_tokens,
                    response_mime_type: json_mode.then_some("application/json"),
                },
            );

        let has_tools = request.has_tools();
        GeminiRequest {
            contents: Self::convert_messages(&request.messages),
            system_instruction: request.system_prompt().map(|text| GeminiContent {
                role: None,
                parts: vec![ContentPart::Text { text }],
            }),
            generation_config,
            tools: has_tools.then(|| {
                vec![GeminiTool {
                    function_declarations: request
                        .tools
                        .iter()
                        .map(|tool| FunctionDeclaration {
                            name: tool.name.clone(),
                            description: tool.description.clone(),
                            parameters: tool.parameters.clone(),
                        })
                        .collect(),
                }]
            }),
            tool_config: has_tools.then(|| Self::build_tool_config(&request.tool_choice)),
        }
    }

    fn convert_candidate(candidate: GeminiCandidate) -> Candidate {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            match part {
                ContentPart::Text { text: t } => text.push_str(&t),
                ContentPart::FunctionCall { function_call } => {
                    let index = tool_calls.len();
                    tool_calls.push(ToolCall {
                        id: format!("{}_{index}", function_call.name),
                        name: function_call.name,
                        arguments: function_call.args.to_string(),
                    });
                }
                ContentPart::FunctionResponse { .. } | ContentPart::Other(_) => {}
            }
        }
        Candidate {
            content: (!text.is_empty()).then_some(text),
            tool_calls,
            finish_reason: candidate.finish_reason,
        }
    }

    fn convert_usage(metadata: &UsageMetadata) -> TokenUsage {
        TokenUsage {
            prompt_tokens: metadata.prompt.unwrap_or(0),
            completion_tokens: metadata.candidates.unwrap_or(0),
            total_tokens: metadata.total.unwrap_or(0),
        }
    }

    fn map_api_error(status: reqwest::StatusCode, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);
        map_status_error(SERVICE, status, &message)
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let url = format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );
        let body = Self::build_gemini_request(request);
        debug!(contents = body.contents.len(), "Sending request to Gemini API");

        let http_request = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body);
        let (status, text) = send_for_body(SERVICE, http_request).await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status, &text));
        }

        let response: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to decode Gemini response");
            AppError::external_service(SERVICE, format!("invalid response payload: {e}"))
                .with_source(e)
        })?;

        if let Some(error) = response.error {
            return Err(AppError::external_service(SERVICE, error.message));
        }

        Ok(ChatResponse {
            candidates: response
                .candidates
                .unwrap_or_default()
                .into_iter()
                .map(Self::convert_candidate)
                .collect(),
            model: response.model_version.unwrap_or_else(|| model.to_owned()),
            usage: response.usage_metadata.as_ref().map(Self::convert_usage),
        })
    }
}
