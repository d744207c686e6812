// ABOUTME: LLM provider abstraction layer for pluggable language model backends
// ABOUTME: Defines messages, call options, tool definitions and the normalized response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Service Provider Interface
//!
//! Every backend (OpenAI-compatible, Anthropic, Gemini, custom HTTP) accepts
//! the same [`ChatRequest`] and returns the same [`ChatResponse`]. Pipeline
//! components never see a backend's wire format; they talk to [`LlmClient`].
//!
//! ## Key Concepts
//!
//! - **`LlmCapabilities`**: Bitflags describing provider features
//! - **`LlmProvider`**: Async trait implemented by each backend
//! - **`ChatMessage`**: Role-based message, optionally carrying tool calls or a tool result
//! - **`CallOptions`**: Response format, tools and tool-selection policy for one call
//!
//! ## Example
//!
//! ```rust,no_run
//! use liftscribe::llm::{CallOptions, ChatMessage, LlmClient};
//! use liftscribe::errors::AppResult;
//!
//! async fn example(client: &LlmClient) -> AppResult<()> {
//!     let messages = vec![
//!         ChatMessage::system("You extract workouts."),
//!         ChatMessage::user("3x10 pushups"),
//!     ];
//!     let response = client.call(messages, CallOptions::json()).await?;
//!     println!("{:?}", response.text());
//!     Ok(())
//! }
//! ```

mod anthropic;
mod client;
mod custom_http;
mod gemini;
mod openai_compatible;
pub mod prompts;
mod provider;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use client::LlmClient;
pub use custom_http::{CustomHttpConfig, CustomHttpProvider};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::ChatProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider supports function/tool calling
        const FUNCTION_CALLING = 0b0000_0001;
        /// Provider supports a native JSON output mode
        const JSON_MODE = 0b0000_0010;
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0100;
    }
}

impl LlmCapabilities {
    /// Create capabilities for a full-featured provider
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::FUNCTION_CALLING
            .union(Self::JSON_MODE)
            .union(Self::SYSTEM_MESSAGES)
    }

    /// Check if function calling is supported
    #[must_use]
    pub const fn supports_function_calling(&self) -> bool {
        self.contains(Self::FUNCTION_CALLING)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
    /// Result of a tool invocation
    Tool,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// Tool calls requested by the assistant (assistant messages only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the tool call this message answers (tool messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this result (tool messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant message echoing the tool calls it requested
    #[must_use]
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(MessageRole::Assistant, content.unwrap_or_default())
        }
    }

    /// Result of one tool call
    #[must_use]
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call.id.clone()),
            name: Some(call.name.clone()),
            ..Self::new(MessageRole::Tool, content)
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

/// A tool the model may ask the caller to invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameters schema (JSON Schema format)
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a tool definition
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id (synthesized when the backend has none)
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments serialized as JSON text
    pub arguments: String,
}

impl ToolCall {
    /// Parse the argument payload; malformed payloads yield an empty object
    #[must_use]
    pub fn parsed_arguments(&self) -> Value {
        serde_json::from_str::<Value>(&self.arguments)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}

/// Tool-selection policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "name")]
pub enum ToolChoice {
    /// Model decides whether to call a tool
    #[default]
    Auto,
    /// Model must call the named tool
    Forced(String),
    /// Model must not call tools
    None,
}

/// Requested response format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A single JSON object
    Json,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Per-call options for [`LlmClient::call`]
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Requested response format
    pub response_format: ResponseFormat,
    /// Tools the model may invoke
    pub tools: Vec<ToolDefinition>,
    /// Tool-selection policy (ignored without tools)
    pub tool_choice: ToolChoice,
    /// Temperature for response randomness
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Model override
    pub model: Option<String>,
}

impl CallOptions {
    /// Plain text completion
    #[must_use]
    pub fn text() -> Self {
        Self::default()
    }

    /// Structured JSON completion
    #[must_use]
    pub fn json() -> Self {
        Self {
            response_format: ResponseFormat::Json,
            ..Self::default()
        }
    }

    /// Attach tools with a selection policy
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = choice;
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Configuration for a chat completion request, as seen by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Requested response format
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Tools the model may invoke
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Tool-selection policy
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
        }
    }

    /// Build a request from messages and call options
    #[must_use]
    pub fn from_options(messages: Vec<ChatMessage>, options: CallOptions) -> Self {
        Self {
            messages,
            model: options.model,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.response_format,
            tools: options.tools,
            tool_choice: options.tool_choice,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether this request carries tools
    #[must_use]
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Concatenated system instructions, if any
    #[must_use]
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// One candidate completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Text content, if any
    #[serde(default)]
    pub content: Option<String>,
    /// Tool invocations requested by the model
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason (stop, length, `tool_calls`, etc.)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Candidate holding only text
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Normalized response from any backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Candidate completions (backends usually return exactly one)
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Model used for generation
    #[serde(default)]
    pub model: String,
    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Response with a single text candidate
    #[must_use]
    pub fn from_text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate::text(content)],
            model: model.into(),
            usage: None,
        }
    }

    /// First candidate, if any
    #[must_use]
    pub fn first(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Text of the first candidate, when non-blank
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.first()
            .and_then(|c| c.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Tool calls of the first candidate
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.first().map_or(&[], |c| c.tool_calls.as_slice())
    }

    /// Check if this response contains tool calls
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
///
/// Implement this trait to add a backend. Tests implement it with scripted
/// fakes to drive the pipeline without network access.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "openai", "anthropic", "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a chat completion, with tools when the request carries them
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;
}
