// ABOUTME: Unified LLM provider selector built from resolved startup settings
// ABOUTME: Wraps the OpenAI-compatible, Anthropic, Gemini and custom HTTP backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Selector
//!
//! The set of backends is closed; [`ChatProvider`] dispatches to the one
//! selected by [`LlmSettings`] at startup.
//!
//! ## Example
//!
//! ```rust,no_run
//! use liftscribe::config::LlmSettings;
//! use liftscribe::llm::{ChatMessage, ChatProvider, ChatRequest, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), liftscribe::errors::AppError> {
//!     if let Some(settings) = LlmSettings::from_env()? {
//!         let provider = ChatProvider::from_settings(&settings)?;
//!         let request = ChatRequest::new(vec![ChatMessage::user("Hello!")]);
//!         let response = provider.complete(&request).await?;
//!         println!("{:?}", response.text());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use tracing::info;

use super::anthropic::AnthropicConfig;
use super::custom_http::CustomHttpConfig;
use super::gemini::GeminiConfig;
use super::openai_compatible::OpenAiCompatibleConfig;
use super::{
    AnthropicProvider, ChatRequest, ChatResponse, CustomHttpProvider, GeminiProvider,
    LlmCapabilities, LlmProvider, OpenAiCompatibleProvider,
};
use crate::config::{LlmProviderType, LlmSettings};
use crate::errors::{AppError, AppResult};

/// Unified chat provider over the supported backends
pub enum ChatProvider {
    /// `OpenAI` chat completions or a compatible endpoint
    OpenAiCompatible(OpenAiCompatibleProvider),
    /// Anthropic messages API
    Anthropic(AnthropicProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
    /// Normalized JSON over a custom endpoint
    CustomHttp(CustomHttpProvider),
}

impl ChatProvider {
    /// Build the backend described by resolved settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the backend's credential is missing,
    /// or if its HTTP client cannot be created.
    pub fn from_settings(settings: &LlmSettings) -> AppResult<Self> {
        let provider = match settings.provider {
            LlmProviderType::OpenAi => {
                let mut config = OpenAiCompatibleConfig {
                    api_key: settings.api_key.clone(),
                    request_timeout: settings.request_timeout,
                    ..OpenAiCompatibleConfig::default()
                };
                if let Some(base_url) = &settings.base_url {
                    config.base_url.clone_from(base_url);
                }
                if let Some(model) = &settings.model {
                    config.default_model.clone_from(model);
                }
                Self::OpenAiCompatible(OpenAiCompatibleProvider::new(config)?)
            }
            LlmProviderType::Anthropic => {
                let mut config = AnthropicConfig::new(Self::require_key(settings)?);
                config.request_timeout = settings.request_timeout;
                if let Some(base_url) = &settings.base_url {
                    config.base_url.clone_from(base_url);
                }
                if let Some(model) = &settings.model {
                    config.default_model.clone_from(model);
                }
                Self::Anthropic(AnthropicProvider::new(config)?)
            }
            LlmProviderType::Gemini => {
                let mut config = GeminiConfig::new(Self::require_key(settings)?);
                config.request_timeout = settings.request_timeout;
                if let Some(base_url) = &settings.base_url {
                    config.base_url.clone_from(base_url);
                }
                if let Some(model) = &settings.model {
                    config.default_model.clone_from(model);
                }
                Self::Gemini(GeminiProvider::new(config)?)
            }
            LlmProviderType::Custom => {
                let url = settings.base_url.clone().ok_or_else(|| {
                    AppError::config("custom LLM provider selected without an endpoint URL")
                })?;
                let mut config = CustomHttpConfig::new(url);
                config.api_key.clone_from(&settings.api_key);
                config.request_timeout = settings.request_timeout;
                if let Some(model) = &settings.model {
                    config.default_model.clone_from(model);
                }
                Self::CustomHttp(CustomHttpProvider::new(config)?)
            }
        };

        info!(
            provider = provider.display_name(),
            model = provider.default_model(),
            "LLM provider initialized"
        );
        Ok(provider)
    }

    fn require_key(settings: &LlmSettings) -> AppResult<String> {
        settings.api_key.clone().ok_or_else(|| {
            AppError::config(format!("{} provider selected without an API key", settings.provider))
        })
    }

    /// Get the provider type
    #[must_use]
    pub const fn provider_type(&self) -> LlmProviderType {
        match self {
            Self::OpenAiCompatible(_) => LlmProviderType::OpenAi,
            Self::Anthropic(_) => LlmProviderType::Anthropic,
            Self::Gemini(_) => LlmProviderType::Gemini,
            Self::CustomHttp(_) => LlmProviderType::Custom,
        }
    }
}

impl fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAiCompatible(p) => f.debug_tuple("ChatProvider::OpenAiCompatible").field(p).finish(),
            Self::Anthropic(p) => f.debug_tuple("ChatProvider::Anthropic").field(p).finish(),
            Self::Gemini(p) => f.debug_tuple("ChatProvider::Gemini").field(p).finish(),
            Self::CustomHttp(p) => f.debug_tuple("ChatProvider::CustomHttp").field(p).finish(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible(p) => p.name(),
            Self::Anthropic(p) => p.name(),
            Self::Gemini(p) => p.name(),
            Self::CustomHttp(p) => p.name(),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible(p) => p.display_name(),
            Self::Anthropic(p) => p.display_name(),
            Self::Gemini(p) => p.display_name(),
            Self::CustomHttp(p) => p.display_name(),
        }
    }

    fn capabilities(&self) -> LlmCapabilities {
        match self {
            Self::OpenAiCompatible(p) => p.capabilities(),
            Self::Anthropic(p) => p.capabilities(),
            Self::Gemini(p) => p.capabilities(),
            Self::CustomHttp(p) => p.capabilities(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::OpenAiCompatible(p) => p.default_model(),
            Self::Anthropic(p) => p.default_model(),
            Self::Gemini(p) => p.default_model(),
            Self::CustomHttp(p) => p.default_model(),
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        match self {
            Self::OpenAiCompatible(p) => p.complete(request).await,
            Self::Anthropic(p) => p.complete(request).await,
            Self::Gemini(p) => p.complete(request).await,
            Self::CustomHttp(p) => p.complete(request).await,
        }
    }
}
