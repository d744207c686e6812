// ABOUTME: Injected model client used by every pipeline component
// ABOUTME: Holds the resolved provider, or none, in which case each call fails fast
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{CallOptions, ChatMessage, ChatProvider, ChatRequest, ChatResponse, LlmProvider};
use crate::config::LlmSettings;
use crate::errors::{AppError, AppResult};

/// Handle to the configured language model
///
/// Cheap to clone; the provider is shared read-only.
#[derive(Clone)]
pub struct LlmClient {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl LlmClient {
    /// Wrap a provider (or its absence)
    #[must_use]
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    /// Wrap a concrete provider
    #[must_use]
    pub fn with_provider(provider: impl LlmProvider + 'static) -> Self {
        Self::new(Some(Arc::new(provider)))
    }

    /// A client with no provider; every call fails with a configuration error
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    /// Build from resolved settings; `None` yields an unavailable client
    ///
    /// # Errors
    ///
    /// Returns an error if the selected backend cannot be constructed.
    pub fn from_settings(settings: Option<&LlmSettings>) -> AppResult<Self> {
        match settings {
            Some(settings) => {
                let provider = ChatProvider::from_settings(settings)?;
                Ok(Self::with_provider(provider))
            }
            None => {
                warn!("LLM client created without a provider");
                Ok(Self::unavailable())
            }
        }
    }

    /// Whether a provider is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Name of the configured provider
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Send one request to the configured provider
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when no provider is configured, otherwise any
    /// provider error from the backend.
    #[instrument(skip(self, messages, options), fields(provider = self.provider_name().unwrap_or("none")))]
    pub async fn call(
        &self,
        messages: Vec<ChatMessage>,
        options: CallOptions,
    ) -> AppResult<ChatResponse> {
        let Some(provider) = &self.provider else {
            return Err(AppError::not_configured());
        };
        let request = ChatRequest::from_options(messages, options);
        debug!(
            messages = request.messages.len(),
            tools = request.tools.len(),
            format = ?request.response_format,
            "Calling language model"
        );
        provider.complete(&request).await
    }
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("provider", &self.provider_name())
            .finish()
    }
}
