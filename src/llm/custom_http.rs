// ABOUTME: Custom HTTP provider that forwards normalized requests to a user-supplied endpoint
// ABOUTME: The endpoint receives ChatRequest JSON and must answer with ChatResponse JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Custom HTTP Provider
//!
//! For gateways and self-hosted adapters that do not speak a vendor wire
//! format. The request body is the serialized [`ChatRequest`]; the response
//! body must deserialize into [`ChatResponse`].
//!
//! ## Configuration
//!
//! - `CUSTOM_LLM_URL`: Endpoint URL
//! - `CUSTOM_LLM_API_KEY`: Optional bearer token

use async_trait::async_trait;
use reqwest::Client;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::{create_client_with_timeout, map_status_error, send_for_body};

const SERVICE: &str = "CustomLLM";

/// Model name reported when neither request nor config names one
const DEFAULT_MODEL: &str = "custom";

/// Configuration for the custom HTTP provider
#[derive(Clone)]
pub struct CustomHttpConfig {
    /// Endpoint receiving the normalized request
    pub url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Model name forwarded in the request
    pub default_model: String,
    /// Bound on each call
    pub request_timeout: Duration,
}

impl CustomHttpConfig {
    /// Configuration for an endpoint URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_owned(),
            request_timeout: Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        }
    }
}

impl Debug for CustomHttpConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CustomHttpConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Provider posting normalized JSON to a configured endpoint
pub struct CustomHttpProvider {
    client: Client,
    config: CustomHttpConfig,
}

impl CustomHttpProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: CustomHttpConfig) -> AppResult<Self> {
        let client = create_client_with_timeout(
            config.request_timeout,
            Duration::from_secs(defaults::LLM_CONNECT_TIMEOUT_SECS),
        )?;
        info!(url = %config.url, "Initializing custom HTTP provider");
        Ok(Self { client, config })
    }
}

impl Debug for CustomHttpProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CustomHttpProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for CustomHttpProvider {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn display_name(&self) -> &'static str {
        "Custom HTTP"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(url = %self.config.url))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let mut outbound = request.clone();
        if outbound.model.is_none() {
            outbound.model = Some(self.config.default_model.clone());
        }
        debug!(messages = outbound.messages.len(), "Forwarding normalized request");

        let mut http_request = self.client.post(&self.config.url).json(&outbound);
        if let Some(ref api_key) = self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }
        let (status, body) = send_for_body(SERVICE, http_request).await?;

        if !status.is_success() {
            error!(status = %status, "Custom LLM endpoint error");
            return Err(map_status_error(SERVICE, status, &body));
        }

        serde_json::from_str::<ChatResponse>(&body).map_err(|e| {
            error!(error = %e, "Custom LLM endpoint returned an unexpected payload");
            AppError::external_service(SERVICE, format!("invalid response payload: {e}"))
                .with_source(e)
        })
    }
}
