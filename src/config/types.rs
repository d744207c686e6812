// ABOUTME: Core configuration type definitions for provider selection and runtime environment
// ABOUTME: Contains Environment, LlmProviderType and the credential-precedence LlmSettings resolver
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};

/// Environment type for logging and runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment (default)
    #[default]
    Development,
    /// Production environment
    Production,
    /// Testing environment for automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// `OpenAI` chat completions API or any compatible endpoint
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini generative language API
    Gemini,
    /// Custom HTTP endpoint speaking the crate's normalized request/response JSON
    Custom,
}

impl LlmProviderType {
    /// Credential precedence: the first backend with a credential wins
    pub const PRECEDENCE: [Self; 4] = [Self::OpenAi, Self::Anthropic, Self::Gemini, Self::Custom];

    /// Parse a provider name; unknown names yield `None`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" | "openai_compatible" | "local" | "ollama" => {
                Some(Self::OpenAi)
            }
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            "custom" | "custom-http" | "http" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Environment variables that carry this backend's credential, in lookup order
    #[must_use]
    pub const fn credential_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &[env_vars::OPENAI_API_KEY],
            Self::Anthropic => &[env_vars::ANTHROPIC_API_KEY],
            Self::Gemini => &[env_vars::GEMINI_API_KEY, env_vars::GOOGLE_API_KEY],
            Self::Custom => &[env_vars::CUSTOM_LLM_URL],
        }
    }

    /// Environment variable holding a base URL override
    #[must_use]
    pub const fn base_url_env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => env_vars::OPENAI_BASE_URL,
            Self::Anthropic => env_vars::ANTHROPIC_BASE_URL,
            Self::Gemini => env_vars::GEMINI_BASE_URL,
            Self::Custom => env_vars::CUSTOM_LLM_URL,
        }
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Gemini => write!(f, "gemini"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Resolved provider settings, computed once at startup
#[derive(Clone)]
pub struct LlmSettings {
    /// Selected backend
    pub provider: LlmProviderType,
    /// API key (for `Custom`, the optional bearer token)
    pub api_key: Option<String>,
    /// Base URL override (for `Custom`, the endpoint URL)
    pub base_url: Option<String>,
    /// Model override
    pub model: Option<String>,
    /// Bound on each outbound call
    pub request_timeout: Duration,
}

impl LlmSettings {
    /// Resolve settings from the process environment
    ///
    /// Returns `Ok(None)` when no backend credential is present.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `LIFTSCRIBE_LLM_PROVIDER` names an
    /// unknown backend or a backend without its credential, or if the timeout
    /// is not a positive integer.
    pub fn from_env() -> AppResult<Option<Self>> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// See [`LlmSettings::from_env`].
    pub fn resolve<F>(lookup: F) -> AppResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let request_timeout = match get(env_vars::LLM_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AppError::config_invalid(format!(
                        "{} must be a positive integer, got '{raw}'",
                        env_vars::LLM_TIMEOUT_SECS
                    )))
                }
            },
            None => Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        };

        let credential = |provider: LlmProviderType| {
            provider
                .credential_env_vars()
                .iter()
                .find_map(|&key| get(key))
        };

        let selected = if let Some(raw) = get(env_vars::LLM_PROVIDER) {
            let provider = LlmProviderType::parse(&raw).ok_or_else(|| {
                AppError::config_invalid(format!(
                    "{} has unknown provider '{raw}'",
                    env_vars::LLM_PROVIDER
                ))
            })?;
            let value = credential(provider).ok_or_else(|| {
                AppError::config(format!(
                    "{} selects {provider} but {} is not set",
                    env_vars::LLM_PROVIDER,
                    provider.credential_env_vars().join(" / ")
                ))
            })?;
            Some((provider, value))
        } else {
            LlmProviderType::PRECEDENCE
                .into_iter()
                .find_map(|provider| credential(provider).map(|value| (provider, value)))
        };

        let Some((provider, credential_value)) = selected else {
            return Ok(None);
        };

        let (api_key, base_url) = match provider {
            LlmProviderType::Custom => (get(env_vars::CUSTOM_LLM_API_KEY), Some(credential_value)),
            other => (Some(credential_value), get(other.base_url_env_var())),
        };

        Ok(Some(Self {
            provider,
            api_key,
            base_url,
            model: get(env_vars::LLM_MODEL),
            request_timeout,
        }))
    }
}

impl Debug for LlmSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
