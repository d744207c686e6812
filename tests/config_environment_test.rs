// ABOUTME: Tests for environment-driven configuration and provider selection
// ABOUTME: Covers precedence, explicit selection, limits, offsets and the provider built from settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::init_test_logging;
use liftscribe::config::{AppConfig, LlmProviderType};
use liftscribe::errors::ErrorCode;
use liftscribe::llm::{ChatProvider, LlmClient, LlmProvider};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

fn resolve(pairs: &[(&str, &str)]) -> liftscribe::errors::AppResult<AppConfig> {
    init_test_logging();
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    AppConfig::resolve(|key| map.get(key).cloned())
}

// ============================================================================
// Provider selection
// ============================================================================

#[test]
fn test_no_credentials_means_no_provider() {
    let config = resolve(&[]).unwrap();
    assert!(config.llm.is_none());
    assert!(!LlmClient::from_settings(config.llm.as_ref()).unwrap().is_available());
}

#[test]
fn test_precedence_prefers_openai() {
    let config = resolve(&[
        ("GEMINI_API_KEY", "g"),
        ("ANTHROPIC_API_KEY", "a"),
        ("OPENAI_API_KEY", "o"),
    ])
    .unwrap();
    assert_eq!(config.llm.unwrap().provider, LlmProviderType::OpenAi);
}

#[test]
fn test_explicit_selection_overrides_precedence() {
    let config = resolve(&[
        ("OPENAI_API_KEY", "o"),
        ("ANTHROPIC_API_KEY", "a"),
        ("LIFTSCRIBE_LLM_PROVIDER", "anthropic"),
        ("LIFTSCRIBE_LLM_MODEL", "claude-custom"),
    ])
    .unwrap();
    let settings = config.llm.unwrap();
    assert_eq!(settings.provider, LlmProviderType::Anthropic);
    assert_eq!(settings.api_key.as_deref(), Some("a"));

    let provider = ChatProvider::from_settings(&settings).unwrap();
    assert_eq!(provider.name(), "anthropic");
    assert_eq!(provider.default_model(), "claude-custom");
}

#[test]
fn test_explicit_selection_without_credential_fails() {
    let err = resolve(&[("LIFTSCRIBE_LLM_PROVIDER", "gemini")]).unwrap_err();
    assert_eq!(err.code.category(), ErrorCode::ConfigError.category());

    let err = resolve(&[("LIFTSCRIBE_LLM_PROVIDER", "watson"), ("OPENAI_API_KEY", "o")])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_google_key_selects_gemini() {
    let settings = resolve(&[("GOOGLE_API_KEY", "g")]).unwrap().llm.unwrap();
    assert_eq!(settings.provider, LlmProviderType::Gemini);
    assert_eq!(
        ChatProvider::from_settings(&settings).unwrap().name(),
        "gemini"
    );
}

#[test]
fn test_custom_endpoint_settings() {
    let settings = resolve(&[
        ("CUSTOM_LLM_URL", "http://localhost:9000/llm"),
        ("CUSTOM_LLM_API_KEY", "secret"),
        ("LIFTSCRIBE_LLM_TIMEOUT_SECS", "5"),
    ])
    .unwrap()
    .llm
    .unwrap();

    assert_eq!(settings.provider, LlmProviderType::Custom);
    assert_eq!(settings.base_url.as_deref(), Some("http://localhost:9000/llm"));
    assert_eq!(settings.request_timeout, Duration::from_secs(5));
    assert!(!format!("{settings:?}").contains("secret"));
}

#[test]
fn test_invalid_timeout_is_rejected() {
    let err = resolve(&[("OPENAI_API_KEY", "o"), ("LIFTSCRIBE_LLM_TIMEOUT_SECS", "0")])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

// ============================================================================
// Usage, database and demo settings
// ============================================================================

#[test]
fn test_defaults() {
    let config = resolve(&[]).unwrap();
    assert_eq!(config.usage.daily_limit, 10);
    assert_eq!(config.usage.utc_offset.local_minus_utc(), 0);
    assert_eq!(config.database.url, "sqlite:./data/liftscribe.db");
    assert!(!config.demo_mode);
}

#[test]
fn test_usage_overrides() {
    let config = resolve(&[
        ("LIFTSCRIBE_DAILY_LIMIT", "25"),
        ("LIFTSCRIBE_USAGE_UTC_OFFSET_MINUTES", "-300"),
        ("LIFTSCRIBE_DEMO_MODE", "true"),
    ])
    .unwrap();
    assert_eq!(config.usage.daily_limit, 25);
    assert_eq!(config.usage.utc_offset.local_minus_utc(), -300 * 60);
    assert!(config.demo_mode);
}

#[test]
fn test_invalid_usage_values_are_rejected() {
    for pairs in [
        [("LIFTSCRIBE_DAILY_LIMIT", "ten")],
        [("LIFTSCRIBE_DAILY_LIMIT", "-1")],
        [("LIFTSCRIBE_USAGE_UTC_OFFSET_MINUTES", "100000")],
    ] {
        let err = resolve(&pairs).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "{pairs:?}");
    }
}

// ============================================================================
// Process environment
// ============================================================================

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    init_test_logging();
    env::set_var("LIFTSCRIBE_DAILY_LIMIT", "3");
    env::set_var("ANTHROPIC_API_KEY", "from-env");
    env::remove_var("OPENAI_API_KEY");
    env::remove_var("LIFTSCRIBE_LLM_PROVIDER");

    let config = AppConfig::from_env().unwrap();

    env::remove_var("LIFTSCRIBE_DAILY_LIMIT");
    env::remove_var("ANTHROPIC_API_KEY");

    assert_eq!(config.usage.daily_limit, 3);
    assert_eq!(config.llm.unwrap().provider, LlmProviderType::Anthropic);
}
