// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Environment variable names, service identity, defaults and unit factors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module

pub mod units;

/// Service identity used in logs
pub mod service_names {
    /// Service name reported at startup
    pub const LIFTSCRIBE: &str = "liftscribe";
}

/// Environment variable names read at startup
pub mod env_vars {
    /// Explicit provider override (`openai`, `anthropic`, `gemini`, `custom`)
    pub const LLM_PROVIDER: &str = "LIFTSCRIBE_LLM_PROVIDER";
    /// Model override applied to whichever provider is selected
    pub const LLM_MODEL: &str = "LIFTSCRIBE_LLM_MODEL";
    /// Per-call timeout in seconds
    pub const LLM_TIMEOUT_SECS: &str = "LIFTSCRIBE_LLM_TIMEOUT_SECS";

    /// `OpenAI` (or compatible) API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// `OpenAI`-compatible base URL override
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Anthropic API key
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    /// Anthropic base URL override
    pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
    /// Gemini API key
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Alternate name accepted for the Gemini API key
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    /// Gemini base URL override
    pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
    /// Custom HTTP endpoint URL
    pub const CUSTOM_LLM_URL: &str = "CUSTOM_LLM_URL";
    /// Optional bearer token for the custom endpoint
    pub const CUSTOM_LLM_API_KEY: &str = "CUSTOM_LLM_API_KEY";

    /// Daily pipeline call limit per user
    pub const DAILY_LIMIT: &str = "LIFTSCRIBE_DAILY_LIMIT";
    /// Offset of the usage clock from UTC, in minutes
    pub const USAGE_UTC_OFFSET_MINUTES: &str = "LIFTSCRIBE_USAGE_UTC_OFFSET_MINUTES";
    /// Database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Enables the fixed-sample demo parser
    pub const DEMO_MODE: &str = "LIFTSCRIBE_DEMO_MODE";
}

/// Default values
pub mod defaults {
    /// Default daily pipeline call limit per user
    pub const DAILY_LIMIT: u32 = 10;
    /// Default per-call timeout for outbound model requests
    pub const LLM_TIMEOUT_SECS: u64 = 60;
    /// Connect timeout for outbound model requests
    pub const LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Default database location
    pub const DATABASE_URL: &str = "sqlite:./data/liftscribe.db";
    /// Max tokens requested from backends that require the field
    pub const MAX_OUTPUT_TOKENS: u32 = 2048;
}
