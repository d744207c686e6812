// ABOUTME: Configuration management module for provider selection, usage limits and storage
// ABOUTME: Environment-only configuration resolved once at process start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for LiftScribe
//!
//! - **Types**: Runtime environment, provider type and credential-precedence resolution
//! - **Environment**: The complete application configuration read from the process environment

/// Environment and application configuration
pub mod environment;
/// Provider and environment type definitions
pub mod types;

pub use environment::{AppConfig, DatabaseConfig, UsageLimitConfig};
pub use types::{Environment, LlmProviderType, LlmSettings};
