// ABOUTME: System prompts for the normalizer, parser and validator loaded at compile time
// ABOUTME: Prompts live in markdown files next to this module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Unit normalization instructions, including when to call conversion tools
pub const NORMALIZER_SYSTEM_PROMPT: &str = include_str!("normalizer.md");

/// Workout extraction instructions: schema, naming rules and synonym table
pub const PARSER_SYSTEM_PROMPT: &str = include_str!("parser.md");

/// Workout/non-workout classification instructions
pub const VALIDATOR_SYSTEM_PROMPT: &str = include_str!("validator.md");
