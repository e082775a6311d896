// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Domain interface for text generation providers.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-Corruption Layer over the external generation model

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Writes text from a prompt. Implementations live in `infrastructure::llm`.
///
/// One call is one model invocation; adapters never retry on their own.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError>;

    /// Cheap reachability probe used by `ghostwriter config validate --check`
    async fn health_check(&self) -> Result<(), LLMError>;
}

/// Sampling settings sent with every post generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub stop_sequences: Option<Vec<String>>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: Some(1024),
            temperature: Some(0.7),
            stop_sequences: None,
        }
    }
}

/// Raw model output plus the metadata the engine logs.
/// `text` is untrimmed; callers decide how to clean it up.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub usage: TokenUsage,
    /// "ollama", "openai", ...
    pub provider: String,
    pub model: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Anything other than `Stop` means the post is probably incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// Generation failures. Surfaced to callers as `GhostwriterError::Generation`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Generation timed out after {0} ms")]
    Timeout(u64),
}
