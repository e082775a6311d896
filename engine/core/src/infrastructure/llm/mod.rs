// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Generation Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the LLMProvider domain interface and an
// external text generation API.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaAdapter;
pub use openai::OpenAIAdapter;

use std::sync::Arc;

use crate::domain::config::GenerationProviderConfig;
use crate::domain::llm::LLMProvider;

/// Create a generation provider from configuration
pub fn create_generation_provider(
    config: &GenerationProviderConfig,
) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.provider_type.as_str() {
        "ollama" => Arc::new(OllamaAdapter::new(
            config.endpoint.clone(),
            config.model.clone(),
        )),
        // OpenAI-compatible APIs (LM Studio, vLLM, etc.) share the adapter.
        "openai" | "openai-compatible" => Arc::new(OpenAIAdapter::new(
            config.endpoint.clone(),
            config.resolve_api_key()?,
            config.model.clone(),
        )),
        other => anyhow::bail!("Unsupported generation provider type: {}", other),
    };

    Ok(provider)
}
