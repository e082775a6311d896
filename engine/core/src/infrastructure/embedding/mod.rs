// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedding provider implementations

pub mod hashing;
pub mod ollama;

pub use hashing::HashingEmbeddingClient;
pub use ollama::OllamaEmbeddingClient;

use std::sync::Arc;

use crate::domain::config::EmbeddingProviderConfig;
use crate::domain::embedding::EmbeddingProvider;

/// Create an embedding provider from configuration
pub fn create_embedding_provider(
    config: &EmbeddingProviderConfig,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider_type.as_str() {
        "ollama" => Arc::new(OllamaEmbeddingClient::new(
            config.endpoint.clone(),
            config.model.clone(),
        )),
        "hashing" => Arc::new(HashingEmbeddingClient::new(config.dimension)),
        other => anyhow::bail!("Unsupported embedding provider type: {}", other),
    };

    Ok(provider)
}
