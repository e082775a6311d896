// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding
//!
//! Domain interface for embedding providers.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-Corruption Layer over the external embedding model

use async_trait::async_trait;

/// Turns text into a fixed-dimension vector.
///
/// Implementations must return vectors of the same dimension for every call
/// made on one instance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Embedding timed out after {0} ms")]
    Timeout(u64),

    #[error("Embedding has dimension {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider returned an empty embedding")]
    Empty,
}
