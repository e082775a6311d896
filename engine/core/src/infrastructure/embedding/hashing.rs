// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Hashing Embedding Client
//!
//! Deterministic offline embedder for development, tests and air-gapped use.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Feature-hashes lowercase word tokens into a fixed number of
//!   buckets and L2-normalizes the counts, so texts sharing words land close
//!   together. Stable across processes (FNV-1a, no random seed).

use async_trait::async_trait;

use crate::domain::embedding::{EmbeddingError, EmbeddingProvider};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbeddingClient {
    dimension: usize,
    /// `hashing-<dimension>`; different dimensions are different models
    model: String,
}

impl HashingEmbeddingClient {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hashing-{}", dimension),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Synchronous core, shared with tests
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(&token.to_lowercase()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn fnv1a(token: &str) -> u64 {
    token
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

impl Default for HashingEmbeddingClient {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_text(text))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
