// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ollama Embedding Client
//!
//! Generates semantic embeddings through a local Ollama server.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements the embedding port over `/api/embeddings`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::{EmbeddingError, EmbeddingProvider};

pub struct OllamaEmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingClient {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider(format!("HTTP {}: {}", status, error_text)));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Provider(format!("Failed to parse response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(EmbeddingError::Empty);
        }

        Ok(body.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embeddings")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"llama3:8b","prompt":"failed interview"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":[0.25,-0.5,1.0]}"#)
            .create_async()
            .await;

        let client = OllamaEmbeddingClient::new(server.url(), "llama3:8b".to_string());
        let embedding = client.embed("failed interview").await.unwrap();

        mock.assert_async().await;
        assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_empty_embedding_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_body(r#"{"embedding":[]}"#)
            .create_async()
            .await;

        let client = OllamaEmbeddingClient::new(server.url(), "llama3:8b".to_string());
        assert!(matches!(client.embed("x").await, Err(EmbeddingError::Empty)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = OllamaEmbeddingClient::new(server.url(), "llama3:8b".to_string());
        assert!(matches!(client.embed("x").await, Err(EmbeddingError::Provider(_))));
    }
}
