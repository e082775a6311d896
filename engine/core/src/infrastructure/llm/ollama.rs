// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama Generation Adapter
//
// Anti-Corruption Layer for local Ollama models (default: llama3:8b).

use crate::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, LLMProvider, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub struct OllamaAdapter {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    eval_count: Option<u32>,
    prompt_eval_count: Option<u32>,
}

impl OllamaAdapter {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LLMProvider for OllamaAdapter {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Some(OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens.map(|t| t as i32),
                stop: options.stop_sequences.clone(),
            }),
        };

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 404 {
                LLMError::ModelNotFound(self.model.clone())
            } else {
                LLMError::Provider(format!("HTTP {}: {}", status, error_text))
            });
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse response: {}", e)))?;

        let prompt_tokens = body.prompt_eval_count.unwrap_or(0);
        let completion_tokens = body.eval_count.unwrap_or(0);
        let finish_reason = match (body.done, body.done_reason.as_deref()) {
            (_, Some("length")) | (false, _) => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        Ok(GenerationResponse {
            text: body.response,
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            provider: "ollama".to_string(),
            model: self.model.clone(),
            finish_reason,
        })
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        // Listing local models proves the server is up.
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LLMError::Network(format!("HTTP {}", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"llama3:8b","stream":false}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"today i learned.","done":true,"eval_count":4,"prompt_eval_count":10}"#)
            .create_async()
            .await;

        let adapter = OllamaAdapter::new(server.url(), "llama3:8b".to_string());
        let response = adapter
            .generate("write a post", &GenerationOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "today i learned.");
        assert_eq!(response.usage.total_tokens, 14);
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.provider, "ollama");
    }

    #[tokio::test]
    async fn test_missing_model() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body("model not found")
            .create_async()
            .await;

        let adapter = OllamaAdapter::new(server.url(), "nope".to_string());
        let err = adapter
            .generate("write a post", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::ModelNotFound(model) if model == "nope"));
    }
}
