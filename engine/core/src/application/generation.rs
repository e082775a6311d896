// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Feedback-Aware Generation - Application Layer
//!
//! Orchestrates the learning loop: retrieve relevant feedback, compose the
//! prompt, call the generation model, and record new feedback.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** The engine's public operations. Generation paths are pure
//!   read + compute + call; only `submit_feedback` writes.
//!
//! Every generation request makes at most one call to the generation model.
//! Retries are left to the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::application::resource_cache::ResourceCache;
use crate::domain::config::GhostwriterConfig;
use crate::domain::errors::GhostwriterError;
use crate::domain::events::LearningEvent;
use crate::domain::feedback::{FeedbackId, FeedbackKind, FeedbackRecord, FeedbackSummary, NewFeedback};
use crate::domain::llm::{FinishReason, GenerationOptions, LLMError};
use crate::domain::patterns::{AggregatedPatterns, PatternAggregator};
use crate::domain::profile::ProfileName;
use crate::domain::prompt::PromptComposer;
use crate::domain::style::StyleExampleSource;

/// Lifecycle of a single generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Composing,
    Generating,
    Done,
    Failed,
}

impl GenerationPhase {
    pub fn can_transition_to(self, next: GenerationPhase) -> bool {
        use GenerationPhase::*;
        matches!(
            (self, next),
            (Idle, Composing) | (Composing, Generating) | (Generating, Done) | (Generating, Failed)
        )
    }
}

/// Per-request phase tracker; transitions are logged
struct GenerationRun<'a> {
    profile: &'a ProfileName,
    operation: &'static str,
    phase: GenerationPhase,
}

impl<'a> GenerationRun<'a> {
    fn start(profile: &'a ProfileName, operation: &'static str) -> Self {
        Self {
            profile,
            operation,
            phase: GenerationPhase::Idle,
        }
    }

    fn advance(&mut self, next: GenerationPhase) {
        debug_assert!(self.phase.can_transition_to(next), "{:?} -> {:?}", self.phase, next);
        debug!(
            profile = %self.profile,
            operation = self.operation,
            from = ?self.phase,
            to = ?next,
            "Generation phase"
        );
        self.phase = next;
    }
}

/// A prompt ready to send, with the patterns that went into it
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub patterns: AggregatedPatterns,
    pub style_examples: usize,
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub pattern_cap: usize,
    pub relevant_limit: usize,
    pub recent_limit: usize,
    pub generation_timeout: Duration,
    pub options: GenerationOptions,
}

impl GeneratorSettings {
    pub fn from_config(config: &GhostwriterConfig) -> Self {
        Self {
            pattern_cap: config.retrieval.pattern_cap,
            relevant_limit: config.retrieval.relevant_limit,
            recent_limit: config.retrieval.recent_limit,
            generation_timeout: config.timeouts.generation(),
            options: GenerationOptions {
                max_tokens: Some(config.generation.max_tokens),
                temperature: Some(config.generation.temperature),
                stop_sequences: None,
            },
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&GhostwriterConfig::default())
    }
}

pub struct FeedbackAwareGenerator {
    cache: Arc<ResourceCache>,
    style_source: Arc<dyn StyleExampleSource>,
    aggregator: PatternAggregator,
    composer: PromptComposer,
    settings: GeneratorSettings,
}

impl FeedbackAwareGenerator {
    pub fn new(
        cache: Arc<ResourceCache>,
        style_source: Arc<dyn StyleExampleSource>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            cache,
            style_source,
            aggregator: PatternAggregator::new(settings.pattern_cap),
            composer: PromptComposer::new(),
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Build the generation prompt without calling the model
    pub async fn prepare_prompt(
        &self,
        profile: &ProfileName,
        context: &str,
        instruction: &str,
    ) -> Result<PreparedPrompt, GhostwriterError> {
        let store = self.cache.get_store(profile).await?;
        let relevant = store
            .query_relevant_by_kind(context, self.aggregator.cap())
            .await?;
        let patterns = self
            .aggregator
            .aggregate(&relevant.positive, &relevant.negative, &relevant.refinement);

        let style_examples = self.style_source.load_style_examples(profile).await?;
        let prompt = self
            .composer
            .compose(&style_examples, context, instruction, &patterns);

        debug!(
            profile = %profile,
            patterns = patterns.len(),
            style_examples = style_examples.len(),
            "Prompt composed"
        );

        Ok(PreparedPrompt {
            prompt,
            patterns,
            style_examples: style_examples.len(),
        })
    }

    /// Generate a post informed by relevant past feedback. Writes nothing.
    pub async fn generate(
        &self,
        profile: &ProfileName,
        context: &str,
        instruction: &str,
    ) -> Result<String, GhostwriterError> {
        self.generate_for(profile, context, instruction, "generate").await
    }

    /// Same as [`FeedbackAwareGenerator::generate`]. Feedback whose
    /// submission returned before this call is always taken into account.
    pub async fn regenerate(
        &self,
        profile: &ProfileName,
        context: &str,
        instruction: &str,
    ) -> Result<String, GhostwriterError> {
        self.generate_for(profile, context, instruction, "regenerate").await
    }

    async fn generate_for(
        &self,
        profile: &ProfileName,
        context: &str,
        instruction: &str,
        operation: &'static str,
    ) -> Result<String, GhostwriterError> {
        let mut run = GenerationRun::start(profile, operation);

        run.advance(GenerationPhase::Composing);
        let prepared = self.prepare_prompt(profile, context, instruction).await?;

        run.advance(GenerationPhase::Generating);
        let text = self.call_model(&mut run, &prepared.prompt).await?;

        info!(profile = %profile, operation, patterns = prepared.patterns.len(), "Post generated");
        self.cache.event_bus().publish(LearningEvent::PostGenerated {
            profile: profile.slug(),
            pattern_count: prepared.patterns.len(),
            timestamp: Utc::now(),
        });

        Ok(text.trim().to_string())
    }

    /// One-shot rewrite of `original_post`. Does not read or write feedback;
    /// the model output is returned as is.
    pub async fn refine(
        &self,
        profile: &ProfileName,
        original_post: &str,
        feedback_text: &str,
        context: &str,
    ) -> Result<String, GhostwriterError> {
        let mut run = GenerationRun::start(profile, "refine");

        run.advance(GenerationPhase::Composing);
        let prompt = self
            .composer
            .compose_refinement(original_post, feedback_text, context);

        run.advance(GenerationPhase::Generating);
        let text = self.call_model(&mut run, &prompt).await?;

        self.cache.event_bus().publish(LearningEvent::PostRefined {
            profile: profile.slug(),
            timestamp: Utc::now(),
        });

        Ok(text)
    }

    async fn call_model(&self, run: &mut GenerationRun<'_>, prompt: &str) -> Result<String, GhostwriterError> {
        let result = match self.cache.get_generation_provider().await {
            Ok(provider) => {
                let timeout = self.settings.generation_timeout;
                match tokio::time::timeout(timeout, provider.generate(prompt, &self.settings.options)).await {
                    Ok(Ok(response)) => {
                        debug!(
                            profile = %run.profile,
                            provider = %response.provider,
                            model = %response.model,
                            prompt_tokens = response.usage.prompt_tokens,
                            completion_tokens = response.usage.completion_tokens,
                            "Model responded"
                        );
                        if response.finish_reason != FinishReason::Stop {
                            warn!(
                                profile = %run.profile,
                                finish_reason = ?response.finish_reason,
                                "Generated post may be cut short"
                            );
                        }
                        Ok(response.text)
                    }
                    Ok(Err(e)) => Err(GhostwriterError::Generation(e)),
                    Err(_) => Err(GhostwriterError::Generation(LLMError::Timeout(
                        timeout.as_millis() as u64,
                    ))),
                }
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => {
                run.advance(GenerationPhase::Done);
                metrics::counter!("ghostwriter_generations_total", "operation" => run.operation, "outcome" => "success")
                    .increment(1);
                Ok(text)
            }
            Err(e) => {
                run.advance(GenerationPhase::Failed);
                metrics::counter!("ghostwriter_generations_total", "operation" => run.operation, "outcome" => "failure")
                    .increment(1);
                warn!(profile = %run.profile, operation = run.operation, error = %e, "Generation failed");
                self.cache.event_bus().publish(LearningEvent::GenerationFailed {
                    profile: run.profile.slug(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Validate and durably record feedback. Does not trigger generation.
    pub async fn submit_feedback(&self, submission: NewFeedback) -> Result<FeedbackId, GhostwriterError> {
        let record = FeedbackRecord::from_submission(submission)?;
        let id = record.id();
        let store = self.cache.get_store(record.profile_name()).await?;
        store.append(record).await?;
        Ok(id)
    }

    pub async fn feedback_summary(&self, profile: &ProfileName) -> Result<FeedbackSummary, GhostwriterError> {
        let store = self.cache.get_store(profile).await?;
        Ok(store.summary(self.settings.recent_limit).await)
    }

    /// Stored feedback most similar to `context`, limited to the configured
    /// relevant limit
    pub async fn relevant_feedback(
        &self,
        profile: &ProfileName,
        context: &str,
        kind: Option<FeedbackKind>,
    ) -> Result<Vec<FeedbackRecord>, GhostwriterError> {
        let store = self.cache.get_store(profile).await?;
        store
            .query_relevant(context, kind, self.settings.relevant_limit)
            .await
    }
}
