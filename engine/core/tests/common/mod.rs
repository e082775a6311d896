// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mock ports shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ghostwriter_core::application::{
    FeedbackAwareGenerator, GeneratorSettings, ProviderFactory, ResourceCache,
};
use ghostwriter_core::domain::embedding::{EmbeddingError, EmbeddingProvider};
use ghostwriter_core::domain::feedback::NewFeedback;
use ghostwriter_core::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, LLMProvider, TokenUsage,
};
use ghostwriter_core::domain::style::StyleExampleSource;
use ghostwriter_core::infrastructure::embedding::HashingEmbeddingClient;
use ghostwriter_core::infrastructure::EventBus;
use ghostwriter_core::{GhostwriterError, ProfileName};

/// Records every prompt and answers with a fixed reply
pub struct RecordingLLM {
    reply: String,
    delay: Option<Duration>,
    failing: AtomicBool,
    prompts: Mutex<Vec<String>>,
}

impl RecordingLLM {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: None,
            failing: AtomicBool::new(false),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(reply)
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for RecordingLLM {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(LLMError::Provider("model crashed".to_string()));
        }
        Ok(GenerationResponse {
            text: self.reply.clone(),
            usage: TokenUsage::default(),
            provider: "mock".to_string(),
            model: "mock".to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        Ok(())
    }
}

/// Hashing embedder with an optional artificial delay
pub struct TestEmbedder {
    inner: HashingEmbeddingClient,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl TestEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashingEmbeddingClient::new(256),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for TestEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.inner.embed_text(text))
    }

    fn model(&self) -> &str {
        "test-hashing"
    }
}

/// Hands out fixed providers and counts how often it was asked
pub struct MockFactory {
    pub embedder: Arc<TestEmbedder>,
    pub llm: Arc<RecordingLLM>,
    pub embedding_builds: AtomicUsize,
    pub generation_builds: AtomicUsize,
    /// Number of initial embedding builds that fail
    pub failing_builds: AtomicUsize,
    pub build_delay: Duration,
}

impl MockFactory {
    pub fn new(embedder: TestEmbedder, llm: RecordingLLM) -> Self {
        Self {
            embedder: Arc::new(embedder),
            llm: Arc::new(llm),
            embedding_builds: AtomicUsize::new(0),
            generation_builds: AtomicUsize::new(0),
            failing_builds: AtomicUsize::new(0),
            build_delay: Duration::from_millis(0),
        }
    }
}

#[async_trait]
impl ProviderFactory for MockFactory {
    async fn create_embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, GhostwriterError> {
        self.embedding_builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.build_delay).await;

        let remaining = self.failing_builds.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_builds.store(remaining - 1, Ordering::SeqCst);
            return Err(EmbeddingError::Network("embedding server down".to_string()).into());
        }
        let embedder: Arc<dyn EmbeddingProvider> = self.embedder.clone();
        Ok(embedder)
    }

    async fn create_generation_provider(&self) -> Result<Arc<dyn LLMProvider>, GhostwriterError> {
        self.generation_builds.fetch_add(1, Ordering::SeqCst);
        let llm: Arc<dyn LLMProvider> = self.llm.clone();
        Ok(llm)
    }
}

/// Same samples for every profile
pub struct StaticStyleSource(pub Vec<String>);

#[async_trait]
impl StyleExampleSource for StaticStyleSource {
    async fn load_style_examples(&self, _profile: &ProfileName) -> Result<Vec<String>, GhostwriterError> {
        Ok(self.0.clone())
    }
}

pub struct Harness {
    pub factory: Arc<MockFactory>,
    pub cache: Arc<ResourceCache>,
    pub generator: Arc<FeedbackAwareGenerator>,
    pub event_bus: EventBus,
}

pub fn harness(dir: &Path, factory: MockFactory) -> Harness {
    harness_with(dir, factory, Duration::from_secs(5), GeneratorSettings::default())
}

pub fn harness_with(
    dir: &Path,
    factory: MockFactory,
    embedding_timeout: Duration,
    settings: GeneratorSettings,
) -> Harness {
    let factory = Arc::new(factory);
    let event_bus = EventBus::default();
    let cache = Arc::new(ResourceCache::new(
        factory.clone(),
        dir.join("feedback"),
        embedding_timeout,
        event_bus.clone(),
    ));
    let style = Arc::new(StaticStyleSource(vec![
        "Shipped my first side project today. Small, scrappy, mine.".to_string(),
        "Three things a year of remote work taught me.".to_string(),
    ]));
    let generator = Arc::new(FeedbackAwareGenerator::new(cache.clone(), style, settings));

    Harness {
        factory,
        cache,
        generator,
        event_bus,
    }
}

pub fn default_factory() -> MockFactory {
    MockFactory::new(TestEmbedder::new(), RecordingLLM::new("  A generated post.\n"))
}

pub fn feedback(profile: &str, context: &str, kind: &str, text: &str) -> NewFeedback {
    NewFeedback {
        profile: profile.to_string(),
        context: context.to_string(),
        instruction: String::new(),
        generated_post: format!("A post about {}.", context),
        feedback_type: kind.to_string(),
        feedback_text: text.to_string(),
        refinement_instruction: None,
        approved_version: None,
    }
}

pub fn profile(name: &str) -> ProfileName {
    ProfileName::new(name).unwrap()
}
