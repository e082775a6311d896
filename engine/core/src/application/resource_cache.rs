// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource Cache - Application Layer
//!
//! Lazily constructed, process-lifetime resources: the embedding client, the
//! generation client and one feedback store per profile.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Construct-once access to expensive resources. Concrete
//!   providers come from a [`ProviderFactory`]; the default factory builds
//!   them from configuration.
//!
//! Each resource sits in a `tokio::sync::OnceCell`. Concurrent first callers
//! wait on the same initialization; a failed initialization leaves the cell
//! empty so a later call retries. Nothing is ever evicted.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::config::GhostwriterConfig;
use crate::domain::embedding::{EmbeddingError, EmbeddingProvider};
use crate::domain::errors::{GhostwriterError, StorageError};
use crate::domain::llm::{LLMError, LLMProvider};
use crate::domain::profile::ProfileName;
use crate::infrastructure::embedding::create_embedding_provider;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::feedback_store::ProfileFeedbackStore;
use crate::infrastructure::llm::create_generation_provider;

const LOG_SUFFIX: &str = "_feedback.jsonl";

/// Builds the external ports on first use
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn create_embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, GhostwriterError>;
    async fn create_generation_provider(&self) -> Result<Arc<dyn LLMProvider>, GhostwriterError>;
}

/// Builds providers from the `embedding` and `generation` config sections
pub struct ConfigProviderFactory {
    config: GhostwriterConfig,
}

impl ConfigProviderFactory {
    pub fn new(config: GhostwriterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderFactory for ConfigProviderFactory {
    async fn create_embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, GhostwriterError> {
        create_embedding_provider(&self.config.embedding)
            .map_err(|e| EmbeddingError::Provider(e.to_string()).into())
    }

    async fn create_generation_provider(&self) -> Result<Arc<dyn LLMProvider>, GhostwriterError> {
        create_generation_provider(&self.config.generation)
            .map_err(|e| LLMError::Provider(e.to_string()).into())
    }
}

pub struct ResourceCache {
    factory: Arc<dyn ProviderFactory>,
    feedback_dir: PathBuf,
    embedding_timeout: Duration,
    event_bus: EventBus,
    embedding: OnceCell<Arc<dyn EmbeddingProvider>>,
    generation: OnceCell<Arc<dyn LLMProvider>>,
    stores: DashMap<String, Arc<OnceCell<Arc<ProfileFeedbackStore>>>>,
}

impl ResourceCache {
    pub fn new(
        factory: Arc<dyn ProviderFactory>,
        feedback_dir: impl Into<PathBuf>,
        embedding_timeout: Duration,
        event_bus: EventBus,
    ) -> Self {
        Self {
            factory,
            feedback_dir: feedback_dir.into(),
            embedding_timeout,
            event_bus,
            embedding: OnceCell::new(),
            generation: OnceCell::new(),
            stores: DashMap::new(),
        }
    }

    pub fn from_config(config: &GhostwriterConfig, event_bus: EventBus) -> Self {
        Self::new(
            Arc::new(ConfigProviderFactory::new(config.clone())),
            config.storage.feedback_dir(),
            config.timeouts.embedding(),
            event_bus,
        )
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn feedback_dir(&self) -> &std::path::Path {
        &self.feedback_dir
    }

    pub async fn get_embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, GhostwriterError> {
        let provider = self
            .embedding
            .get_or_try_init(|| async {
                let provider = self.factory.create_embedding_provider().await?;
                info!(model = provider.model(), "Embedding provider initialized");
                Ok::<_, GhostwriterError>(provider)
            })
            .await?;
        Ok(Arc::clone(provider))
    }

    pub async fn get_generation_provider(&self) -> Result<Arc<dyn LLMProvider>, GhostwriterError> {
        let provider = self
            .generation
            .get_or_try_init(|| async {
                let provider = self.factory.create_generation_provider().await?;
                info!("Generation provider initialized");
                Ok::<_, GhostwriterError>(provider)
            })
            .await?;
        Ok(Arc::clone(provider))
    }

    /// The profile's store, loading it from disk on first access.
    /// Profiles that share a slug share a store.
    pub async fn get_store(&self, profile: &ProfileName) -> Result<Arc<ProfileFeedbackStore>, GhostwriterError> {
        // Clone the cell out so the map shard is not locked across awaits.
        let cell = self
            .stores
            .entry(profile.slug())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let store = cell
            .get_or_try_init(|| async {
                let embedder = self.get_embedding_provider().await?;
                let store = ProfileFeedbackStore::open(
                    profile.clone(),
                    &self.feedback_dir,
                    embedder,
                    self.embedding_timeout,
                    self.event_bus.clone(),
                )
                .await?;
                let records = store.len().await;
                info!(profile = %profile, records = records, "Feedback store loaded");
                Ok::<_, GhostwriterError>(Arc::new(store))
            })
            .await?;
        Ok(Arc::clone(store))
    }

    /// Profiles that have a feedback log on disk, by slug, sorted
    pub async fn known_profiles(&self) -> Result<Vec<String>, GhostwriterError> {
        let mut entries = match tokio::fs::read_dir(&self.feedback_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.feedback_dir, e).into()),
        };

        let mut profiles = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.feedback_dir, e))?
        {
            let name = entry.file_name();
            if let Some(slug) = name.to_str().and_then(|n| n.strip_suffix(LOG_SUFFIX)) {
                if !slug.is_empty() {
                    profiles.push(slug.to_string());
                }
            }
        }
        profiles.sort();
        Ok(profiles)
    }

    /// Load every profile that already has feedback. Returns how many were loaded.
    pub async fn warm_up(&self) -> Result<usize, GhostwriterError> {
        let profiles = self.known_profiles().await?;
        for slug in &profiles {
            let profile = ProfileName::new(slug.as_str())?;
            self.get_store(&profile).await?;
        }
        debug!(profiles = profiles.len(), "Resource cache warmed up");
        Ok(profiles.len())
    }

    /// Number of profile stores constructed so far
    pub fn loaded_store_count(&self) -> usize {
        self.stores.iter().filter(|entry| entry.value().initialized()).count()
    }
}
