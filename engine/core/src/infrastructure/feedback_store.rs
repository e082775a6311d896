// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Profile Feedback Store
//!
//! Durable, similarity-searchable feedback memory for one voice profile.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Owns the profile's append-only log and the flat index over
//!   its embeddings, and keeps the two aligned.
//!
//! # Write protocol
//!
//! Appends are serialized by a per-store mutex. For each append:
//!
//! 1. embed the canonical text (bounded by the embedding timeout),
//! 2. stage the next index snapshot next to the live one,
//! 3. append the record to the log (the commit point),
//! 4. rename the staged snapshot over the live one,
//! 5. swap the new record and vector into memory under one write lock.
//!
//! Nothing is touched before step 3 succeeds. If step 4 fails the snapshot
//! on disk lags the log and is rebuilt on the next open. Steps 2 to 5 run
//! on a spawned task so a caller dropping its future cannot leave memory
//! behind the log.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::embedding::{EmbeddingError, EmbeddingProvider};
use crate::domain::errors::{GhostwriterError, StorageError, ValidationError};
use crate::domain::events::LearningEvent;
use crate::domain::feedback::{most_recent, FeedbackKind, FeedbackRecord, FeedbackSummary};
use crate::domain::profile::ProfileName;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::feedback_log::FeedbackLog;
use crate::infrastructure::vector_index::{FlatIndex, IndexEntry, IndexSnapshot};

/// Records grouped by feedback kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackByKind {
    pub positive: Vec<FeedbackRecord>,
    pub negative: Vec<FeedbackRecord>,
    pub refinement: Vec<FeedbackRecord>,
}

struct StoreState {
    records: Vec<FeedbackRecord>,
    index: FlatIndex,
}

pub struct ProfileFeedbackStore {
    profile: ProfileName,
    log: FeedbackLog,
    index_path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_timeout: Duration,
    write_guard: Arc<Mutex<()>>,
    state: RwLock<StoreState>,
    event_bus: EventBus,
}

pub fn log_path(feedback_dir: &Path, profile: &ProfileName) -> PathBuf {
    feedback_dir.join(format!("{}_feedback.jsonl", profile.slug()))
}

pub fn index_path(feedback_dir: &Path, profile: &ProfileName) -> PathBuf {
    feedback_dir.join(format!("{}_feedback.index", profile.slug()))
}

impl ProfileFeedbackStore {
    /// Load the profile's log and index from `feedback_dir`.
    ///
    /// The index snapshot is trusted only if it lines up with the log and was
    /// built by the same embedding model; otherwise it is rebuilt by
    /// re-embedding every record.
    pub async fn open(
        profile: ProfileName,
        feedback_dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_timeout: Duration,
        event_bus: EventBus,
    ) -> Result<Self, GhostwriterError> {
        let log = FeedbackLog::new(log_path(feedback_dir, &profile));
        let index_path = index_path(feedback_dir, &profile);

        let records = log.load().await?;
        let model = embedder.model().to_string();

        let store = Self {
            profile,
            log,
            index_path,
            embedder,
            embedding_timeout,
            write_guard: Arc::new(Mutex::new(())),
            state: RwLock::new(StoreState {
                records: Vec::new(),
                index: FlatIndex::new(model.clone()),
            }),
            event_bus,
        };

        let rebuild_reason = match FlatIndex::read_snapshot(&store.index_path).await {
            IndexSnapshot::Loaded(index) if index.matches(&records, &model) => {
                debug!(profile = %store.profile, records = records.len(), "Loaded index snapshot");
                *store.state.write().await = StoreState { records, index };
                return Ok(store);
            }
            IndexSnapshot::Missing if records.is_empty() => {
                *store.state.write().await = StoreState {
                    records,
                    index: FlatIndex::new(model),
                };
                return Ok(store);
            }
            IndexSnapshot::Loaded(index) if index.model() != model => format!(
                "snapshot built with embedding model '{}', now '{}'",
                index.model(),
                model
            ),
            IndexSnapshot::Loaded(_) => "snapshot does not match the feedback log".to_string(),
            IndexSnapshot::Missing => "snapshot missing".to_string(),
            IndexSnapshot::Unreadable(reason) => format!("snapshot unreadable: {}", reason),
        };

        warn!(
            profile = %store.profile,
            records = records.len(),
            reason = %rebuild_reason,
            "Rebuilding feedback index from log"
        );

        let mut index = FlatIndex::new(model);
        for record in &records {
            let vector = store.embed(&record.canonical_text()).await?;
            index.insert(record.id(), vector)?;
        }

        if let Err(e) = index.save(&store.index_path).await {
            // The in-memory index is still valid; the next open rebuilds again.
            warn!(profile = %store.profile, error = %e, "Failed to persist rebuilt index");
        }

        metrics::counter!("ghostwriter_index_rebuilds_total").increment(1);
        store.event_bus.publish(LearningEvent::IndexRebuilt {
            profile: store.profile.slug(),
            records: records.len(),
            reason: rebuild_reason,
            timestamp: Utc::now(),
        });

        *store.state.write().await = StoreState { records, index };
        Ok(store)
    }

    pub fn profile(&self) -> &ProfileName {
        &self.profile
    }

    /// Durably append `record` and make it visible to queries.
    ///
    /// On error no trace of the record is left in memory or in the log.
    pub async fn append(self: &Arc<Self>, record: FeedbackRecord) -> Result<(), GhostwriterError> {
        if record.profile_name().slug() != self.profile.slug() {
            return Err(ValidationError::InvalidProfileName(record.profile_name().to_string()).into());
        }

        let guard = Arc::clone(&self.write_guard).lock_owned().await;

        let vector = self.embed(&record.canonical_text()).await?;
        self.state.read().await.index.check_dimension(&vector)?;

        let store = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            store.persist(record, vector).await
        })
        .await
        .map_err(|e| StorageError::Io {
            path: self.log.path().display().to_string(),
            message: format!("append task failed: {}", e),
        })?
    }

    async fn persist(&self, record: FeedbackRecord, vector: Vec<f32>) -> Result<(), GhostwriterError> {
        let entry = IndexEntry {
            record_id: record.id(),
            vector,
        };

        let bytes = self.state.read().await.index.snapshot_bytes_with(&entry)?;
        let staged = FlatIndex::stage_bytes(&self.index_path, bytes).await?;

        if let Err(e) = self.log.append(&record).await {
            FlatIndex::discard_staged(&staged).await;
            return Err(e.into());
        }

        if let Err(e) = FlatIndex::commit_staged(&staged, &self.index_path).await {
            warn!(profile = %self.profile, error = %e, "Index snapshot lags the feedback log");
        }

        let (id, kind) = (record.id(), record.kind());
        let total = {
            let mut state = self.state.write().await;
            state.index.insert(entry.record_id, entry.vector)?;
            state.records.push(record);
            state.records.len()
        };

        metrics::counter!("ghostwriter_feedback_appended_total", "kind" => kind.as_str()).increment(1);
        info!(profile = %self.profile, feedback_id = %id, kind = %kind, total, "Feedback recorded");
        self.event_bus.publish(LearningEvent::FeedbackRecorded {
            profile: self.profile.slug(),
            feedback_id: id,
            kind,
            total_records: total,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Up to `limit` records nearest to `context`, optionally of one kind.
    ///
    /// Ordered by ascending distance; equal distances put the newer
    /// timestamp first, then the later insertion.
    pub async fn query_relevant(
        &self,
        context: &str,
        kind: Option<FeedbackKind>,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, GhostwriterError> {
        if limit == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let query = self.embed(context).await?;
        let state = self.state.read().await;
        Ok(nearest(&state, &query, kind, limit)?)
    }

    /// [`ProfileFeedbackStore::query_relevant`] for every kind at once,
    /// embedding `context` a single time
    pub async fn query_relevant_by_kind(
        &self,
        context: &str,
        limit: usize,
    ) -> Result<FeedbackByKind, GhostwriterError> {
        if limit == 0 || self.is_empty().await {
            return Ok(FeedbackByKind::default());
        }

        let query = self.embed(context).await?;
        let state = self.state.read().await;
        Ok(FeedbackByKind {
            positive: nearest(&state, &query, Some(FeedbackKind::Positive), limit)?,
            negative: nearest(&state, &query, Some(FeedbackKind::Negative), limit)?,
            refinement: nearest(&state, &query, Some(FeedbackKind::Refinement), limit)?,
        })
    }

    pub async fn summary(&self, recent_limit: usize) -> FeedbackSummary {
        FeedbackSummary::from_records(&self.state.read().await.records, recent_limit)
    }

    /// The `k` most recent records of each kind, without embedding anything
    pub async fn strongest_patterns(&self, k: usize) -> FeedbackByKind {
        let state = self.state.read().await;
        let of_kind = |kind: FeedbackKind| -> Vec<FeedbackRecord> {
            let filtered: Vec<FeedbackRecord> = state
                .records
                .iter()
                .filter(|r| r.kind() == kind)
                .cloned()
                .collect();
            most_recent(&filtered, k).into_iter().cloned().collect()
        };

        FeedbackByKind {
            positive: of_kind(FeedbackKind::Positive),
            negative: of_kind(FeedbackKind::Negative),
            refinement: of_kind(FeedbackKind::Refinement),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<FeedbackRecord> {
        self.state.read().await.records.clone()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match tokio::time::timeout(self.embedding_timeout, self.embedder.embed(text)).await {
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout(self.embedding_timeout.as_millis() as u64)),
        }
    }
}

fn nearest(
    state: &StoreState,
    query: &[f32],
    kind: Option<FeedbackKind>,
    limit: usize,
) -> Result<Vec<FeedbackRecord>, EmbeddingError> {
    let records = &state.records;
    let mut neighbors = state
        .index
        .scan(query, |position| kind.map_or(true, |k| records[position].kind() == k))?;

    neighbors.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| records[b.position].timestamp().cmp(&records[a.position].timestamp()))
            .then_with(|| b.position.cmp(&a.position))
    });

    Ok(neighbors
        .into_iter()
        .take(limit)
        .map(|n| records[n.position].clone())
        .collect())
}
