// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Vector Index
//!
//! Exact nearest-neighbour index over feedback embeddings.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Flat (brute-force) squared-Euclidean search. Feedback volume
//!   per profile is hundreds to low thousands of records, so a full scan per
//!   query is cheap and keeps results exact.
//!
//! Entries are positionally aligned with the profile's record sequence:
//! entry `i` is the embedding of record `i`. The snapshot file is a cache of
//! the log and can always be rebuilt from it. It records the embedding model
//! that produced its vectors; vectors from another model are not comparable.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::domain::embedding::EmbeddingError;
use crate::domain::errors::StorageError;
use crate::domain::feedback::{FeedbackId, FeedbackRecord};

pub const INDEX_FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub record_id: FeedbackId,
    pub vector: Vec<f32>,
}

/// A candidate with its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in the record sequence
    pub position: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    format_version: u32,
    model: String,
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// Outcome of reading a snapshot file
#[derive(Debug)]
pub enum IndexSnapshot {
    Missing,
    Unreadable(String),
    Loaded(FlatIndex),
}

impl FlatIndex {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            format_version: INDEX_FORMAT_VERSION,
            model: model.into(),
            dimension: None,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding model the vectors came from
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// An empty index accepts any dimension; afterwards it is fixed
    pub fn check_dimension(&self, vector: &[f32]) -> Result<(), EmbeddingError> {
        if vector.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        match self.dimension {
            Some(expected) if expected != vector.len() => Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn insert(&mut self, record_id: FeedbackId, vector: Vec<f32>) -> Result<(), EmbeddingError> {
        self.check_dimension(&vector)?;
        self.dimension = Some(vector.len());
        self.entries.push(IndexEntry { record_id, vector });
        Ok(())
    }

    /// Distances from `query` to every entry whose position passes `filter`,
    /// unordered. A query of the wrong dimension is an error.
    pub fn scan(
        &self,
        query: &[f32],
        filter: impl Fn(usize) -> bool,
    ) -> Result<Vec<Neighbor>, EmbeddingError> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        self.check_dimension(query)?;

        Ok(self
            .entries
            .iter()
            .enumerate()
            .filter(|(position, _)| filter(*position))
            .map(|(position, entry)| Neighbor {
                position,
                distance: squared_euclidean(query, &entry.vector),
            })
            .collect())
    }

    /// True when the entries line up one-to-one, in order, with `records`
    /// and were produced by `model`
    pub fn matches(&self, records: &[FeedbackRecord], model: &str) -> bool {
        self.format_version == INDEX_FORMAT_VERSION
            && self.model == model
            && self.entries.len() == records.len()
            && self
                .entries
                .iter()
                .zip(records)
                .all(|(entry, record)| entry.record_id == record.id())
            && self
                .entries
                .iter()
                .all(|entry| Some(entry.vector.len()) == self.dimension)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Snapshot bytes of this index with `extra` appended, without cloning
    /// the existing entries. Decodes as a regular [`FlatIndex`].
    pub fn snapshot_bytes_with(&self, extra: &IndexEntry) -> Result<Vec<u8>, StorageError> {
        self.check_dimension(&extra.vector)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        bincode::serialize(&SnapshotWith { index: self, extra })
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub async fn read_snapshot(path: &Path) -> IndexSnapshot {
        match tokio::fs::read(path).await {
            Ok(bytes) => match Self::from_bytes(&bytes) {
                Ok(index) if index.format_version == INDEX_FORMAT_VERSION => IndexSnapshot::Loaded(index),
                Ok(index) => IndexSnapshot::Unreadable(format!(
                    "format version {} (expected {})",
                    index.format_version, INDEX_FORMAT_VERSION
                )),
                Err(e) => IndexSnapshot::Unreadable(e.to_string()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexSnapshot::Missing,
            Err(e) => IndexSnapshot::Unreadable(e.to_string()),
        }
    }

    /// Write the snapshot next to `path` without replacing it yet.
    /// Returns the staged file, to be passed to [`FlatIndex::commit_staged`].
    pub async fn stage_snapshot(&self, path: &Path) -> Result<PathBuf, StorageError> {
        Self::stage_bytes(path, self.to_bytes()?).await
    }

    pub async fn stage_bytes(path: &Path, bytes: Vec<u8>) -> Result<PathBuf, StorageError> {
        let staged = staged_path(path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }
        tokio::fs::write(&staged, bytes)
            .await
            .map_err(|e| StorageError::io(&staged, e))?;
        Ok(staged)
    }

    pub async fn commit_staged(staged: &Path, path: &Path) -> Result<(), StorageError> {
        tokio::fs::rename(staged, path)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    pub async fn discard_staged(staged: &Path) {
        if let Err(e) = tokio::fs::remove_file(staged).await {
            tracing::debug!(path = %staged.display(), error = %e, "Failed to remove staged index");
        }
    }

    /// Stage and commit in one step
    pub async fn save(&self, path: &Path) -> Result<(), StorageError> {
        let staged = self.stage_snapshot(path).await?;
        Self::commit_staged(&staged, path).await
    }
}

struct SnapshotWith<'a> {
    index: &'a FlatIndex,
    extra: &'a IndexEntry,
}

struct EntriesWith<'a> {
    entries: &'a [IndexEntry],
    extra: &'a IndexEntry,
}

// Field order and types must match the derived encoding of FlatIndex.
impl Serialize for SnapshotWith<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FlatIndex", 4)?;
        state.serialize_field("format_version", &self.index.format_version)?;
        state.serialize_field("model", &self.index.model)?;
        state.serialize_field("dimension", &Some(self.extra.vector.len()))?;
        state.serialize_field(
            "entries",
            &EntriesWith {
                entries: &self.index.entries,
                extra: self.extra,
            },
        )?;
        state.end()
    }
}

impl Serialize for EntriesWith<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len() + 1))?;
        for entry in self.entries {
            seq.serialize_element(entry)?;
        }
        seq.serialize_element(self.extra)?;
        seq.end()
    }
}

fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".staged");
    path.with_file_name(name)
}

pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_distances_and_filter() {
        let mut index = FlatIndex::new("hashing-2");
        index.insert(FeedbackId::new(), vec![1.0, 0.0]).unwrap();
        index.insert(FeedbackId::new(), vec![0.0, 1.0]).unwrap();
        index.insert(FeedbackId::new(), vec![1.0, 1.0]).unwrap();

        let all = index.scan(&[1.0, 0.0], |_| true).unwrap();
        let distances: Vec<f32> = all.iter().map(|n| n.distance).collect();
        assert_eq!(distances, vec![0.0, 2.0, 1.0]);

        let odd = index.scan(&[1.0, 0.0], |p| p % 2 == 1).unwrap();
        assert_eq!(odd.len(), 1);
        assert_eq!(odd[0].position, 1);
    }

    #[test]
    fn test_dimension_is_fixed_by_first_insert() {
        let mut index = FlatIndex::new("hashing-2");
        index.insert(FeedbackId::new(), vec![1.0, 0.0, 0.0]).unwrap();

        assert!(matches!(
            index.insert(FeedbackId::new(), vec![1.0]),
            Err(EmbeddingError::DimensionMismatch { expected: 3, actual: 1 })
        ));
        assert!(index.scan(&[1.0, 2.0], |_| true).is_err());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_matches_requires_same_model() {
        let mut index = FlatIndex::new("hashing-2");
        assert!(index.matches(&[], "hashing-2"));
        assert!(!index.matches(&[], "hashing-4"));

        index.insert(FeedbackId::new(), vec![1.0, 0.0]).unwrap();
        assert!(!index.matches(&[], "hashing-2"));
    }

    #[test]
    fn test_empty_index_scan() {
        let index = FlatIndex::new("hashing-2");
        assert!(index.scan(&[0.5; 4], |_| true).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_with_extra_decodes_as_index() {
        let mut index = FlatIndex::new("hashing-2");
        index.insert(FeedbackId::new(), vec![1.0, 2.0]).unwrap();
        let extra = IndexEntry {
            record_id: FeedbackId::new(),
            vector: vec![3.0, 4.0],
        };

        let bytes = index.snapshot_bytes_with(&extra).unwrap();

        let mut expected = index.clone();
        expected.insert(extra.record_id, extra.vector.clone()).unwrap();
        assert_eq!(FlatIndex::from_bytes(&bytes).unwrap(), expected);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_and_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p_feedback.index");

        assert!(matches!(FlatIndex::read_snapshot(&path).await, IndexSnapshot::Missing));

        let mut index = FlatIndex::new("hashing-2");
        index.insert(FeedbackId::new(), vec![0.25, 0.75]).unwrap();
        index.save(&path).await.unwrap();
        assert!(!staged_path(&path).exists());

        match FlatIndex::read_snapshot(&path).await {
            IndexSnapshot::Loaded(loaded) => assert_eq!(loaded, index),
            other => panic!("unexpected snapshot: {:?}", other),
        }

        tokio::fs::write(&path, b"\x01garbage").await.unwrap();
        assert!(matches!(
            FlatIndex::read_snapshot(&path).await,
            IndexSnapshot::Unreadable(_)
        ));
    }
}
