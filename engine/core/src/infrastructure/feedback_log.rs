// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Append-only feedback log
//!
//! One JSON object per line (JSON Lines), one file per profile. The log is
//! the source of truth for a profile's feedback; embeddings are not stored
//! here.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::domain::errors::StorageError;
use crate::domain::feedback::FeedbackRecord;

pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in insertion order.
    ///
    /// A missing file is an empty log. A final line without its newline is
    /// the remains of an interrupted append: it is dropped and the file is
    /// truncated back to the last complete record. If that final line still
    /// parses, only the newline is missing and it is written back so the next
    /// append starts on a fresh line. Any other unparsable line is reported
    /// as corruption.
    pub async fn load(&self) -> Result<Vec<FeedbackRecord>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut records = Vec::new();
        let mut offset = 0usize;

        for (line_no, line) in content.split_inclusive('\n').enumerate() {
            let complete = line.ends_with('\n');
            let trimmed = line.trim();

            if !trimmed.is_empty() {
                match serde_json::from_str::<FeedbackRecord>(trimmed) {
                    Ok(record) => {
                        records.push(record);
                        if !complete {
                            warn!(
                                path = %self.path.display(),
                                line = line_no + 1,
                                "Restoring missing newline after last feedback record"
                            );
                            self.terminate_last_line().await?;
                        }
                    }
                    Err(e) if !complete => {
                        warn!(
                            path = %self.path.display(),
                            line = line_no + 1,
                            error = %e,
                            "Dropping incomplete trailing feedback record"
                        );
                        self.truncate(offset as u64).await?;
                        break;
                    }
                    Err(e) => {
                        return Err(StorageError::CorruptLog {
                            path: self.path.display().to_string(),
                            line: line_no + 1,
                            message: e.to_string(),
                        });
                    }
                }
            }

            offset += line.len();
        }

        Ok(records)
    }

    /// Durably append one record. On failure the file is cut back to its
    /// previous length so no partial line survives.
    pub async fn append(&self, record: &FeedbackRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        let previous_len = file
            .metadata()
            .await
            .map_err(|e| StorageError::io(&self.path, e))?
            .len();

        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.sync_data().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(rollback) = self.truncate(previous_len).await {
                warn!(path = %self.path.display(), error = %rollback, "Failed to roll back partial append");
            }
            return Err(StorageError::io(&self.path, e));
        }

        Ok(())
    }

    async fn terminate_last_line(&self) -> Result<(), StorageError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(b"\n")
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.sync_data()
            .await
            .map_err(|e| StorageError::io(&self.path, e))
    }

    async fn truncate(&self, len: u64) -> Result<(), StorageError> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.set_len(len)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.sync_data()
            .await
            .map_err(|e| StorageError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;
    use tempfile::TempDir;

    fn record(text: &str) -> FeedbackRecord {
        FeedbackRecord::from_submission(NewFeedback {
            profile: "default".to_string(),
            context: "failed interview".to_string(),
            generated_post: "post".to_string(),
            feedback_type: "positive".to_string(),
            feedback_text: text.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path().join("none_feedback.jsonl"));
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_load_in_order() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback").join("default_feedback.jsonl"));

        let first = record("first");
        let second = record("second");
        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();

        let loaded = log.load().await.unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[tokio::test]
    async fn test_truncated_tail_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default_feedback.jsonl");
        let log = FeedbackLog::new(&path);

        let kept = record("kept");
        log.append(&kept).await.unwrap();
        let intact_len = tokio::fs::metadata(&path).await.unwrap().len();

        let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(br#"{"id":"half-writ"#).await.unwrap();
        drop(file);

        assert_eq!(log.load().await.unwrap(), vec![kept]);
        assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), intact_len);
    }

    #[tokio::test]
    async fn test_complete_tail_without_newline_is_kept_and_terminated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default_feedback.jsonl");
        let log = FeedbackLog::new(&path);

        let first = record("one");
        tokio::fs::write(&path, serde_json::to_string(&first).unwrap())
            .await
            .unwrap();

        assert_eq!(log.load().await.unwrap(), vec![first.clone()]);
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.ends_with('\n'));

        let second = record("two");
        log.append(&second).await.unwrap();
        assert_eq!(log.load().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_corrupt_middle_line_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default_feedback.jsonl");
        let log = FeedbackLog::new(&path);

        log.append(&record("one")).await.unwrap();
        let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(b"not json\n").await.unwrap();
        drop(file);
        log.append(&record("three")).await.unwrap();

        assert!(matches!(
            log.load().await,
            Err(StorageError::CorruptLog { line: 2, .. })
        ));
    }
}
