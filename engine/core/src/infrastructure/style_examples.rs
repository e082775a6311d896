// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! File-backed style examples
//!
//! Each profile's writing samples live in one text file under the storage
//! root, separated by blank lines.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::config::StorageConfig;
use crate::domain::errors::{GhostwriterError, StorageError, ValidationError};
use crate::domain::profile::ProfileName;
use crate::domain::style::StyleExampleSource;

pub struct FileStyleExampleSource {
    root: PathBuf,
    default_profile_file: PathBuf,
    max_examples: usize,
}

impl FileStyleExampleSource {
    pub fn new(storage: &StorageConfig, max_examples: usize) -> Self {
        Self {
            root: storage.root.clone(),
            default_profile_file: storage.default_profile_file.clone(),
            max_examples,
        }
    }

    /// `default` reads the configured default file (relative paths resolve
    /// against the storage root); other profiles read `<root>/<slug>.txt`.
    pub fn profile_file(&self, profile: &ProfileName) -> PathBuf {
        if profile.is_default() {
            self.root.join(&self.default_profile_file)
        } else {
            self.root.join(format!("{}.txt", profile.slug()))
        }
    }
}

/// Split on blank lines, dropping empty samples
pub fn split_samples(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl StyleExampleSource for FileStyleExampleSource {
    async fn load_style_examples(&self, profile: &ProfileName) -> Result<Vec<String>, GhostwriterError> {
        let path = self.profile_file(profile);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ValidationError::ProfileNotFound(profile.to_string()).into());
            }
            Err(e) => return Err(StorageError::io(&path, e).into()),
        };

        let mut samples = split_samples(&content);
        samples.truncate(self.max_examples);
        debug!(profile = %profile, samples = samples.len(), "Loaded style examples");
        Ok(samples)
    }
}
