// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Style example source
//!
//! Profile sample storage is owned elsewhere; the engine only consumes an
//! ordered list of example texts per profile.

use async_trait::async_trait;

use super::errors::GhostwriterError;
use super::profile::ProfileName;

#[async_trait]
pub trait StyleExampleSource: Send + Sync {
    /// Ordered writing samples for the profile.
    ///
    /// Fails with `ValidationError::ProfileNotFound` when the profile has no
    /// sample storage.
    async fn load_style_examples(&self, profile: &ProfileName) -> Result<Vec<String>, GhostwriterError>;
}
