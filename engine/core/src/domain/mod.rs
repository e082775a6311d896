// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides the domain model of the learning engine.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Feedback records, patterns, prompts and port interfaces

pub mod config;
pub mod embedding;
pub mod errors;
pub mod events;
pub mod feedback;
pub mod llm;
pub mod patterns;
pub mod profile;
pub mod prompt;
pub mod style;

pub use errors::{GhostwriterError, StorageError, ValidationError};
pub use feedback::{FeedbackId, FeedbackKind, FeedbackRecord, FeedbackSummary, RecentFeedback};
pub use patterns::{AggregatedPatterns, PatternAggregator};
pub use profile::ProfileName;
pub use prompt::PromptComposer;
