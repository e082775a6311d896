// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Errors
//!
//! Error taxonomy surfaced by the learning engine.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** One variant per failure class so the hosting API layer can
//!   map each to a distinct client-facing status

use thiserror::Error;

use super::embedding::EmbeddingError;
use super::llm::LLMError;

/// Top-level error returned by every engine operation.
///
/// Errors are surfaced unmodified. The engine never retries and never
/// substitutes a default value for a failed call.
#[derive(Debug, Error)]
pub enum GhostwriterError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Generation error: {0}")]
    Generation(#[from] LLMError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl GhostwriterError {
    /// Stable short name of the error class
    pub fn kind(&self) -> &'static str {
        match self {
            GhostwriterError::Embedding(_) => "embedding",
            GhostwriterError::Generation(_) => "generation",
            GhostwriterError::Storage(_) => "storage",
            GhostwriterError::Validation(_) => "validation",
        }
    }
}

/// Durable read/write failures of the feedback log and index files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt feedback log {path} at line {line}: {message}")]
    CorruptLog {
        path: String,
        line: usize,
        message: String,
    },
}

impl StorageError {
    pub fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        StorageError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Rejected input, checked when a value is constructed rather than when used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Unknown feedback kind: '{0}' (expected positive, negative or refinement)")]
    UnknownFeedbackKind(String),

    #[error("Refinement instruction given for non-refinement feedback kind '{0}'")]
    UnexpectedRefinementInstruction(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Invalid profile name: '{0}'")]
    InvalidProfileName(String),
}

pub type Result<T, E = GhostwriterError> = std::result::Result<T, E>;
