// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Feedback-driven semantic memory and prompt augmentation for Ghostwriter.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Persists user feedback per voice profile, retrieves it by
//!   semantic similarity and injects it into generation prompts

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
