// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod embedding;
pub mod event_bus;
pub mod feedback_log;
pub mod feedback_store;
pub mod llm;
pub mod style_examples;
pub mod vector_index;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use feedback_store::{FeedbackByKind, ProfileFeedbackStore};
pub use style_examples::FileStyleExampleSource;
