// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod generation;
pub mod resource_cache;

pub use generation::{FeedbackAwareGenerator, GenerationPhase, GeneratorSettings, PreparedPrompt};
pub use resource_cache::{ConfigProviderFactory, ProviderFactory, ResourceCache};
