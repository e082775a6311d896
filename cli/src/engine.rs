// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process engine construction
//!
//! Loads configuration and wires the learning engine together for a single
//! CLI invocation.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use ghostwriter_core::application::{FeedbackAwareGenerator, GeneratorSettings, ResourceCache};
use ghostwriter_core::domain::config::GhostwriterConfigManifest;
use ghostwriter_core::domain::events::LearningEvent;
use ghostwriter_core::infrastructure::{EventBus, EventReceiver, FileStyleExampleSource};

pub struct Engine {
    pub generator: FeedbackAwareGenerator,
    events: Option<EventReceiver>,
}

impl Engine {
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let manifest = GhostwriterConfigManifest::load_or_default(config_path)
            .context("Failed to load configuration")?;
        manifest
            .validate()
            .context("Configuration validation failed")?;

        let config = &manifest.spec;
        let event_bus = EventBus::default();
        let events = verbose.then(|| event_bus.subscribe());

        let cache = Arc::new(ResourceCache::from_config(config, event_bus));
        let style_source = Arc::new(FileStyleExampleSource::new(
            &config.storage,
            config.retrieval.max_style_examples,
        ));
        let generator = FeedbackAwareGenerator::new(
            cache,
            style_source,
            GeneratorSettings::from_config(config),
        );

        debug!(root = %config.storage.root.display(), "Engine ready");
        Ok(Self { generator, events })
    }

    /// Print learning events published so far (only with `--verbose`)
    pub fn print_events(&mut self) {
        if let Some(receiver) = self.events.as_mut() {
            while let Ok(event) = receiver.try_recv() {
                eprintln!("{} {}", "event".dimmed(), describe(&event));
            }
        }
    }
}

fn describe(event: &LearningEvent) -> String {
    match event {
        LearningEvent::FeedbackRecorded {
            profile,
            kind,
            total_records,
            ..
        } => format!("{} feedback recorded for {} ({} total)", kind, profile, total_records),
        LearningEvent::IndexRebuilt {
            profile,
            records,
            reason,
            ..
        } => format!("index for {} rebuilt from {} records: {}", profile, records, reason),
        LearningEvent::PostGenerated {
            profile,
            pattern_count,
            ..
        } => format!("post generated for {} with {} patterns", profile, pattern_count),
        LearningEvent::PostRefined { profile, .. } => format!("post refined for {}", profile),
        LearningEvent::GenerationFailed { profile, error, .. } => {
            format!("generation failed for {}: {}", profile, error)
        }
    }
}
