// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use ghostwriter_core::application::ResourceCache;
use ghostwriter_core::domain::config::{GhostwriterConfig, GhostwriterConfigManifest};
use ghostwriter_core::infrastructure::EventBus;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Also contact the embedding and generation providers
        #[arg(long)]
        check: bool,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./ghostwriter-config.yaml)
        #[arg(short, long, default_value = "./ghostwriter-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file, check } => validate(file.or(config_override), check).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let manifest = GhostwriterConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. GHOSTWRITER_CONFIG_PATH: {}",
            std::env::var("GHOSTWRITER_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./ghostwriter-config.yaml");
        println!("  4. ~/.ghostwriter/config.yaml");
        println!("  5. /etc/ghostwriter/config.yaml");
        println!();
    }

    let config = &manifest.spec;
    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Storage:".bold());
    println!("  Root: {}", config.storage.root.display());
    println!("  Feedback: {}", config.storage.feedback_dir().display());
    println!("  Default profile file: {}", config.storage.default_profile_file.display());
    println!();

    println!("{}", "Embedding:".bold());
    println!("  Type: {}", config.embedding.provider_type);
    if config.embedding.provider_type == "hashing" {
        println!("  Dimension: {}", config.embedding.dimension);
    } else {
        println!("  Endpoint: {}", config.embedding.endpoint);
        println!("  Model: {}", config.embedding.model);
    }
    println!();

    println!("{}", "Generation:".bold());
    println!("  Type: {}", config.generation.provider_type);
    println!("  Endpoint: {}", config.generation.endpoint);
    println!("  Model: {}", config.generation.model);
    println!(
        "  Temperature: {}  Max tokens: {}",
        config.generation.temperature, config.generation.max_tokens
    );
    if config.generation.api_key.is_some() {
        println!("  API key: {}", "(set)".dimmed());
    }
    println!();

    println!("{}", "Retrieval:".bold());
    println!("  Pattern cap: {}", config.retrieval.pattern_cap);
    println!("  Relevant limit: {}", config.retrieval.relevant_limit);
    println!("  Recent limit: {}", config.retrieval.recent_limit);
    println!("  Style examples: {}", config.retrieval.max_style_examples);
    println!();

    println!("{}", "Timeouts:".bold());
    println!("  Embedding: {} ms", config.timeouts.embedding_ms);
    println!("  Generation: {} ms", config.timeouts.generation_ms);

    Ok(())
}

async fn validate(config_path: Option<PathBuf>, check_providers: bool) -> Result<()> {
    println!("Validating configuration...");

    let manifest = GhostwriterConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    manifest
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    if check_providers {
        check(&manifest.spec).await?;
    }

    Ok(())
}

async fn check(config: &GhostwriterConfig) -> Result<()> {
    let cache = ResourceCache::from_config(config, EventBus::default());

    let embedder = cache
        .get_embedding_provider()
        .await
        .context("Failed to build embedding provider")?;
    let vector = embedder
        .embed("ghostwriter connectivity check")
        .await
        .with_context(|| format!("Embedding provider '{}' is not usable", embedder.model()))?;
    println!(
        "{}",
        format!("✓ Embedding provider reachable ({} dimensions)", vector.len()).green()
    );

    let llm = cache
        .get_generation_provider()
        .await
        .context("Failed to build generation provider")?;
    llm.health_check()
        .await
        .context("Generation provider is not reachable")?;
    println!("{}", "✓ Generation provider reachable".green());

    Ok(())
}

fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    if with_examples {
        std::fs::write(&output, include_str!("../../templates/config-with-examples.yaml"))
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    } else {
        GhostwriterConfigManifest::default()
            .to_yaml_file(&output)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
