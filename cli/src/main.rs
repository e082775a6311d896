// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Ghostwriter CLI
//!
//! The `ghostwriter` binary hosts the learning engine in-process.
//!
//! ## Commands
//!
//! - `ghostwriter generate|regenerate|refine` - Write posts
//! - `ghostwriter feedback|summary|relevant` - Teach and inspect feedback memory
//! - `ghostwriter prompt` - Print the composed prompt without calling the model
//! - `ghostwriter config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use ghostwriter_core::domain::config::GhostwriterConfigManifest;

mod commands;
mod engine;

use commands::{ConfigCommand, FeedbackArgs, RefineArgs, RequestArgs, SummaryArgs, RelevantArgs};

/// Ghostwriter - LinkedIn posts in your own voice, learning from your feedback
#[derive(Parser)]
#[command(name = "ghostwriter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "GHOSTWRITER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "GHOSTWRITER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Stream learning events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a post using relevant past feedback
    Generate(RequestArgs),

    /// Generate again after submitting feedback
    Regenerate(RequestArgs),

    /// Rewrite a post once from an instruction (nothing is stored)
    Refine(RefineArgs),

    /// Record feedback on a generated post
    Feedback(FeedbackArgs),

    /// Show a profile's learning summary
    Summary(SummaryArgs),

    /// List stored feedback most similar to a context
    Relevant(RelevantArgs),

    /// Print the prompt that `generate` would send
    Prompt(RequestArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings from the config file, if one is readable; the
    // configuration is loaded again (and validated) by the command itself.
    let logging = GhostwriterConfigManifest::load_or_default(cli.config.clone())
        .ok()
        .and_then(|manifest| manifest.spec.observability)
        .map(|observability| observability.logging)
        .unwrap_or_default();
    let level = cli.log_level.clone().unwrap_or_else(|| logging.level.clone());
    init_logging(&level, &logging.format)?;

    match cli.command {
        Some(Commands::Generate(args)) => {
            commands::generate::generate(args, cli.config, cli.verbose, false).await
        }
        Some(Commands::Regenerate(args)) => {
            commands::generate::generate(args, cli.config, cli.verbose, true).await
        }
        Some(Commands::Refine(args)) => commands::generate::refine(args, cli.config, cli.verbose).await,
        Some(Commands::Prompt(args)) => commands::generate::prompt(args, cli.config).await,
        Some(Commands::Feedback(args)) => commands::feedback::submit(args, cli.config, cli.verbose).await,
        Some(Commands::Summary(args)) => commands::feedback::summary(args, cli.config).await,
        Some(Commands::Relevant(args)) => commands::feedback::relevant(args, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` wins over `level`.
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
