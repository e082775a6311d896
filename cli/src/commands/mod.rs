// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Ghostwriter CLI

use anyhow::{Context, Result};
use clap::Args;

pub mod config;
pub mod feedback;
pub mod generate;

pub use self::config::ConfigCommand;

/// A generation request
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Voice profile name
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// What the post is about
    #[arg(long)]
    pub context: String,

    /// Extra instructions for this post
    #[arg(short, long, default_value = "")]
    pub instruction: String,
}

#[derive(Args, Debug)]
pub struct RefineArgs {
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// Post to rewrite (text, or @path to read a file)
    #[arg(long)]
    pub post: String,

    /// What to change
    #[arg(long)]
    pub feedback: String,

    #[arg(long, default_value = "")]
    pub context: String,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// Context the post was generated for
    #[arg(long)]
    pub context: String,

    /// Instruction the post was generated with
    #[arg(short, long, default_value = "")]
    pub instruction: String,

    /// The generated post (text, or @path to read a file)
    #[arg(long)]
    pub post: String,

    /// positive, negative or refinement
    #[arg(long = "type", value_name = "KIND")]
    pub feedback_type: String,

    /// The feedback itself
    #[arg(long)]
    pub text: String,

    /// What to change (refinement feedback only)
    #[arg(long)]
    pub refinement: Option<String>,

    /// The version the user ended up approving (text, or @path)
    #[arg(long)]
    pub approved: Option<String>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RelevantArgs {
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    #[arg(long)]
    pub context: String,

    /// Only this kind: positive, negative or refinement
    #[arg(long = "type", value_name = "KIND")]
    pub feedback_type: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// `@path` reads the file; anything else is taken literally
pub fn read_text_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path)),
        None => Ok(value.to_string()),
    }
}
