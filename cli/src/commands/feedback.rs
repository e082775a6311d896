// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Feedback memory commands
//!
//! Commands: feedback, summary, relevant

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use ghostwriter_core::domain::feedback::NewFeedback;
use ghostwriter_core::{FeedbackKind, FeedbackSummary, ProfileName};

use super::{read_text_arg, FeedbackArgs, RelevantArgs, SummaryArgs};
use crate::engine::Engine;

pub async fn submit(args: FeedbackArgs, config_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let mut engine = Engine::new(config_path, verbose)?;

    let submission = NewFeedback {
        profile: args.profile,
        context: args.context,
        instruction: args.instruction,
        generated_post: read_text_arg(&args.post)?,
        feedback_type: args.feedback_type,
        feedback_text: args.text,
        refinement_instruction: args.refinement,
        approved_version: args.approved.as_deref().map(read_text_arg).transpose()?,
    };

    let result = engine.generator.submit_feedback(submission).await;
    engine.print_events();

    let id = result.context("Failed to record feedback")?;
    println!("{} {}", "✓ Feedback recorded:".green(), id);
    Ok(())
}

pub async fn summary(args: SummaryArgs, config_path: Option<PathBuf>) -> Result<()> {
    let engine = Engine::new(config_path, false)?;
    let profile = ProfileName::new(args.profile.as_str())?;

    let summary = engine
        .generator
        .feedback_summary(&profile)
        .await
        .context("Failed to load feedback summary")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&profile, &summary);
    }
    Ok(())
}

fn print_summary(profile: &ProfileName, summary: &FeedbackSummary) {
    println!("{}", format!("Feedback summary for {}", profile).bold());
    println!("  Total:        {}", summary.total);
    println!("  Positive:     {}", summary.positive.to_string().green());
    println!("  Negative:     {}", summary.negative.to_string().red());
    println!("  Refinements:  {}", summary.refinements.to_string().yellow());
    println!("  Learning score: {}", summary.learning_score);

    if summary.recent.is_empty() {
        return;
    }
    println!();
    println!("{}", "Recent feedback:".bold());
    for entry in &summary.recent {
        println!(
            "  {} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.feedback_type,
            entry.feedback_text
        );
    }
}

pub async fn relevant(args: RelevantArgs, config_path: Option<PathBuf>) -> Result<()> {
    let engine = Engine::new(config_path, false)?;
    let profile = ProfileName::new(args.profile.as_str())?;
    let kind = args
        .feedback_type
        .as_deref()
        .map(str::parse::<FeedbackKind>)
        .transpose()?;

    let records = engine
        .generator
        .relevant_feedback(&profile, &args.context, kind)
        .await
        .context("Failed to query feedback")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No stored feedback for this profile.".dimmed());
        return Ok(());
    }
    for (i, record) in records.iter().enumerate() {
        println!(
            "{}. [{}] {}",
            i + 1,
            record.kind(),
            record.feedback_text().bold()
        );
        if let Some(instruction) = record.refinement_instruction() {
            println!("   → {}", instruction);
        }
        println!("   {} {}", "context:".dimmed(), record.original_context());
    }
    Ok(())
}
