// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Post writing commands
//!
//! Commands: generate, regenerate, refine, prompt

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use ghostwriter_core::ProfileName;

use super::{read_text_arg, RefineArgs, RequestArgs};
use crate::engine::Engine;

pub async fn generate(
    args: RequestArgs,
    config_path: Option<PathBuf>,
    verbose: bool,
    regenerate: bool,
) -> Result<()> {
    let mut engine = Engine::new(config_path, verbose)?;
    let profile = ProfileName::new(args.profile.as_str())?;

    let result = if regenerate {
        engine
            .generator
            .regenerate(&profile, &args.context, &args.instruction)
            .await
    } else {
        engine
            .generator
            .generate(&profile, &args.context, &args.instruction)
            .await
    };
    engine.print_events();

    let post = result.context("Generation failed")?;
    println!("{}", post);
    Ok(())
}

pub async fn refine(args: RefineArgs, config_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let mut engine = Engine::new(config_path, verbose)?;
    let profile = ProfileName::new(args.profile.as_str())?;
    let original = read_text_arg(&args.post)?;

    let result = engine
        .generator
        .refine(&profile, &original, &args.feedback, &args.context)
        .await;
    engine.print_events();

    let refined = result.context("Refinement failed")?;
    println!("{}", refined);
    eprintln!(
        "{}",
        "Not saved. Use `ghostwriter feedback` to teach this change.".dimmed()
    );
    Ok(())
}

pub async fn prompt(args: RequestArgs, config_path: Option<PathBuf>) -> Result<()> {
    let engine = Engine::new(config_path, false)?;
    let profile = ProfileName::new(args.profile.as_str())?;

    let prepared = engine
        .generator
        .prepare_prompt(&profile, &args.context, &args.instruction)
        .await
        .context("Failed to compose prompt")?;

    eprintln!(
        "{}",
        format!(
            "{} style examples, {} feedback patterns",
            prepared.style_examples,
            prepared.patterns.len()
        )
        .dimmed()
    );
    println!("{}", prepared.prompt);
    Ok(())
}
