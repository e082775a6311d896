// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt
//!
//! Builds generation prompts from style examples, the user's request and
//! aggregated feedback patterns.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure, deterministic prompt composition. Identical inputs
//!   produce byte-identical prompts; nothing time- or random-dependent is
//!   embedded.

use std::fmt::Write;

use super::patterns::AggregatedPatterns;

pub const POSITIVE_HEADING: &str = "POSITIVE PATTERNS TO FOLLOW:";
pub const NEGATIVE_HEADING: &str = "NEGATIVE PATTERNS TO AVOID:";
pub const REFINEMENT_HEADING: &str = "REFINEMENT SUGGESTIONS TO CONSIDER:";

const OUTPUT_RULES: &str = "CRITICAL INSTRUCTIONS:
- Write ONLY the LinkedIn post content
- Do NOT include any explanations, analysis, or meta-commentary
- Do NOT mention feedback patterns or voice analysis
- Do NOT start with phrases like \"Here's a LinkedIn post that...\"
- Write as if you ARE the user posting directly";

const REFINEMENT_RULES: &str = "CRITICAL INSTRUCTIONS:
- Revise the post incorporating the feedback
- Write ONLY the revised LinkedIn post content
- Do NOT include explanations or meta-commentary
- Do NOT mention the revision process
- Write as if you ARE the user posting directly";

#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(
        &self,
        style_examples: &[String],
        context: &str,
        instruction: &str,
        patterns: &AggregatedPatterns,
    ) -> String {
        let mut prompt = String::from(
            "You are an AI assistant helping to write LinkedIn posts in the user's authentic voice and style.\n\n",
        );

        prompt.push_str("Here are some examples of the user's writing style:\n\n");
        for (i, example) in style_examples.iter().enumerate() {
            if i > 0 {
                prompt.push_str("\n\n");
            }
            // Writing to a String cannot fail.
            let _ = write!(prompt, "Example {}:\n{}", i + 1, example.trim());
        }
        prompt.push('\n');

        if !patterns.is_empty() {
            prompt.push_str("\nBased on previous user feedback for similar content:\n");
            push_pattern_list(&mut prompt, POSITIVE_HEADING, &patterns.reinforce);
            push_pattern_list(&mut prompt, NEGATIVE_HEADING, &patterns.avoid);
            push_pattern_list(&mut prompt, REFINEMENT_HEADING, &patterns.refine);
            prompt.push_str(
                "\nIMPORTANT: Use the positive patterns, avoid the negative patterns, and consider the refinement suggestions when generating the post.\n",
            );
        }

        prompt.push_str("\nNow create a LinkedIn post about the following topic:\n\n");
        let _ = writeln!(prompt, "Context: {}", context.trim());

        let instruction = instruction.trim();
        if !instruction.is_empty() {
            let _ = writeln!(prompt, "\nAdditional Instructions: {}", instruction);
        }

        prompt.push('\n');
        prompt.push_str(OUTPUT_RULES);
        prompt.push_str("\n\nLinkedIn Post:");
        prompt
    }

    /// Narrow prompt for a one-shot rewrite; no stored patterns involved
    pub fn compose_refinement(&self, original_post: &str, feedback_text: &str, context: &str) -> String {
        format!(
            "You are helping to refine a LinkedIn post based on user feedback.\n\n\
             Original Post:\n{original_post}\n\n\
             User Feedback:\n{feedback_text}\n\n\
             Context: {context}\n\n\
             {REFINEMENT_RULES}\n\n\
             Revised Post:"
        )
    }
}

fn push_pattern_list(prompt: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "\n{}", heading);
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(prompt, "   {}. {}", i + 1, item);
    }
}
