// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pattern aggregation
//!
//! Turns retrieved feedback into the three pattern lists injected into a
//! generation prompt. Feedback text is reused verbatim; no summarization.

use serde::{Deserialize, Serialize};

use super::feedback::FeedbackRecord;

/// Default number of patterns kept per list
pub const DEFAULT_PATTERN_CAP: usize = 2;

/// Patterns for one generation request. Rebuilt per request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedPatterns {
    /// From positive feedback: things to repeat
    pub reinforce: Vec<String>,
    /// From negative feedback: things to avoid
    pub avoid: Vec<String>,
    /// From refinement feedback: things to change
    pub refine: Vec<String>,
}

impl AggregatedPatterns {
    pub fn is_empty(&self) -> bool {
        self.reinforce.is_empty() && self.avoid.is_empty() && self.refine.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reinforce.len() + self.avoid.len() + self.refine.len()
    }
}

#[derive(Debug, Clone)]
pub struct PatternAggregator {
    cap: usize,
}

impl PatternAggregator {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Inputs are expected in the similarity order produced by the store
    pub fn aggregate(
        &self,
        relevant_positive: &[FeedbackRecord],
        relevant_negative: &[FeedbackRecord],
        relevant_refinement: &[FeedbackRecord],
    ) -> AggregatedPatterns {
        AggregatedPatterns {
            reinforce: self.extract(relevant_positive),
            avoid: self.extract(relevant_negative),
            refine: self.extract(relevant_refinement),
        }
    }

    fn extract(&self, records: &[FeedbackRecord]) -> Vec<String> {
        records
            .iter()
            .take(self.cap)
            .map(|record| match record.refinement_instruction() {
                Some(instruction) => format!("{} → {}", record.feedback_text(), instruction),
                None => record.feedback_text().to_string(),
            })
            .collect()
    }
}

impl Default for PatternAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;

    fn record(kind: &str, text: &str, instruction: Option<&str>) -> FeedbackRecord {
        FeedbackRecord::from_submission(NewFeedback {
            profile: "default".to_string(),
            context: "ctx".to_string(),
            generated_post: "post".to_string(),
            feedback_type: kind.to_string(),
            feedback_text: text.to_string(),
            refinement_instruction: instruction.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_aggregate_preserves_order_and_caps() {
        let aggregator = PatternAggregator::new(2);
        let positive = vec![
            record("positive", "loved the honesty", None),
            record("positive", "great hook", None),
            record("positive", "nice ending", None),
        ];
        let negative = vec![record("negative", "too many hashtags", None)];

        let patterns = aggregator.aggregate(&positive, &negative, &[]);

        assert_eq!(patterns.reinforce, vec!["loved the honesty", "great hook"]);
        assert_eq!(patterns.avoid, vec!["too many hashtags"]);
        assert!(patterns.refine.is_empty());
        assert_eq!(patterns.len(), 3);
    }

    #[test]
    fn test_refinement_includes_instruction() {
        let aggregator = PatternAggregator::default();
        let refinement = vec![
            record("refinement", "too formal", Some("use first person")),
            record("refinement", "needs a story", None),
        ];

        let patterns = aggregator.aggregate(&[], &[], &refinement);

        assert_eq!(
            patterns.refine,
            vec!["too formal → use first person", "needs a story"]
        );
    }

    #[test]
    fn test_empty() {
        let patterns = PatternAggregator::default().aggregate(&[], &[], &[]);
        assert!(patterns.is_empty());
    }
}
