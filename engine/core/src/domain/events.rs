// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the learning loop
//! Published to the EventBus for observability and integration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feedback::{FeedbackId, FeedbackKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningEvent {
    /// A feedback record was durably appended and indexed
    FeedbackRecorded {
        profile: String,
        feedback_id: FeedbackId,
        kind: FeedbackKind,
        total_records: usize,
        timestamp: DateTime<Utc>,
    },

    /// A profile index was rebuilt from its feedback log
    IndexRebuilt {
        profile: String,
        records: usize,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A post was generated with feedback patterns applied
    PostGenerated {
        profile: String,
        pattern_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A post was rewritten from a one-shot instruction
    PostRefined {
        profile: String,
        timestamp: DateTime<Utc>,
    },

    /// The generation port failed for a request
    GenerationFailed {
        profile: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl LearningEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LearningEvent::FeedbackRecorded { timestamp, .. } => *timestamp,
            LearningEvent::IndexRebuilt { timestamp, .. } => *timestamp,
            LearningEvent::PostGenerated { timestamp, .. } => *timestamp,
            LearningEvent::PostRefined { timestamp, .. } => *timestamp,
            LearningEvent::GenerationFailed { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            LearningEvent::FeedbackRecorded { .. } => "feedback_recorded",
            LearningEvent::IndexRebuilt { .. } => "index_rebuilt",
            LearningEvent::PostGenerated { .. } => "post_generated",
            LearningEvent::PostRefined { .. } => "post_refined",
            LearningEvent::GenerationFailed { .. } => "generation_failed",
        }
    }

    pub fn profile(&self) -> &str {
        match self {
            LearningEvent::FeedbackRecorded { profile, .. }
            | LearningEvent::IndexRebuilt { profile, .. }
            | LearningEvent::PostGenerated { profile, .. }
            | LearningEvent::PostRefined { profile, .. }
            | LearningEvent::GenerationFailed { profile, .. } => profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = LearningEvent::FeedbackRecorded {
            profile: "default".to_string(),
            feedback_id: FeedbackId::new(),
            kind: FeedbackKind::Positive,
            total_records: 1,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"feedback_recorded\""));
        let deserialized: LearningEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.event_type(), deserialized.event_type());
        assert_eq!(deserialized.profile(), "default");
    }
}
