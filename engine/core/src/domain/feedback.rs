// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Feedback
//!
//! Feedback records left by a user on generated posts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Immutable record of one user reaction, validated at
//!   construction, plus the per-profile summary view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::ValidationError;
use super::profile::ProfileName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Classification of a user reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Positive,
    Negative,
    Refinement,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 3] = [
        FeedbackKind::Positive,
        FeedbackKind::Negative,
        FeedbackKind::Refinement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Positive => "positive",
            FeedbackKind::Negative => "negative",
            FeedbackKind::Refinement => "refinement",
        }
    }
}

impl FromStr for FeedbackKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(FeedbackKind::Positive),
            "negative" => Ok(FeedbackKind::Negative),
            "refinement" => Ok(FeedbackKind::Refinement),
            other => Err(ValidationError::UnknownFeedbackKind(other.to_string())),
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload. Only refinements carry an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feedback_type", rename_all = "snake_case")]
pub enum FeedbackSignal {
    Positive,
    Negative,
    Refinement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refinement_instruction: Option<String>,
    },
}

impl FeedbackSignal {
    pub fn kind(&self) -> FeedbackKind {
        match self {
            FeedbackSignal::Positive => FeedbackKind::Positive,
            FeedbackSignal::Negative => FeedbackKind::Negative,
            FeedbackSignal::Refinement { .. } => FeedbackKind::Refinement,
        }
    }

    pub fn refinement_instruction(&self) -> Option<&str> {
        match self {
            FeedbackSignal::Refinement {
                refinement_instruction: Some(instruction),
            } => Some(instruction.as_str()),
            _ => None,
        }
    }
}

/// Unvalidated feedback submission as received from the API layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFeedback {
    pub profile: String,
    pub context: String,
    #[serde(default)]
    pub instruction: String,
    pub generated_post: String,
    pub feedback_type: String,
    pub feedback_text: String,
    #[serde(default)]
    pub refinement_instruction: Option<String>,
    #[serde(default)]
    pub approved_version: Option<String>,
}

/// One immutable piece of user feedback.
///
/// The embedding is not part of the record; it is computed once from
/// [`FeedbackRecord::canonical_text`] when the record is appended and kept in
/// the profile's similarity index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    id: FeedbackId,
    timestamp: DateTime<Utc>,
    profile_name: ProfileName,
    original_context: String,
    original_instruction: String,
    generated_post: String,
    #[serde(flatten)]
    signal: FeedbackSignal,
    feedback_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_version: Option<String>,
}

impl FeedbackRecord {
    /// Validate a submission and stamp it with an id and the current time
    pub fn from_submission(submission: NewFeedback) -> Result<Self, ValidationError> {
        Self::from_submission_at(submission, Utc::now())
    }

    pub fn from_submission_at(
        submission: NewFeedback,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let profile_name = ProfileName::new(submission.profile)?;
        let kind: FeedbackKind = submission.feedback_type.parse()?;

        if submission.feedback_text.trim().is_empty() {
            return Err(ValidationError::EmptyField("feedback_text"));
        }

        // Empty strings from form fields count as absent.
        let refinement_instruction = submission
            .refinement_instruction
            .filter(|s| !s.trim().is_empty());

        let signal = match kind {
            FeedbackKind::Positive | FeedbackKind::Negative => {
                if refinement_instruction.is_some() {
                    return Err(ValidationError::UnexpectedRefinementInstruction(
                        kind.to_string(),
                    ));
                }
                if kind == FeedbackKind::Positive {
                    FeedbackSignal::Positive
                } else {
                    FeedbackSignal::Negative
                }
            }
            FeedbackKind::Refinement => FeedbackSignal::Refinement {
                refinement_instruction,
            },
        };

        Ok(Self {
            id: FeedbackId::new(),
            timestamp,
            profile_name,
            original_context: submission.context,
            original_instruction: submission.instruction,
            generated_post: submission.generated_post,
            signal,
            feedback_text: submission.feedback_text,
            approved_version: submission.approved_version.filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn id(&self) -> FeedbackId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn profile_name(&self) -> &ProfileName {
        &self.profile_name
    }

    pub fn original_context(&self) -> &str {
        &self.original_context
    }

    pub fn original_instruction(&self) -> &str {
        &self.original_instruction
    }

    pub fn generated_post(&self) -> &str {
        &self.generated_post
    }

    pub fn kind(&self) -> FeedbackKind {
        self.signal.kind()
    }

    pub fn signal(&self) -> &FeedbackSignal {
        &self.signal
    }

    pub fn feedback_text(&self) -> &str {
        &self.feedback_text
    }

    pub fn refinement_instruction(&self) -> Option<&str> {
        self.signal.refinement_instruction()
    }

    pub fn approved_version(&self) -> Option<&str> {
        self.approved_version.as_deref()
    }

    /// Text that gets embedded: one labeled line per field, fixed order
    pub fn canonical_text(&self) -> String {
        format!(
            "Context: {}\nInstruction: {}\nGenerated: {}\nFeedback Type: {}\nFeedback: {}\nRefinement: {}",
            self.original_context,
            self.original_instruction,
            self.generated_post,
            self.kind(),
            self.feedback_text,
            self.refinement_instruction().unwrap_or(""),
        )
    }
}

/// Recent feedback entry shown in the profile summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFeedback {
    pub feedback_text: String,
    pub feedback_type: FeedbackKind,
    pub timestamp: DateTime<Utc>,
}

impl From<&FeedbackRecord> for RecentFeedback {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            feedback_text: record.feedback_text.clone(),
            feedback_type: record.kind(),
            timestamp: record.timestamp,
        }
    }
}

/// Per-profile learning summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub refinements: usize,
    /// `positive - negative`
    pub learning_score: i64,
    pub recent: Vec<RecentFeedback>,
}

impl FeedbackSummary {
    /// Count records by kind and keep the `recent_limit` newest by timestamp
    pub fn from_records(records: &[FeedbackRecord], recent_limit: usize) -> Self {
        let count = |kind: FeedbackKind| records.iter().filter(|r| r.kind() == kind).count();
        let positive = count(FeedbackKind::Positive);
        let negative = count(FeedbackKind::Negative);

        Self {
            total: records.len(),
            positive,
            negative,
            refinements: count(FeedbackKind::Refinement),
            learning_score: positive as i64 - negative as i64,
            recent: most_recent(records, recent_limit)
                .into_iter()
                .map(RecentFeedback::from)
                .collect(),
        }
    }
}

/// Newest first by timestamp; later insertion wins on equal timestamps
pub fn most_recent(records: &[FeedbackRecord], limit: usize) -> Vec<&FeedbackRecord> {
    let mut ordered: Vec<(usize, &FeedbackRecord)> = records.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
    ordered.into_iter().take(limit).map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn submission(kind: &str, text: &str) -> NewFeedback {
        NewFeedback {
            profile: "default".to_string(),
            context: "failed interview".to_string(),
            instruction: "keep it hopeful".to_string(),
            generated_post: "today i failed my interview.".to_string(),
            feedback_type: kind.to_string(),
            feedback_text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Positive".parse::<FeedbackKind>().unwrap(), FeedbackKind::Positive);
        assert_eq!(
            "meh".parse::<FeedbackKind>(),
            Err(ValidationError::UnknownFeedbackKind("meh".to_string()))
        );
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            FeedbackRecord::from_submission(submission("positive", "  ")),
            Err(ValidationError::EmptyField("feedback_text"))
        );

        let mut with_instruction = submission("negative", "too long");
        with_instruction.refinement_instruction = Some("shorter".to_string());
        assert!(matches!(
            FeedbackRecord::from_submission(with_instruction),
            Err(ValidationError::UnexpectedRefinementInstruction(_))
        ));

        let mut blank_instruction = submission("negative", "too long");
        blank_instruction.refinement_instruction = Some(String::new());
        let record = FeedbackRecord::from_submission(blank_instruction).unwrap();
        assert_eq!(record.kind(), FeedbackKind::Negative);
        assert_eq!(record.refinement_instruction(), None);
    }

    #[test]
    fn test_canonical_text() {
        let mut refinement = submission("refinement", "needs a hook");
        refinement.refinement_instruction = Some("open with a question".to_string());
        let record = FeedbackRecord::from_submission(refinement).unwrap();

        assert_eq!(
            record.canonical_text(),
            "Context: failed interview\nInstruction: keep it hopeful\nGenerated: today i failed my interview.\nFeedback Type: refinement\nFeedback: needs a hook\nRefinement: open with a question"
        );
    }

    #[test]
    fn test_log_serialization_shape() {
        let mut refinement = submission("refinement", "needs a hook");
        refinement.refinement_instruction = Some("open with a question".to_string());
        let record = FeedbackRecord::from_submission(refinement).unwrap();

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["feedback_type"], "refinement");
        assert_eq!(json["refinement_instruction"], "open with a question");
        assert_eq!(json["profile_name"], "default");

        let positive = FeedbackRecord::from_submission(submission("positive", "great")).unwrap();
        let json = serde_json::to_string(&positive).unwrap();
        assert!(!json.contains("refinement_instruction"));
        let back: FeedbackRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, positive);
    }

    #[test]
    fn test_summary() {
        let now = Utc::now();
        let records = vec![
            FeedbackRecord::from_submission_at(submission("positive", "a"), now - Duration::seconds(3)).unwrap(),
            FeedbackRecord::from_submission_at(submission("negative", "b"), now - Duration::seconds(2)).unwrap(),
            FeedbackRecord::from_submission_at(submission("positive", "c"), now - Duration::seconds(1)).unwrap(),
            FeedbackRecord::from_submission_at(submission("refinement", "d"), now).unwrap(),
        ];

        let summary = FeedbackSummary::from_records(&records, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.refinements, 1);
        assert_eq!(summary.learning_score, 1);
        let recent: Vec<_> = summary.recent.iter().map(|r| r.feedback_text.as_str()).collect();
        assert_eq!(recent, vec!["d", "c"]);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FeedbackSummary::from_records(&[], 5), FeedbackSummary::default());
    }
}
