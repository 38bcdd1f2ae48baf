use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::review::error::RecordError;
use crate::review::policy::SchedulePolicy;

/// Level at or above which a word counts as completed.
pub const COMPLETION_LEVEL: i32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: i64,
    pub user_id: i64,
    pub word_id: i64,
    pub level: i32,
    pub downgrade_step: i32,
    pub next_review_time: i64,
    pub total_correct: i32,
    pub total_wrong: i32,
    pub score: i64,
    pub version: i64,
}

impl ReviewRecord {
    pub fn is_completed(&self) -> bool {
        self.level >= COMPLETION_LEVEL
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        validate_fields(
            self.level,
            self.downgrade_step,
            self.total_correct,
            self.total_wrong,
            self.score,
        )
    }
}

/// A record that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewRecord {
    pub user_id: i64,
    pub word_id: i64,
    pub level: i32,
    pub downgrade_step: i32,
    pub next_review_time: i64,
    pub total_correct: i32,
    pub total_wrong: i32,
    pub score: i64,
}

impl NewReviewRecord {
    /// Initial state for a word the learner is about to review for the first time.
    pub fn first_review(user_id: i64, word_id: i64, policy: &SchedulePolicy) -> Self {
        Self {
            user_id,
            word_id,
            level: 0,
            downgrade_step: policy.downgrade_step(0),
            next_review_time: 0,
            total_correct: 0,
            total_wrong: 0,
            score: 0,
        }
    }

    pub fn into_record(self, id: i64) -> ReviewRecord {
        ReviewRecord {
            id,
            user_id: self.user_id,
            word_id: self.word_id,
            level: self.level,
            downgrade_step: self.downgrade_step,
            next_review_time: self.next_review_time,
            total_correct: self.total_correct,
            total_wrong: self.total_wrong,
            score: self.score,
            version: 0,
        }
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        validate_fields(
            self.level,
            self.downgrade_step,
            self.total_correct,
            self.total_wrong,
            self.score,
        )
    }
}

fn validate_fields(
    level: i32,
    downgrade_step: i32,
    total_correct: i32,
    total_wrong: i32,
    score: i64,
) -> Result<(), RecordError> {
    let fields = [
        ("level", i64::from(level)),
        ("downgradeStep", i64::from(downgrade_step)),
        ("totalCorrect", i64::from(total_correct)),
        ("totalWrong", i64::from(total_wrong)),
        ("score", score),
    ];
    for (name, value) in fields {
        if value < 0 {
            return Err(RecordError::Validation(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Correct,
    Wrong,
}

impl ReviewOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReviewOutcome::Correct => "correct",
            ReviewOutcome::Wrong => "wrong",
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewOutcome {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(ReviewOutcome::Correct),
            "wrong" => Ok(ReviewOutcome::Wrong),
            other => Err(RecordError::Validation(format!(
                "outcome must be one of correct, wrong; got {other:?}"
            ))),
        }
    }
}
