use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_INTERVALS_SECS: [i64; 10] = [
    0,
    5 * 60,
    30 * 60,
    12 * 60 * 60,
    24 * 60 * 60,
    2 * 24 * 60 * 60,
    4 * 24 * 60 * 60,
    7 * 24 * 60 * 60,
    15 * 24 * 60 * 60,
    30 * 24 * 60 * 60,
];
const DEFAULT_DOWNGRADE_STEPS: [i32; 9] = [1, 1, 1, 2, 2, 2, 3, 3, 4];
const DEFAULT_RETRY_DELAY_SECS: i64 = 60;
const DEFAULT_LEVEL_WEIGHT: i64 = 100;
const DEFAULT_ACCURACY_WEIGHT: i64 = 100;

/// Scheduling curves applied by [`crate::review::transition::apply_outcome`].
///
/// `intervals_secs` and `downgrade_steps` are indexed by level; levels past the
/// end of a table reuse its last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePolicy {
    pub intervals_secs: Vec<i64>,
    pub downgrade_steps: Vec<i32>,
    pub retry_delay_secs: i64,
    pub level_weight: i64,
    pub accuracy_weight: i64,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            intervals_secs: DEFAULT_INTERVALS_SECS.to_vec(),
            downgrade_steps: DEFAULT_DOWNGRADE_STEPS.to_vec(),
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            level_weight: DEFAULT_LEVEL_WEIGHT,
            accuracy_weight: DEFAULT_ACCURACY_WEIGHT,
        }
    }
}

impl SchedulePolicy {
    pub fn from_env() -> Result<Self, PolicyError> {
        let defaults = Self::default();

        let intervals_secs = env_list("REVIEW_INTERVALS_SECS")?.unwrap_or(defaults.intervals_secs);
        let downgrade_steps =
            env_list("REVIEW_DOWNGRADE_STEPS")?.unwrap_or(defaults.downgrade_steps);
        let retry_delay_secs =
            env_scalar("REVIEW_RETRY_DELAY_SECS")?.unwrap_or(defaults.retry_delay_secs);
        let (level_weight, accuracy_weight) = match env_list::<i64>("REVIEW_SCORE_WEIGHTS")? {
            Some(weights) if weights.len() == 2 => (weights[0], weights[1]),
            Some(_) => {
                return Err(PolicyError::InvalidValue {
                    key: "REVIEW_SCORE_WEIGHTS",
                    reason: "expected two comma-separated integers: level,accuracy".to_string(),
                })
            }
            None => (defaults.level_weight, defaults.accuracy_weight),
        };

        let policy = Self {
            intervals_secs,
            downgrade_steps,
            retry_delay_secs,
            level_weight,
            accuracy_weight,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.intervals_secs.is_empty() {
            return Err(PolicyError::Invalid("intervals must not be empty".to_string()));
        }
        if self.intervals_secs.iter().any(|v| *v < 0) {
            return Err(PolicyError::Invalid("intervals must be non-negative".to_string()));
        }
        if self.intervals_secs.windows(2).any(|w| w[1] < w[0]) {
            return Err(PolicyError::Invalid(
                "intervals must be non-decreasing in level".to_string(),
            ));
        }
        // Non-decreasing, so every level >= 1 is covered by this check.
        if self.interval(1) <= 0 {
            return Err(PolicyError::Invalid(
                "intervals for level 1 and above must be positive".to_string(),
            ));
        }

        if self.downgrade_steps.is_empty() {
            return Err(PolicyError::Invalid("downgrade steps must not be empty".to_string()));
        }
        if self.downgrade_steps.iter().any(|v| *v < 0) {
            return Err(PolicyError::Invalid(
                "downgrade steps must be non-negative".to_string(),
            ));
        }
        if self.downgrade_steps.windows(2).any(|w| w[1] < w[0]) {
            return Err(PolicyError::Invalid(
                "downgrade steps must be non-decreasing in level".to_string(),
            ));
        }

        if self.retry_delay_secs <= 0 {
            return Err(PolicyError::Invalid("retry delay must be positive".to_string()));
        }
        if self.level_weight <= 0 || self.accuracy_weight < 0 {
            return Err(PolicyError::Invalid(
                "level weight must be positive and accuracy weight non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Seconds until the next review after reaching `level` with a correct answer.
    pub fn interval(&self, level: i32) -> i64 {
        lookup(&self.intervals_secs, level)
    }

    pub fn downgrade_step(&self, level: i32) -> i32 {
        lookup(&self.downgrade_steps, level)
    }

    pub fn retry_delay(&self) -> i64 {
        self.retry_delay_secs
    }

    /// Level dominates; accuracy (percent of correct answers) breaks ties.
    pub fn score(&self, level: i32, total_correct: i32, total_wrong: i32) -> i64 {
        let level = i64::from(level.max(0));
        let correct = i64::from(total_correct.max(0));
        let answered = correct + i64::from(total_wrong.max(0));
        let accuracy_pct = if answered == 0 { 0 } else { correct * 100 / answered };

        level
            .saturating_mul(self.level_weight)
            .saturating_add(accuracy_pct.saturating_mul(self.accuracy_weight) / 100)
    }
}

fn lookup<T: Copy + Default>(table: &[T], level: i32) -> T {
    let index = usize::try_from(level.max(0)).unwrap_or(0);
    table
        .get(index)
        .or_else(|| table.last())
        .copied()
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("invalid schedule policy: {0}")]
    Invalid(String),
}

fn env_list<T: std::str::FromStr>(key: &'static str) -> Result<Option<Vec<T>>, PolicyError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    raw.split(',')
        .map(|part| {
            part.trim().parse::<T>().map_err(|_| PolicyError::InvalidValue {
                key,
                reason: format!("{:?} is not an integer", part.trim()),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn env_scalar<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, PolicyError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| PolicyError::InvalidValue {
            key,
            reason: format!("{:?} is not an integer", raw.trim()),
        })
}
