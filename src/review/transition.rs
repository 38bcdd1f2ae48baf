use crate::review::model::{ReviewOutcome, ReviewRecord};
use crate::review::policy::SchedulePolicy;

/// Computes the state that follows `outcome` for `record` at time `now`.
///
/// Identity fields and the version token are carried over unchanged; writing
/// the result back is the caller's job.
pub fn apply_outcome(
    policy: &SchedulePolicy,
    record: &ReviewRecord,
    outcome: ReviewOutcome,
    now: i64,
) -> ReviewRecord {
    let mut next = record.clone();

    match outcome {
        ReviewOutcome::Correct => {
            next.level = record.level.saturating_add(1);
            next.total_correct = record.total_correct.saturating_add(1);
            // A correct answer ahead of schedule still moves the due time forward.
            let base = now.max(record.next_review_time);
            next.next_review_time = base.saturating_add(policy.interval(next.level));
        }
        ReviewOutcome::Wrong => {
            let step = record.downgrade_step.max(0);
            next.level = record.level.saturating_sub(step).max(0);
            next.total_wrong = record.total_wrong.saturating_add(1);
            next.next_review_time = now.saturating_add(policy.retry_delay());
        }
    }

    next.downgrade_step = policy.downgrade_step(next.level);
    next.score = policy.score(next.level, next.total_correct, next.total_wrong);
    next
}
