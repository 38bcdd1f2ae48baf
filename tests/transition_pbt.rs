//! Property-based tests for the review transition.
//!
//! Invariants checked over arbitrary records and answer sequences:
//! - total_correct and total_wrong never decrease
//! - level never goes below zero
//! - a correct answer raises the level by one and strictly postpones the next review
//! - a wrong answer schedules the word no later than the retry delay
//! - score rises on correct answers and never rises on wrong ones

use proptest::prelude::*;

use word_recite_backend::review::{apply_outcome, ReviewOutcome, ReviewRecord, SchedulePolicy};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_outcome() -> impl Strategy<Value = ReviewOutcome> {
    prop_oneof![Just(ReviewOutcome::Correct), Just(ReviewOutcome::Wrong)]
}

fn arb_record() -> impl Strategy<Value = ReviewRecord> {
    (
        0i32..=30,                       // level
        0i32..=10,                       // downgrade_step
        0i64..=2_000_000_000,            // next_review_time
        0i32..=10_000,                   // total_correct
        0i32..=10_000,                   // total_wrong
    )
        .prop_map(|(level, downgrade_step, next_review_time, total_correct, total_wrong)| {
            let policy = SchedulePolicy::default();
            ReviewRecord {
                id: 1,
                user_id: 1,
                word_id: 1,
                level,
                downgrade_step,
                next_review_time,
                total_correct,
                total_wrong,
                score: policy.score(level, total_correct, total_wrong),
                version: 0,
            }
        })
}

fn arb_policy() -> impl Strategy<Value = SchedulePolicy> {
    (
        prop::collection::vec(1i64..=100_000, 1..12), // interval increments
        prop::collection::vec(0i32..=3, 1..10),       // step increments
        1i64..=3_600,                                 // retry delay
        1i64..=1_000,                                 // level weight
        0i64..=1_000,                                 // accuracy weight
    )
        .prop_map(|(interval_deltas, step_deltas, retry_delay_secs, level_weight, accuracy_weight)| {
            let mut intervals_secs = vec![0];
            for delta in interval_deltas {
                let last = *intervals_secs.last().unwrap();
                intervals_secs.push(last + delta);
            }
            let mut downgrade_steps = Vec::new();
            let mut step = 0;
            for delta in step_deltas {
                step += delta;
                downgrade_steps.push(step);
            }
            SchedulePolicy {
                intervals_secs,
                downgrade_steps,
                retry_delay_secs,
                level_weight,
                accuracy_weight,
            }
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn generated_policies_are_valid(policy in arb_policy()) {
        prop_assert!(policy.validate().is_ok());
    }

    #[test]
    fn single_step_invariants(
        policy in arb_policy(),
        record in arb_record(),
        outcome in arb_outcome(),
        now in 0i64..=2_000_000_000,
    ) {
        let record = ReviewRecord {
            score: policy.score(record.level, record.total_correct, record.total_wrong),
            ..record
        };
        let next = apply_outcome(&policy, &record, outcome, now);

        prop_assert!(next.level >= 0);
        prop_assert!(next.downgrade_step >= 0);
        prop_assert!(next.total_correct >= record.total_correct);
        prop_assert!(next.total_wrong >= record.total_wrong);
        prop_assert_eq!(next.id, record.id);
        prop_assert_eq!(next.user_id, record.user_id);
        prop_assert_eq!(next.word_id, record.word_id);
        prop_assert_eq!(next.version, record.version);
        prop_assert_eq!(next.downgrade_step, policy.downgrade_step(next.level));

        match outcome {
            ReviewOutcome::Correct => {
                prop_assert_eq!(next.level, record.level + 1);
                prop_assert_eq!(next.total_correct, record.total_correct + 1);
                prop_assert_eq!(next.total_wrong, record.total_wrong);
                prop_assert!(next.next_review_time > record.next_review_time);
                prop_assert!(next.next_review_time > now);
                prop_assert!(next.score > record.score);
            }
            ReviewOutcome::Wrong => {
                prop_assert_eq!(next.level, (record.level - record.downgrade_step).max(0));
                prop_assert_eq!(next.total_wrong, record.total_wrong + 1);
                prop_assert_eq!(next.total_correct, record.total_correct);
                prop_assert_eq!(next.next_review_time, now + policy.retry_delay());
                prop_assert!(next.score <= record.score);
            }
        }
    }

    #[test]
    fn answer_sequences_keep_counters_monotonic(
        outcomes in prop::collection::vec(arb_outcome(), 0..60),
    ) {
        let policy = SchedulePolicy::default();
        let mut record = word_recite_backend::review::NewReviewRecord::first_review(1, 1, &policy)
            .into_record(1);
        let mut now = 1_700_000_000i64;

        for outcome in outcomes {
            let next = apply_outcome(&policy, &record, outcome, now);
            prop_assert!(next.total_correct >= record.total_correct);
            prop_assert!(next.total_wrong >= record.total_wrong);
            prop_assert!(next.level >= 0);
            prop_assert!(next.score >= 0);
            prop_assert_eq!(
                i64::from(next.total_correct + next.total_wrong),
                i64::from(record.total_correct + record.total_wrong) + 1
            );
            now += 30;
            record = next;
        }
    }

    #[test]
    fn wrong_answers_never_go_below_zero(
        record in arb_record(),
        wrongs in 1usize..20,
    ) {
        let policy = SchedulePolicy::default();
        let mut current = record;
        for _ in 0..wrongs {
            current = apply_outcome(&policy, &current, ReviewOutcome::Wrong, 1_700_000_000);
            prop_assert!(current.level >= 0);
        }
    }
}
