use std::collections::HashMap;

use crate::db::operations::review_records as store;
use crate::db::DatabaseProxy;
use crate::review::{apply_outcome, NewReviewRecord, RecordError, ReviewOutcome, ReviewRecord, SchedulePolicy};

/// Bound on full read-transition-write cycles when a concurrent writer wins.
pub const MAX_ANSWER_ATTEMPTS: usize = 5;

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Applies one review answer for `(user_id, word_id)` and persists the result.
///
/// A missing record is created at level 0 before the answer is applied. When
/// another writer updates (or creates) the same record between the read and
/// the write, the whole cycle restarts from a fresh read.
pub async fn record_answer(
    proxy: &DatabaseProxy,
    policy: &SchedulePolicy,
    user_id: i64,
    word_id: i64,
    outcome: ReviewOutcome,
    now: i64,
) -> Result<ReviewRecord, RecordError> {
    validate_ids(user_id, Some(word_id))?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        match answer_once(proxy, policy, user_id, word_id, outcome, now).await {
            Ok(record) => return Ok(record),
            Err(err) if err.is_retryable_cycle() && attempt < MAX_ANSWER_ATTEMPTS => {
                tracing::warn!(user_id, word_id, attempt, error = %err, "retrying review answer");
            }
            Err(err) => return Err(err),
        }
    }
}

async fn answer_once(
    proxy: &DatabaseProxy,
    policy: &SchedulePolicy,
    user_id: i64,
    word_id: i64,
    outcome: ReviewOutcome,
    now: i64,
) -> Result<ReviewRecord, RecordError> {
    let current = match store::get_review_record(proxy, user_id, word_id).await {
        Ok(record) => record,
        Err(RecordError::NotFound { .. }) => {
            let fresh = NewReviewRecord::first_review(user_id, word_id, policy);
            let id = store::insert_review_record(proxy, &fresh).await?;
            fresh.into_record(id)
        }
        Err(err) => return Err(err),
    };

    let next = apply_outcome(policy, &current, outcome, now);
    let stored = store::update_review_record(proxy, &next).await?;

    tracing::info!(
        user_id,
        word_id,
        %outcome,
        level = stored.level,
        score = stored.score,
        "review answer recorded"
    );
    Ok(stored)
}

pub async fn create_record(
    proxy: &DatabaseProxy,
    policy: &SchedulePolicy,
    user_id: i64,
    word_id: i64,
) -> Result<ReviewRecord, RecordError> {
    validate_ids(user_id, Some(word_id))?;
    let fresh = NewReviewRecord::first_review(user_id, word_id, policy);
    let id = store::insert_review_record(proxy, &fresh).await?;
    Ok(fresh.into_record(id))
}

pub async fn get_record(
    proxy: &DatabaseProxy,
    user_id: i64,
    word_id: i64,
) -> Result<ReviewRecord, RecordError> {
    validate_ids(user_id, Some(word_id))?;
    store::get_review_record(proxy, user_id, word_id).await
}

pub async fn batch_get_records(
    proxy: &DatabaseProxy,
    user_id: i64,
    word_ids: &[i64],
) -> Result<HashMap<i64, ReviewRecord>, RecordError> {
    validate_ids(user_id, None)?;
    if let Some(bad) = word_ids.iter().find(|id| **id <= 0) {
        return Err(RecordError::Validation(format!(
            "wordIds must be positive, got {bad}"
        )));
    }
    store::get_review_records_by_word_ids(proxy, user_id, word_ids).await
}

pub async fn list_due(
    proxy: &DatabaseProxy,
    user_id: i64,
    as_of: Option<i64>,
) -> Result<Vec<ReviewRecord>, RecordError> {
    validate_ids(user_id, None)?;
    store::get_due_review_records(proxy, user_id, as_of.unwrap_or_else(now_secs)).await
}

pub async fn completed_count(proxy: &DatabaseProxy, user_id: i64) -> Result<i64, RecordError> {
    validate_ids(user_id, None)?;
    store::count_completed_words(proxy, user_id).await
}

pub async fn delete_all(proxy: &DatabaseProxy, user_id: i64) -> Result<u64, RecordError> {
    validate_ids(user_id, None)?;
    store::delete_review_records_by_user(proxy, user_id).await
}

fn validate_ids(user_id: i64, word_id: Option<i64>) -> Result<(), RecordError> {
    if user_id <= 0 {
        return Err(RecordError::Validation(format!(
            "userId must be positive, got {user_id}"
        )));
    }
    match word_id {
        Some(id) if id <= 0 => Err(RecordError::Validation(format!(
            "wordId must be positive, got {id}"
        ))),
        _ => Ok(()),
    }
}
