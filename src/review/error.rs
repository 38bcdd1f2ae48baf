use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("review record not found: user_id={user_id}, word_id={word_id}")]
    NotFound { user_id: i64, word_id: i64 },
    #[error("review record already exists: user_id={user_id}, word_id={word_id}")]
    Conflict { user_id: i64, word_id: i64 },
    #[error("review record changed concurrently: user_id={user_id}, word_id={word_id}")]
    Stale { user_id: i64, word_id: i64 },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage unavailable: {0}")]
    Transient(#[from] sqlx::Error),
}

impl RecordError {
    pub fn is_retryable_cycle(&self) -> bool {
        matches!(self, RecordError::Stale { .. } | RecordError::Conflict { .. })
    }
}
