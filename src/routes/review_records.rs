use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::{ok, AppError};
use crate::review::{ReviewOutcome, ReviewRecord};
use crate::services::review_records;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id/reviews", post(answer))
        .route("/:user_id/records", post(create).delete(delete_all))
        .route("/:user_id/records/batch", post(batch_get))
        .route("/:user_id/records/due", get(due_list))
        .route("/:user_id/records/completed-count", get(completed_count))
        .route("/:user_id/records/:word_id", get(get_one))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    word_id: i64,
    outcome: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    word_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    word_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DueQuery {
    as_of: Option<i64>,
}

#[derive(Serialize)]
struct CountResponse {
    count: i64,
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: u64,
}

async fn answer(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let outcome: ReviewOutcome = payload.outcome.parse()?;

    let proxy = state.require_db()?;
    let record = review_records::record_answer(
        proxy.as_ref(),
        state.policy().as_ref(),
        user_id,
        payload.word_id,
        outcome,
        review_records::now_secs(),
    )
    .await?;

    Ok(ok(record))
}

async fn create(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let record = review_records::create_record(
        proxy.as_ref(),
        state.policy().as_ref(),
        user_id,
        payload.word_id,
    )
    .await?;

    Ok((StatusCode::CREATED, ok(record)).into_response())
}

async fn get_one(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path((user_id, word_id)) = ids.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let record = review_records::get_record(proxy.as_ref(), user_id, word_id).await?;
    Ok(ok(record))
}

async fn batch_get(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let records: HashMap<i64, ReviewRecord> =
        review_records::batch_get_records(proxy.as_ref(), user_id, &payload.word_ids).await?;
    Ok(ok(records))
}

async fn due_list(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<DueQuery>, QueryRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let records = review_records::list_due(proxy.as_ref(), user_id, query.as_of).await?;
    Ok(ok(records))
}

async fn completed_count(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let count = review_records::completed_count(proxy.as_ref(), user_id).await?;
    Ok(ok(CountResponse { count }))
}

async fn delete_all(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<impl Serialize>, AppError> {
    let Path(user_id) = user_id.map_err(|e| AppError::validation(e.body_text()))?;

    let proxy = state.require_db()?;
    let deleted = review_records::delete_all(proxy.as_ref(), user_id).await?;
    Ok(ok(DeletedResponse { deleted }))
}
