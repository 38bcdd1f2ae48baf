use std::collections::{BTreeSet, HashMap};

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::db::DatabaseProxy;
use crate::review::{NewReviewRecord, RecordError, ReviewRecord, COMPLETION_LEVEL};

/// Upper bound on bound parameters per `IN (...)` query; larger inputs are chunked.
const MAX_BATCH_SIZE: usize = 500;

// Row-returning statements are drained with `fetch_all`. SQLite keeps an
// unfinished statement's implicit transaction open on the pooled connection.

const SELECT_COLUMNS: &str = r#""id","user_id","word_id","level","downgrade_step","next_review_time",
    "total_correct","total_wrong","score","version""#;

pub async fn insert_review_record(
    proxy: &DatabaseProxy,
    record: &NewReviewRecord,
) -> Result<i64, RecordError> {
    record.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO "words_recite_record" (
            "user_id", "word_id", "level", "downgrade_step", "next_review_time",
            "total_correct", "total_wrong", "score", "version"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(record.user_id)
    .bind(record.word_id)
    .bind(record.level)
    .bind(record.downgrade_step)
    .bind(record.next_review_time)
    .bind(record.total_correct)
    .bind(record.total_wrong)
    .bind(record.score)
    .execute(proxy.pool())
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_rowid();
            tracing::info!(
                id,
                user_id = record.user_id,
                word_id = record.word_id,
                "inserted review record"
            );
            Ok(id)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(RecordError::Conflict {
                user_id: record.user_id,
                word_id: record.word_id,
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_review_record(
    proxy: &DatabaseProxy,
    user_id: i64,
    word_id: i64,
) -> Result<ReviewRecord, RecordError> {
    let sql = format!(
        r#"SELECT {SELECT_COLUMNS} FROM "words_recite_record" WHERE "user_id" = ? AND "word_id" = ? LIMIT 1"#
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(word_id)
        .fetch_all(proxy.pool())
        .await?;

    let Some(row) = rows.first() else {
        return Err(RecordError::NotFound { user_id, word_id });
    };

    tracing::debug!(user_id, word_id, "found review record");
    map_row(row).map_err(Into::into)
}

/// Returns the records that exist among `word_ids`, keyed by word id.
pub async fn get_review_records_by_word_ids(
    proxy: &DatabaseProxy,
    user_id: i64,
    word_ids: &[i64],
) -> Result<HashMap<i64, ReviewRecord>, RecordError> {
    let unique: Vec<i64> = word_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let mut out = HashMap::with_capacity(unique.len());
    for chunk in unique.chunks(MAX_BATCH_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            r#"SELECT {SELECT_COLUMNS} FROM "words_recite_record" WHERE "user_id" = "#
        ));
        qb.push_bind(user_id);
        qb.push(r#" AND "word_id" IN ("#);
        {
            let mut sep = qb.separated(", ");
            for id in chunk {
                sep.push_bind(*id);
            }
        }
        qb.push(")");

        let rows = qb.build().fetch_all(proxy.pool()).await?;
        for row in &rows {
            let record = map_row(row)?;
            out.insert(record.word_id, record);
        }
    }

    tracing::info!(
        user_id,
        requested = unique.len(),
        found = out.len(),
        "batch loaded review records"
    );
    Ok(out)
}

/// Writes the mutable fields of `record` if its version still matches the
/// stored one, returning the stored state with the bumped version.
pub async fn update_review_record(
    proxy: &DatabaseProxy,
    record: &ReviewRecord,
) -> Result<ReviewRecord, RecordError> {
    record.validate()?;

    let sql = format!(
        r#"
        UPDATE "words_recite_record" SET
            "level" = ?,
            "downgrade_step" = ?,
            "next_review_time" = ?,
            "total_correct" = ?,
            "total_wrong" = ?,
            "score" = ?,
            "version" = "version" + 1
        WHERE "user_id" = ? AND "word_id" = ? AND "version" = ?
        RETURNING {SELECT_COLUMNS}
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(record.level)
        .bind(record.downgrade_step)
        .bind(record.next_review_time)
        .bind(record.total_correct)
        .bind(record.total_wrong)
        .bind(record.score)
        .bind(record.user_id)
        .bind(record.word_id)
        .bind(record.version)
        .fetch_all(proxy.pool())
        .await?;

    if let Some(row) = rows.first() {
        let stored = map_row(row)?;
        tracing::info!(
            user_id = stored.user_id,
            word_id = stored.word_id,
            level = stored.level,
            next_review_time = stored.next_review_time,
            version = stored.version,
            "updated review record"
        );
        return Ok(stored);
    }

    let existing: Vec<i64> = sqlx::query_scalar(
        r#"SELECT "id" FROM "words_recite_record" WHERE "user_id" = ? AND "word_id" = ?"#,
    )
    .bind(record.user_id)
    .bind(record.word_id)
    .fetch_all(proxy.pool())
    .await?;

    let (user_id, word_id) = (record.user_id, record.word_id);
    if !existing.is_empty() {
        Err(RecordError::Stale { user_id, word_id })
    } else {
        Err(RecordError::NotFound { user_id, word_id })
    }
}

pub async fn get_due_review_records(
    proxy: &DatabaseProxy,
    user_id: i64,
    as_of: i64,
) -> Result<Vec<ReviewRecord>, RecordError> {
    let sql = format!(
        r#"
        SELECT {SELECT_COLUMNS} FROM "words_recite_record"
        WHERE "user_id" = ? AND "next_review_time" <= ?
        ORDER BY "next_review_time" ASC, "word_id" ASC
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(as_of)
        .fetch_all(proxy.pool())
        .await?;

    let records = rows.iter().map(map_row).collect::<Result<Vec<_>, _>>()?;
    tracing::info!(user_id, as_of, count = records.len(), "found due review records");
    Ok(records)
}

pub async fn count_completed_words(proxy: &DatabaseProxy, user_id: i64) -> Result<i64, RecordError> {
    let counts: Vec<i64> = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM "words_recite_record" WHERE "user_id" = ? AND "level" >= ?"#,
    )
    .bind(user_id)
    .bind(COMPLETION_LEVEL)
    .fetch_all(proxy.pool())
    .await?;
    let count = counts.first().copied().unwrap_or(0);

    tracing::info!(user_id, count, "completed words count");
    Ok(count)
}

pub async fn delete_review_records_by_user(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<u64, RecordError> {
    let result = sqlx::query(r#"DELETE FROM "words_recite_record" WHERE "user_id" = ?"#)
        .bind(user_id)
        .execute(proxy.pool())
        .await?;

    let deleted = result.rows_affected();
    tracing::info!(user_id, deleted, "deleted review records");
    Ok(deleted)
}

fn map_row(row: &SqliteRow) -> Result<ReviewRecord, sqlx::Error> {
    Ok(ReviewRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        word_id: row.try_get("word_id")?,
        level: row.try_get("level")?,
        downgrade_step: row.try_get("downgrade_step")?,
        next_review_time: row.try_get("next_review_time")?,
        total_correct: row.try_get("total_correct")?,
        total_wrong: row.try_get("total_wrong")?,
        score: row.try_get("score")?,
        version: row.try_get("version")?,
    })
}
