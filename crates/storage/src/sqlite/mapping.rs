use practice_core::model::{Problem, ProblemId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn problem_id_from_i64(v: i64) -> Result<ProblemId, StorageError> {
    u64::try_from(v)
        .map(ProblemId::new)
        .map_err(|_| StorageError::Serialization(format!("problem_id sign overflow: {v}")))
}

pub(crate) fn problem_id_to_i64(id: ProblemId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("problem_id overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_problem_row(row: &sqlx::sqlite::SqliteRow) -> Result<Problem, StorageError> {
    let difficulty = u32_from_i64(
        "difficulty",
        row.try_get::<i64, _>("difficulty").map_err(ser)?,
    )?;
    let attempts = u32_from_i64("attempts", row.try_get::<i64, _>("attempts").map_err(ser)?)?;

    Problem::from_persisted(
        problem_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("problem").map_err(ser)?,
        row.try_get("solution").map_err(ser)?,
        difficulty,
        row.try_get("solved_by").map_err(ser)?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("elapsed").map_err(ser)?,
        attempts,
    )
    .map_err(ser)
}
