use practice_core::model::{NewProblem, Problem, ProblemId};

use super::{
    SqliteRepository,
    mapping::{conn, map_problem_row, problem_id_from_i64, problem_id_to_i64},
};
use crate::repository::{ProblemQuery, ProblemRepository, StorageError};

const PROBLEM_COLUMNS: &str =
    "id, problem, solution, difficulty, solved_by, started_at, elapsed, attempts";

#[async_trait::async_trait]
impl ProblemRepository for SqliteRepository {
    async fn insert_new_problem(&self, problem: &NewProblem) -> Result<ProblemId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO problems (
                    problem, solution, difficulty, solved_by, started_at, elapsed, attempts
                )
                VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)
            ",
        )
        .bind(problem.problem.clone())
        .bind(problem.solution)
        .bind(i64::from(problem.difficulty))
        .bind(problem.solved_by.clone())
        .bind(problem.started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        problem_id_from_i64(res.last_insert_rowid())
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError> {
        let sql = format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(problem_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_problem_row(&row)
    }

    async fn save_problem(&self, problem: &Problem) -> Result<(), StorageError> {
        // problem text, solution, difficulty and start time are fixed at creation
        let res = sqlx::query(
            r"
                UPDATE problems
                SET elapsed = ?2, attempts = ?3
                WHERE id = ?1
            ",
        )
        .bind(problem_id_to_i64(problem.id())?)
        .bind(problem.elapsed())
        .bind(i64::from(problem.attempts()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn record_attempt(
        &self,
        id: ProblemId,
        solved_elapsed: Option<f64>,
    ) -> Result<Problem, StorageError> {
        let sql = format!(
            r"
                UPDATE problems
                SET attempts = attempts + 1,
                    elapsed = CASE
                        WHEN elapsed <= 0 AND ?2 IS NOT NULL THEN ?2
                        ELSE elapsed
                    END
                WHERE id = ?1
                RETURNING {PROBLEM_COLUMNS}
            "
        );
        let row = sqlx::query(&sql)
            .bind(problem_id_to_i64(id)?)
            .bind(solved_elapsed)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_problem_row(&row)
    }

    async fn list_problems(&self, query: &ProblemQuery) -> Result<Vec<Problem>, StorageError> {
        let mut sql = format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE 1 = 1");

        let mut bind_index = 1;
        if query.solved_by.is_some() {
            sql.push_str(" AND solved_by = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if query.started_from.is_some() {
            sql.push_str(" AND started_at >= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if query.min_attempts.is_some() {
            sql.push_str(" AND attempts >= ?");
            sql.push_str(&bind_index.to_string());
        }
        if query.solved_only {
            sql.push_str(" AND elapsed > 0");
        }
        sql.push_str(" ORDER BY started_at ASC, id ASC");

        let mut q = sqlx::query(&sql);
        if let Some(name) = query.solved_by.as_deref() {
            q = q.bind(name);
        }
        if let Some(from) = query.started_from {
            q = q.bind(from);
        }
        if let Some(min) = query.min_attempts {
            q = q.bind(i64::from(min));
        }

        let rows = q.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_problem_row(&row)?);
        }
        Ok(out)
    }
}
