use async_trait::async_trait;
use chrono::{DateTime, Utc};
use practice_core::model::{NewProblem, Problem, ProblemId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Filters for listing problems. Results are ordered by `started_at`, then id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemQuery {
    pub solved_by: Option<String>,
    /// Inclusive lower bound on `started_at`.
    pub started_from: Option<DateTime<Utc>>,
    pub min_attempts: Option<u32>,
    /// Only problems with `elapsed > 0`.
    pub solved_only: bool,
}

impl ProblemQuery {
    /// Everything `name` started at or after `day_start`.
    #[must_use]
    pub fn for_day(name: impl Into<String>, day_start: DateTime<Utc>) -> Self {
        Self {
            solved_by: Some(name.into()),
            started_from: Some(day_start),
            ..Self::default()
        }
    }

    /// Problems `name` solved on the day starting at `day_start`.
    #[must_use]
    pub fn solved_on_day(name: impl Into<String>, day_start: DateTime<Utc>) -> Self {
        Self {
            min_attempts: Some(1),
            solved_only: true,
            ..Self::for_day(name, day_start)
        }
    }

    #[must_use]
    pub fn matches(&self, problem: &Problem) -> bool {
        self.solved_by
            .as_deref()
            .is_none_or(|name| problem.solved_by() == name)
            && self.started_from.is_none_or(|from| problem.started_at() >= from)
            && self.min_attempts.is_none_or(|min| problem.attempts() >= min)
            && (!self.solved_only || problem.elapsed() > 0.0)
    }
}

/// Repository contract for problem records.
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Store a freshly generated problem and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the problem cannot be stored.
    async fn insert_new_problem(&self, problem: &NewProblem) -> Result<ProblemId, StorageError>;

    /// Fetch a problem by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError>;

    /// Overwrite the mutable state (attempts, elapsed) of an existing problem.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the problem does not exist.
    async fn save_problem(&self, problem: &Problem) -> Result<(), StorageError>;

    /// Atomically count one attempt, setting `elapsed` to `solved_elapsed`
    /// only if the problem is not already solved. Returns the updated problem.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the problem does not exist.
    async fn record_attempt(
        &self,
        id: ProblemId,
        solved_elapsed: Option<f64>,
    ) -> Result<Problem, StorageError>;

    /// List problems matching `query`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_problems(&self, query: &ProblemQuery) -> Result<Vec<Problem>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    problems: Arc<Mutex<HashMap<ProblemId, Problem>>>,
    next_id: Arc<Mutex<u64>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            problems: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }
}

#[async_trait]
impl ProblemRepository for InMemoryRepository {
    async fn insert_new_problem(&self, problem: &NewProblem) -> Result<ProblemId, StorageError> {
        let mut next = self
            .next_id
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = ProblemId::new((*next).max(1));
        *next = id.value() + 1;

        let mut guard = self
            .problems
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, problem.clone().assign_id(id));
        Ok(id)
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, StorageError> {
        let guard = self
            .problems
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn save_problem(&self, problem: &Problem) -> Result<(), StorageError> {
        let mut guard = self
            .problems
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get_mut(&problem.id()) {
            Some(slot) => {
                *slot = problem.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn record_attempt(
        &self,
        id: ProblemId,
        solved_elapsed: Option<f64>,
    ) -> Result<Problem, StorageError> {
        let mut guard = self
            .problems
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let problem = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        problem.apply_attempt(solved_elapsed);
        Ok(problem.clone())
    }

    async fn list_problems(&self, query: &ProblemQuery) -> Result<Vec<Problem>, StorageError> {
        let guard = self
            .problems
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out: Vec<Problem> = guard.values().filter(|p| query.matches(p)).cloned().collect();
        out.sort_by_key(|p| (p.started_at(), p.id()));
        Ok(out)
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub problems: Arc<dyn ProblemRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let problems: Arc<dyn ProblemRepository> = Arc::new(InMemoryRepository::new());
        Self { problems }
    }
}
