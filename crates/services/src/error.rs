//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{AnswerError, ProblemId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProblemService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProblemServiceError {
    #[error("unknown learner: {0}")]
    InvalidIdentity(String),
    #[error("problem {0} not found")]
    NotFound(ProblemId),
    #[error(transparent)]
    MalformedAnswer(#[from] AnswerError),
    #[error(transparent)]
    Storage(StorageError),
}

impl ProblemServiceError {
    pub(crate) fn from_storage(id: ProblemId, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("unknown learner: {0}")]
    InvalidIdentity(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while reading `PracticeConfig` from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var} value: {raw}")]
    InvalidTargetPoints { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
