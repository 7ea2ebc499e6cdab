use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::config::PracticeConfig;
use crate::error::AppServicesError;
use crate::problem_service::ProblemService;
use crate::progress_service::ProgressService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: PracticeConfig,
    problems: Arc<ProblemService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: PracticeConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        info!(
            db_url = %config.db_url,
            learners = config.roster.names().len(),
            "opened problem store"
        );
        Ok(Self::from_storage(&storage, config, clock))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(config: PracticeConfig, clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), config, clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, config: PracticeConfig, clock: Clock) -> Self {
        let problems = Arc::new(ProblemService::new(
            clock,
            config.roster.clone(),
            Arc::clone(&storage.problems),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            config.roster.clone(),
            config.target_points,
            Arc::clone(&storage.problems),
        ));

        Self {
            config,
            problems,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    #[must_use]
    pub fn problems(&self) -> Arc<ProblemService> {
        Arc::clone(&self.problems)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
