use std::sync::Arc;

use tracing::{debug, instrument, warn};

use practice_core::model::Roster;
use practice_core::progress::{DailySummary, ProgressReport, compute_progress, summarize_day};
use storage::repository::{InMemoryRepository, ProblemQuery, ProblemRepository};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Read-only views over a learner's problems for the current UTC day.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    roster: Roster,
    target_points: u32,
    problems: Arc<dyn ProblemRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        roster: Roster,
        target_points: u32,
        problems: Arc<dyn ProblemRepository>,
    ) -> Self {
        Self {
            clock,
            roster,
            target_points,
            problems,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock, roster: Roster, target_points: u32) -> Self {
        Self::new(
            clock,
            roster,
            target_points,
            Arc::new(InMemoryRepository::new()),
        )
    }

    /// Configured daily goal.
    #[must_use]
    pub fn target_points(&self) -> u32 {
        self.target_points
    }

    fn require_learner(&self, name: &str) -> Result<(), ProgressServiceError> {
        self.roster.require(name).map_err(|_| {
            warn!(learner = name, "rejected unknown learner");
            ProgressServiceError::InvalidIdentity(name.to_owned())
        })
    }

    /// Points `name` earned today against `target_points`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentity` for names not on the roster, or `Storage`
    /// on repository failures.
    #[instrument(skip(self))]
    pub async fn determine_progress(
        &self,
        name: &str,
        target_points: u32,
    ) -> Result<ProgressReport, ProgressServiceError> {
        self.require_learner(name)?;
        let day_start = self.clock.start_of_day();
        let solved = self
            .problems
            .list_problems(&ProblemQuery::solved_on_day(name, day_start))
            .await?;

        let report = compute_progress(&solved, name, target_points, day_start);
        debug!(
            total_points = report.total_points,
            percent_complete = report.percent_complete,
            "computed progress"
        );
        Ok(report)
    }

    /// [`ProgressService::determine_progress`] against the configured goal.
    ///
    /// # Errors
    ///
    /// See [`ProgressService::determine_progress`].
    pub async fn progress_for_goal(
        &self,
        name: &str,
    ) -> Result<ProgressReport, ProgressServiceError> {
        self.determine_progress(name, self.target_points).await
    }

    /// Attempt and timing totals for everything `name` started today.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentity` for names not on the roster, or `Storage`
    /// on repository failures.
    #[instrument(skip(self))]
    pub async fn daily_summary(&self, name: &str) -> Result<DailySummary, ProgressServiceError> {
        self.require_learner(name)?;
        let day_start = self.clock.start_of_day();
        let todays = self
            .problems
            .list_problems(&ProblemQuery::for_day(name, day_start))
            .await?;
        Ok(summarize_day(todays, name, day_start))
    }
}
