use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use practice_core::generator::OperandSource;
use practice_core::model::{Answer, NewProblem, Problem, ProblemId, Roster};
use storage::repository::{InMemoryRepository, ProblemRepository};

use crate::Clock;
use crate::error::ProblemServiceError;

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub correct: bool,
    /// The problem as persisted after this attempt.
    pub problem: Problem,
}

/// Creates problems for learners and checks their answers.
///
/// Learner names are checked against the roster before any storage access.
#[derive(Clone)]
pub struct ProblemService {
    clock: Clock,
    roster: Roster,
    problems: Arc<dyn ProblemRepository>,
}

impl ProblemService {
    #[must_use]
    pub fn new(clock: Clock, roster: Roster, problems: Arc<dyn ProblemRepository>) -> Self {
        Self {
            clock,
            roster,
            problems,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock, roster: Roster) -> Self {
        Self::new(clock, roster, Arc::new(InMemoryRepository::new()))
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    fn require_learner(&self, name: &str) -> Result<(), ProblemServiceError> {
        self.roster.require(name).map_err(|_| {
            warn!(learner = name, "rejected unknown learner");
            ProblemServiceError::InvalidIdentity(name.to_owned())
        })
    }

    /// Generate and store a new problem at `difficulty` for `name`.
    ///
    /// Difficulties outside 1..=7 produce a tier 1 problem worth 0 points.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentity` for names not on the roster, or `Storage`
    /// if the problem cannot be stored.
    #[instrument(skip(self))]
    pub async fn create_new(
        &self,
        name: &str,
        difficulty: u32,
    ) -> Result<Problem, ProblemServiceError> {
        self.require_learner(name)?;
        let draft = {
            let mut rng = rand::rng();
            NewProblem::generate(name, difficulty, self.clock.now(), &mut rng)
        };
        self.store(draft).await
    }

    /// Same as [`ProblemService::create_new`] with an explicit operand source.
    ///
    /// # Errors
    ///
    /// See [`ProblemService::create_new`].
    pub async fn create_new_with<S>(
        &self,
        name: &str,
        difficulty: u32,
        source: &mut S,
    ) -> Result<Problem, ProblemServiceError>
    where
        S: OperandSource + Send + ?Sized,
    {
        self.require_learner(name)?;
        let draft = NewProblem::generate(name, difficulty, self.clock.now(), source);
        self.store(draft).await
    }

    async fn store(&self, draft: NewProblem) -> Result<Problem, ProblemServiceError> {
        let id = self
            .problems
            .insert_new_problem(&draft)
            .await
            .map_err(ProblemServiceError::Storage)?;
        debug!(
            problem_id = %id,
            learner = %draft.solved_by,
            difficulty = draft.difficulty,
            text = %draft.problem,
            "generated problem"
        );
        Ok(draft.assign_id(id))
    }

    /// Fetch a problem owned by `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the problem does not exist or belongs to
    /// another learner.
    pub async fn get_problem(
        &self,
        name: &str,
        id: ProblemId,
    ) -> Result<Problem, ProblemServiceError> {
        self.require_learner(name)?;
        let problem = self
            .problems
            .get_problem(id)
            .await
            .map_err(|e| ProblemServiceError::from_storage(id, e))?;
        if problem.solved_by() != name {
            return Err(ProblemServiceError::NotFound(id));
        }
        Ok(problem)
    }

    /// Submit a numeric answer.
    ///
    /// Every submission is counted; the solve time is recorded only on the
    /// first correct answer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentity`, `NotFound`, or `Storage` errors.
    #[instrument(skip(self))]
    pub async fn submit_answer(
        &self,
        name: &str,
        id: ProblemId,
        answer: f64,
    ) -> Result<AttemptResult, ProblemServiceError> {
        let problem = self.get_problem(name, id).await?;
        self.apply_answer(&problem, answer).await
    }

    /// Parse and submit a raw answer string.
    ///
    /// Malformed input is rejected without counting an attempt.
    ///
    /// # Errors
    ///
    /// Returns `MalformedAnswer` if `raw` is not a finite number, plus the
    /// errors of [`ProblemService::submit_answer`].
    #[instrument(skip(self))]
    pub async fn submit_raw_answer(
        &self,
        name: &str,
        id: ProblemId,
        raw: &str,
    ) -> Result<AttemptResult, ProblemServiceError> {
        let problem = self.get_problem(name, id).await?;
        let answer: Answer = raw.parse()?;
        self.apply_answer(&problem, answer.value()).await
    }

    async fn apply_answer(
        &self,
        problem: &Problem,
        answer: f64,
    ) -> Result<AttemptResult, ProblemServiceError> {
        let id = problem.id();
        let attempt = problem.evaluate(answer, self.clock.now());
        let updated = self
            .problems
            .record_attempt(id, attempt.solved_elapsed)
            .await
            .map_err(|e| ProblemServiceError::from_storage(id, e))?;

        if attempt.solved_elapsed.is_some() {
            info!(
                problem_id = %id,
                attempts = updated.attempts(),
                elapsed = updated.elapsed(),
                points = updated.point_value(),
                "problem solved"
            );
        } else {
            debug!(
                problem_id = %id,
                correct = attempt.correct,
                attempts = updated.attempts(),
                "attempt recorded"
            );
        }

        Ok(AttemptResult {
            correct: attempt.correct,
            problem: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use practice_core::generator::ScriptedOperands;
    use practice_core::time::fixed_now;

    fn roster() -> Roster {
        Roster::new(["alice", "bob"])
    }

    #[tokio::test]
    async fn create_new_rejects_unknown_learner() {
        let service = ProblemService::in_memory(Clock::fixed(fixed_now()), roster());
        let err = service.create_new("mallory", 1).await.unwrap_err();
        assert!(matches!(err, ProblemServiceError::InvalidIdentity(name) if name == "mallory"));
    }

    #[tokio::test]
    async fn create_new_stores_a_fresh_problem() {
        let service = ProblemService::in_memory(Clock::fixed(fixed_now()), roster());
        let problem = service.create_new("alice", 6).await.unwrap();

        assert_eq!(problem.difficulty(), 6);
        assert_eq!(problem.solved_by(), "alice");
        assert_eq!(problem.started_at(), fixed_now());
        assert_eq!(problem.attempts(), 0);
        assert!(problem.problem().contains(" * "));

        let fetched = service.get_problem("alice", problem.id()).await.unwrap();
        assert_eq!(fetched, problem);
    }

    #[tokio::test]
    async fn problems_of_other_learners_are_not_found() {
        let service = ProblemService::in_memory(Clock::fixed(fixed_now()), roster());
        let problem = service.create_new("alice", 1).await.unwrap();

        let err = service.get_problem("bob", problem.id()).await.unwrap_err();
        assert!(matches!(err, ProblemServiceError::NotFound(id) if id == problem.id()));

        let err = service
            .get_problem("alice", ProblemId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, ProblemServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn submissions_count_and_solve_once() {
        let repo: Arc<dyn ProblemRepository> = Arc::new(InMemoryRepository::new());
        let start = ProblemService::new(Clock::fixed(fixed_now()), roster(), Arc::clone(&repo));
        let later = ProblemService::new(
            Clock::fixed(fixed_now() + Duration::seconds(12)),
            roster(),
            Arc::clone(&repo),
        );

        let mut script = ScriptedOperands::new([12, 3]);
        let problem = start.create_new_with("alice", 7, &mut script).await.unwrap();
        assert_eq!(problem.problem(), "36 / 3");

        let wrong = later.submit_answer("alice", problem.id(), 11.0).await.unwrap();
        assert!(!wrong.correct);
        assert_eq!(wrong.problem.attempts(), 1);
        assert_eq!(wrong.problem.elapsed(), 0.0);

        let right = later.submit_answer("alice", problem.id(), 12.0).await.unwrap();
        assert!(right.correct);
        assert_eq!(right.problem.attempts(), 2);
        assert_eq!(right.problem.elapsed(), 12.0);

        let again = start.submit_answer("alice", problem.id(), 12.0).await.unwrap();
        assert!(again.correct);
        assert_eq!(again.problem.attempts(), 3);
        assert_eq!(again.problem.elapsed(), 12.0);
    }

    #[tokio::test]
    async fn malformed_answers_are_not_counted() {
        let service = ProblemService::in_memory(Clock::fixed(fixed_now()), roster());
        let problem = service.create_new("alice", 2).await.unwrap();

        let err = service
            .submit_raw_answer("alice", problem.id(), "forty two")
            .await
            .unwrap_err();
        assert!(matches!(err, ProblemServiceError::MalformedAnswer(_)));

        let fetched = service.get_problem("alice", problem.id()).await.unwrap();
        assert_eq!(fetched.attempts(), 0);

        let raw = format!(" {} ", problem.solution());
        let result = service
            .submit_raw_answer("alice", problem.id(), &raw)
            .await
            .unwrap();
        assert!(result.correct);
        assert_eq!(result.problem.attempts(), 1);
    }
}
