use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::generator::{OperandSource, generate, point_value_for};
use crate::model::answer::answers_match;
use crate::model::ids::ProblemId;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Smallest solve time recorded, so a solved problem always has `elapsed > 0`.
pub const MIN_SOLVE_SECONDS: f64 = 1.0 / MICROS_PER_SECOND;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("solution must be finite, got {0}")]
    InvalidSolution(f64),
    #[error("elapsed seconds must be finite and non-negative, got {0}")]
    InvalidElapsed(f64),
}

//
// ─── NEW PROBLEM ───────────────────────────────────────────────────────────────
//

/// A generated problem that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProblem {
    pub problem: String,
    pub solution: f64,
    pub difficulty: u32,
    pub solved_by: String,
    pub started_at: DateTime<Utc>,
}

impl NewProblem {
    /// Generate the problem text and solution for `difficulty`.
    ///
    /// The requested difficulty is stored as given even when generation
    /// falls back to tier 1.
    pub fn generate<S>(
        solved_by: impl Into<String>,
        difficulty: u32,
        started_at: DateTime<Utc>,
        source: &mut S,
    ) -> Self
    where
        S: OperandSource + ?Sized,
    {
        let generated = generate(difficulty, source);
        Self {
            problem: generated.text,
            solution: generated.solution,
            difficulty,
            solved_by: solved_by.into(),
            started_at,
        }
    }

    #[must_use]
    pub fn assign_id(self, id: ProblemId) -> Problem {
        Problem {
            id,
            problem: self.problem,
            solution: self.solution,
            difficulty: self.difficulty,
            solved_by: self.solved_by,
            started_at: self.started_at,
            elapsed: 0.0,
            attempts: 0,
        }
    }
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// Outcome of checking one submission against a problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub correct: bool,
    /// Seconds to record as `elapsed`; only set on the first correct answer.
    pub solved_elapsed: Option<f64>,
}

/// One generated problem and its solve history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    id: ProblemId,
    problem: String,
    solution: f64,
    difficulty: u32,
    solved_by: String,
    started_at: DateTime<Utc>,
    elapsed: f64,
    attempts: u32,
}

impl Problem {
    /// Rehydrate a problem from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError` if the solution or elapsed time is not a valid number.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ProblemId,
        problem: String,
        solution: f64,
        difficulty: u32,
        solved_by: String,
        started_at: DateTime<Utc>,
        elapsed: f64,
        attempts: u32,
    ) -> Result<Self, ProblemError> {
        if !solution.is_finite() {
            return Err(ProblemError::InvalidSolution(solution));
        }
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(ProblemError::InvalidElapsed(elapsed));
        }
        Ok(Self {
            id,
            problem,
            solution,
            difficulty,
            solved_by,
            started_at,
            elapsed,
            attempts,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }

    #[must_use]
    pub fn solution(&self) -> f64 {
        self.solution
    }

    #[must_use]
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    #[must_use]
    pub fn solved_by(&self) -> &str {
        &self.solved_by
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds from creation to the first correct answer, 0 while unsolved.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.elapsed > 0.0
    }

    #[must_use]
    pub fn check_answer(&self, answer: f64) -> bool {
        answers_match(answer, self.solution)
    }

    /// Seconds between `started_at` and `at`, never negative.
    #[must_use]
    pub fn elapsed_since_start(&self, at: DateTime<Utc>) -> f64 {
        let micros = at
            .signed_duration_since(self.started_at)
            .num_microseconds()
            .unwrap_or(i64::MAX)
            .max(0);

        #[allow(clippy::cast_precision_loss)]
        let micros_f = micros as f64;

        micros_f / MICROS_PER_SECOND
    }

    /// Check `answer` without mutating the problem.
    ///
    /// A first correct answer records at least [`MIN_SOLVE_SECONDS`], even
    /// when `at` is not after `started_at`.
    #[must_use]
    pub fn evaluate(&self, answer: f64, at: DateTime<Utc>) -> Attempt {
        let correct = self.check_answer(answer);
        let solved_elapsed = (correct && !self.is_solved())
            .then(|| self.elapsed_since_start(at).max(MIN_SOLVE_SECONDS));
        Attempt {
            correct,
            solved_elapsed,
        }
    }

    /// Count one submission and record the solve time if this is the first solve.
    pub fn apply_attempt(&mut self, solved_elapsed: Option<f64>) {
        self.attempts = self.attempts.saturating_add(1);
        if let Some(elapsed) = solved_elapsed {
            if !self.is_solved() {
                self.elapsed = elapsed;
            }
        }
    }

    /// Submit an answer, returning whether it was correct.
    ///
    /// Every call counts as an attempt. Once solved, `elapsed` is frozen.
    pub fn add_attempt(&mut self, answer: f64, at: DateTime<Utc>) -> bool {
        let attempt = self.evaluate(answer, at);
        self.apply_attempt(attempt.solved_elapsed);
        attempt.correct
    }

    #[must_use]
    pub fn point_value(&self) -> u32 {
        point_value_for(self.difficulty)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
