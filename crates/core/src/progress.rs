use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Problem;

/// Daily point goal used when none is configured.
pub const DEFAULT_TARGET_POINTS: u32 = 30;

/// Points earned today against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub target_points: u32,
    pub total_points: u32,
    pub percent_complete: u32,
}

/// Whether `problem` was solved by `name` on the day starting at `day_start`.
#[must_use]
pub fn counts_toward_progress(problem: &Problem, name: &str, day_start: DateTime<Utc>) -> bool {
    problem.solved_by() == name
        && problem.started_at() >= day_start
        && problem.attempts() >= 1
        && problem.elapsed() > 0.0
}

/// Truncated percentage of `target_points`, clamped to `0..=100`.
#[must_use]
pub fn percent_complete(total_points: u32, target_points: u32) -> u32 {
    if total_points == 0 {
        return 0;
    }
    if target_points == 0 {
        return 100;
    }
    let percent = u64::from(total_points) * 100 / u64::from(target_points);
    u32::try_from(percent.min(100)).unwrap_or(100)
}

/// Sum point values of today's solved problems.
///
/// `records` may be pre-filtered by storage or the raw set; the progress
/// predicates are applied either way.
pub fn compute_progress<'a, I>(
    records: I,
    name: &str,
    target_points: u32,
    day_start: DateTime<Utc>,
) -> ProgressReport
where
    I: IntoIterator<Item = &'a Problem>,
{
    let total_points = records
        .into_iter()
        .filter(|p| counts_toward_progress(p, name, day_start))
        .fold(0_u32, |acc, p| acc.saturating_add(p.point_value()));

    ProgressReport {
        target_points,
        total_points,
        percent_complete: percent_complete(total_points, target_points),
    }
}

/// Today's activity for one learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Problems with at least one attempt.
    pub total_solved: u32,
    pub total_attempts: u32,
    pub total_solve_time: f64,
    pub avg_solve_time: f64,
    /// Today's problems ordered by creation time.
    pub problems: Vec<Problem>,
}

/// Build the daily summary from a learner's records.
pub fn summarize_day<I>(records: I, name: &str, day_start: DateTime<Utc>) -> DailySummary
where
    I: IntoIterator<Item = Problem>,
{
    let mut problems: Vec<Problem> = records
        .into_iter()
        .filter(|p| p.solved_by() == name && p.started_at() >= day_start)
        .collect();
    problems.sort_by_key(|p| (p.started_at(), p.id()));

    let mut total_solved = 0_u32;
    let mut total_attempts = 0_u32;
    let mut total_solve_time = 0.0_f64;

    for problem in problems.iter().filter(|p| p.attempts() > 0) {
        total_solved = total_solved.saturating_add(1);
        total_attempts = total_attempts.saturating_add(problem.attempts());
        total_solve_time += problem.elapsed();
    }

    let avg_solve_time = if total_solved == 0 {
        0.0
    } else {
        total_solve_time / f64::from(total_solved)
    };

    DailySummary {
        total_solved,
        total_attempts,
        total_solve_time,
        avg_solve_time,
        problems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProblemId;
    use crate::time::{fixed_now, start_of_day};
    use chrono::Duration;

    fn record(
        id: u64,
        name: &str,
        difficulty: u32,
        started_at: DateTime<Utc>,
        elapsed: f64,
        attempts: u32,
    ) -> Problem {
        Problem::from_persisted(
            ProblemId::new(id),
            "1 + 1".into(),
            2.0,
            difficulty,
            name.into(),
            started_at,
            elapsed,
            attempts,
        )
        .unwrap()
    }

    fn today() -> DateTime<Utc> {
        start_of_day(fixed_now())
    }

    #[test]
    fn sums_points_of_solved_records() {
        let now = fixed_now();
        let records = vec![
            record(1, "alice", 1, now, 2.0, 1),
            record(2, "alice", 2, now, 3.0, 2),
            record(3, "alice", 4, now, 9.5, 1),
        ];

        let report = compute_progress(&records, "alice", 10, today());
        assert_eq!(
            report,
            ProgressReport {
                target_points: 10,
                total_points: 5,
                percent_complete: 50,
            }
        );
    }

    #[test]
    fn zero_points_is_zero_percent() {
        let report = compute_progress(&[], "alice", DEFAULT_TARGET_POINTS, today());
        assert_eq!(report.total_points, 0);
        assert_eq!(report.percent_complete, 0);
        assert_eq!(report.target_points, 30);
    }

    #[test]
    fn percent_is_clamped_to_one_hundred() {
        assert_eq!(percent_complete(100, 30), 100);
        assert_eq!(percent_complete(30, 30), 100);
        assert_eq!(percent_complete(29, 30), 96);
        assert_eq!(percent_complete(1, 30), 3);
        assert_eq!(percent_complete(5, 0), 100);
        assert_eq!(percent_complete(0, 0), 0);

        let now = fixed_now();
        let records: Vec<Problem> = (1..=20)
            .map(|id| record(id, "alice", 7, now, 1.0, 1))
            .collect();
        let report = compute_progress(&records, "alice", 30, today());
        assert_eq!(report.total_points, 100);
        assert_eq!(report.percent_complete, 100);
    }

    #[test]
    fn excludes_unsolved_foreign_and_stale_records() {
        let now = fixed_now();
        let yesterday = today() - Duration::seconds(1);
        let records = vec![
            record(1, "alice", 7, now, 0.0, 0),
            record(2, "alice", 7, now, 0.0, 3),
            record(3, "alice", 7, yesterday, 4.0, 1),
            record(4, "bob", 7, now, 4.0, 1),
            record(5, "alice", 1, today(), 4.0, 1),
        ];

        let report = compute_progress(&records, "alice", 30, today());
        assert_eq!(report.total_points, 1);
        assert_eq!(report.percent_complete, 3);
    }

    #[test]
    fn invalid_difficulty_records_are_worth_nothing() {
        let now = fixed_now();
        let records = vec![record(1, "alice", 0, now, 1.0, 1), record(2, "alice", 99, now, 1.0, 1)];
        let report = compute_progress(&records, "alice", 30, today());
        assert_eq!(report.total_points, 0);
        assert_eq!(report.percent_complete, 0);
    }

    #[test]
    fn daily_summary_aggregates_attempted_records() {
        let now = fixed_now();
        let records = vec![
            record(3, "alice", 1, now + Duration::seconds(20), 0.0, 0),
            record(2, "alice", 1, now + Duration::seconds(10), 6.0, 3),
            record(1, "alice", 1, now, 4.0, 1),
            record(4, "bob", 1, now, 8.0, 1),
            record(5, "alice", 1, today() - Duration::hours(2), 8.0, 1),
        ];

        let summary = summarize_day(records, "alice", today());
        assert_eq!(summary.total_solved, 2);
        assert_eq!(summary.total_attempts, 4);
        assert_eq!(summary.total_solve_time, 10.0);
        assert_eq!(summary.avg_solve_time, 5.0);

        let ids: Vec<u64> = summary.problems.iter().map(|p| p.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn daily_summary_without_attempts_has_zero_average() {
        let summary = summarize_day(
            vec![record(1, "alice", 1, fixed_now(), 0.0, 0)],
            "alice",
            today(),
        );
        assert_eq!(summary.total_solved, 0);
        assert_eq!(summary.total_attempts, 0);
        assert_eq!(summary.avg_solve_time, 0.0);
        assert_eq!(summary.problems.len(), 1);
    }
}
