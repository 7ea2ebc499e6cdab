use chrono::Duration;
use practice_core::generator::ScriptedOperands;
use practice_core::model::{MIN_SOLVE_SECONDS, Roster};
use practice_core::time::fixed_now;
use services::{AppServices, Clock, PracticeConfig, ProblemServiceError, ProgressServiceError};
use storage::repository::Storage;

fn config(target_points: u32) -> PracticeConfig {
    PracticeConfig::default()
        .with_roster(Roster::parse("alice,bob"))
        .with_target_points(target_points)
}

/// Two service sets over one store: one at creation time, one 30s later.
fn services_pair(target_points: u32) -> (AppServices, AppServices) {
    let storage = Storage::in_memory();
    let now = AppServices::from_storage(&storage, config(target_points), Clock::fixed(fixed_now()));
    let later = AppServices::from_storage(
        &storage,
        config(target_points),
        Clock::fixed(fixed_now() + Duration::seconds(30)),
    );
    (now, later)
}

#[tokio::test]
async fn solved_problems_accumulate_daily_progress() {
    let (now, later) = services_pair(10);
    let problems = now.problems();

    // tier 1 (1 pt), tier 2 (1 pt), tier 4 (3 pts)
    let p1 = problems
        .create_new_with("alice", 1, &mut ScriptedOperands::new([3, 8, 0]))
        .await
        .unwrap();
    let p2 = problems
        .create_new_with("alice", 2, &mut ScriptedOperands::new([6, 7]))
        .await
        .unwrap();
    let p4 = problems
        .create_new_with("alice", 4, &mut ScriptedOperands::new([120, 30]))
        .await
        .unwrap();
    let unsolved = problems
        .create_new_with("alice", 7, &mut ScriptedOperands::new([10, 2]))
        .await
        .unwrap();

    assert_eq!(p1.problem(), "8 + 3");
    assert_eq!(p2.problem(), "6 * 7");
    assert_eq!(p4.problem(), "120 + 30");
    assert_eq!(unsolved.problem(), "20 / 2");

    let answering = later.problems();
    assert!(answering.submit_answer("alice", p1.id(), 11.0).await.unwrap().correct);
    assert!(!answering.submit_answer("alice", p2.id(), 41.0).await.unwrap().correct);
    assert!(answering.submit_raw_answer("alice", p2.id(), "42").await.unwrap().correct);
    assert!(answering.submit_answer("alice", p4.id(), 150.0004).await.unwrap().correct);
    assert!(!answering.submit_answer("alice", unsolved.id(), 10.01).await.unwrap().correct);

    let report = later.progress().progress_for_goal("alice").await.unwrap();
    assert_eq!(report.target_points, 10);
    assert_eq!(report.total_points, 5);
    assert_eq!(report.percent_complete, 50);

    let summary = later.progress().daily_summary("alice").await.unwrap();
    assert_eq!(summary.total_solved, 4);
    assert_eq!(summary.total_attempts, 5);
    assert_eq!(summary.total_solve_time, 90.0);
    assert_eq!(summary.avg_solve_time, 22.5);
    assert_eq!(summary.problems.len(), 4);

    let bob = later.progress().progress_for_goal("bob").await.unwrap();
    assert_eq!(bob.total_points, 0);
    assert_eq!(bob.percent_complete, 0);
}

#[tokio::test]
async fn progress_is_clamped_and_ignores_yesterday() {
    let storage = Storage::in_memory();
    let yesterday = AppServices::from_storage(
        &storage,
        config(30),
        Clock::fixed(fixed_now() - Duration::days(1)),
    );
    let today = AppServices::from_storage(&storage, config(30), Clock::fixed(fixed_now()));
    let answer_clock = AppServices::from_storage(
        &storage,
        config(30),
        Clock::fixed(fixed_now() + Duration::seconds(5)),
    );

    let old = yesterday
        .problems()
        .create_new_with("alice", 7, &mut ScriptedOperands::new([10, 1]))
        .await
        .unwrap();
    answer_clock
        .problems()
        .submit_answer("alice", old.id(), 10.0)
        .await
        .unwrap();

    for _ in 0..20 {
        let p = today
            .problems()
            .create_new_with("alice", 7, &mut ScriptedOperands::new([11, 2]))
            .await
            .unwrap();
        assert!(answer_clock
            .problems()
            .submit_answer("alice", p.id(), 11.0)
            .await
            .unwrap()
            .correct);
    }

    let report = answer_clock.progress().progress_for_goal("alice").await.unwrap();
    assert_eq!(report.total_points, 100);
    assert_eq!(report.percent_complete, 100);

    let custom = answer_clock
        .progress()
        .determine_progress("alice", 1_000)
        .await
        .unwrap();
    assert_eq!(custom.target_points, 1_000);
    assert_eq!(custom.percent_complete, 10);
}

#[tokio::test]
async fn unknown_learners_are_rejected_everywhere() {
    let services = AppServices::in_memory(config(30), Clock::fixed(fixed_now()));

    let err = services.problems().create_new("eve", 1).await.unwrap_err();
    assert!(matches!(err, ProblemServiceError::InvalidIdentity(_)));

    let err = services.progress().progress_for_goal("eve").await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::InvalidIdentity(_)));

    let err = services.progress().daily_summary("").await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::InvalidIdentity(_)));
}

#[tokio::test]
async fn invalid_difficulty_generates_tier_one_worth_nothing() {
    let (now, later) = services_pair(30);
    let problem = now
        .problems()
        .create_new_with("bob", 99, &mut ScriptedOperands::new([2, 5, 1]))
        .await
        .unwrap();
    assert_eq!(problem.problem(), "5 - 2");
    assert_eq!(problem.difficulty(), 99);
    assert_eq!(problem.point_value(), 0);

    let result = later
        .problems()
        .submit_answer("bob", problem.id(), 3.0)
        .await
        .unwrap();
    assert!(result.correct);
    assert_eq!(result.problem.elapsed(), 30.0);

    let report = later.progress().progress_for_goal("bob").await.unwrap();
    assert_eq!(report.total_points, 0);
    assert_eq!(report.percent_complete, 0);
}

#[tokio::test]
async fn sqlite_backed_services_share_state() {
    let url = "sqlite:file:memdb_services?mode=memory&cache=shared";
    let cfg = PracticeConfig {
        db_url: url.to_owned(),
        ..config(30)
    };
    let now = AppServices::new_sqlite(cfg.clone(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let later = AppServices::new_sqlite(cfg, Clock::fixed(fixed_now() + Duration::seconds(4)))
        .await
        .unwrap();

    let problem = now
        .problems()
        .create_new_with("alice", 6, &mut ScriptedOperands::new([25, 4]))
        .await
        .unwrap();
    assert_eq!(problem.problem(), "25 * 4");

    let result = later
        .problems()
        .submit_answer("alice", problem.id(), 100.0)
        .await
        .unwrap();
    assert!(result.correct);
    assert_eq!(result.problem.attempts(), 1);
    assert_eq!(result.problem.elapsed(), 4.0);

    let report = later.progress().progress_for_goal("alice").await.unwrap();
    assert_eq!(report.total_points, 3);
    assert_eq!(report.percent_complete, 10);
}

#[tokio::test]
async fn answer_at_creation_instant_still_earns_points() {
    let services = AppServices::in_memory(config(10), Clock::fixed(fixed_now()));
    let problem = services
        .problems()
        .create_new_with("alice", 7, &mut ScriptedOperands::new([15, 3]))
        .await
        .unwrap();
    assert_eq!(problem.problem(), "45 / 3");

    let result = services
        .problems()
        .submit_answer("alice", problem.id(), 15.0)
        .await
        .unwrap();
    assert!(result.correct);
    assert!(result.problem.is_solved());
    assert_eq!(result.problem.elapsed(), MIN_SOLVE_SECONDS);

    let report = services.progress().progress_for_goal("alice").await.unwrap();
    assert_eq!(report.total_points, 5);
    assert_eq!(report.percent_complete, 50);
}
