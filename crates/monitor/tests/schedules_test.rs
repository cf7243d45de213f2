use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use teewatch_core::{
    errors::WatchError,
    models::{ExecutionLog, Schedule},
};
use teewatch_monitor::{
    mock::MockScheduler,
    schedules::{DEFAULT_LOG_LIMIT, pick_schedule, schedule_overview},
};

fn schedule(id: &str) -> Schedule {
    Schedule {
        id: id.to_string(),
        is_active: true,
        cron_expression: "*/15 * * * *".to_string(),
        timezone: Some("America/Los_Angeles".to_string()),
        next_run_time: None,
    }
}

fn execution(success: bool) -> ExecutionLog {
    ExecutionLog {
        id: None,
        executed_at: Utc.with_ymd_and_hms(2025, 7, 15, 14, 0, 0).unwrap(),
        success,
        attempt: 1,
        max_attempts: 3,
        error_message: (!success).then(|| "agent timed out".to_string()),
    }
}

#[rstest]
#[case(&["s1", "s2", "s3"], "s2", Some("s2"))]
#[case(&["s1", "s2"], "unknown", Some("s1"))]
#[case(&[], "s1", None)]
fn test_pick_schedule(#[case] ids: &[&str], #[case] preferred: &str, #[case] expected: Option<&str>) {
    let schedules: Vec<Schedule> = ids.iter().map(|id| schedule(id)).collect();

    let picked = pick_schedule(&schedules, preferred).map(|s| s.id.as_str());

    assert_eq!(picked, expected);
}

#[tokio::test]
async fn test_overview_combines_schedule_and_logs() {
    let mut proxy = MockScheduler::new();
    proxy
        .expect_list()
        .times(1)
        .returning(|| Ok(vec![schedule("other"), schedule("checks")]));
    proxy
        .expect_logs()
        .withf(|id, limit| id.to_string() == "checks" && *limit == DEFAULT_LOG_LIMIT)
        .times(1)
        .returning(|_, _| Ok(vec![execution(true), execution(false)]));

    let overview = schedule_overview(&proxy, "checks", DEFAULT_LOG_LIMIT)
        .await
        .unwrap();

    assert_eq!(overview.schedule, Some(schedule("checks")));
    assert_eq!(overview.logs, vec![execution(true), execution(false)]);
}

#[tokio::test]
async fn test_overview_tolerates_log_failure() {
    let mut proxy = MockScheduler::new();
    proxy.expect_list().returning(|| Ok(vec![schedule("checks")]));
    proxy
        .expect_logs()
        .returning(|_, _| Err(WatchError::Capability("logs unavailable".to_string())));

    let overview = schedule_overview(&proxy, "checks", 5).await.unwrap();

    assert_eq!(overview.schedule, Some(schedule("checks")));
    assert!(overview.logs.is_empty());
}

#[tokio::test]
async fn test_overview_propagates_list_failure() {
    let mut proxy = MockScheduler::new();
    proxy
        .expect_list()
        .returning(|| Err(WatchError::Capability("scheduler offline".to_string())));
    proxy.expect_logs().never();

    let result = schedule_overview(&proxy, "checks", 5).await;

    assert!(matches!(result, Err(WatchError::Capability(message)) if message == "scheduler offline"));
}
