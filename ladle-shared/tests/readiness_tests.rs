/// Tests for the database readiness probe
///
/// The probe is driven by a scripted Connectivity implementation, so no
/// database is needed: each test enqueues an exact sequence of outcomes
/// and asserts how many checks the wait loop performs.
use async_trait::async_trait;
use ladle_shared::db::readiness::{wait_until_ready, Connectivity};
use std::collections::VecDeque;
use std::time::Duration;

/// Connectivity stub that replays a queue of scripted outcomes.
struct ScriptedConnectivity {
    outcomes: VecDeque<Result<(), sqlx::Error>>,
    checks: u64,
}

impl ScriptedConnectivity {
    fn new(outcomes: Vec<Result<(), sqlx::Error>>) -> Self {
        Self {
            outcomes: outcomes.into(),
            checks: 0,
        }
    }
}

#[async_trait]
impl Connectivity for ScriptedConnectivity {
    async fn check(&mut self) -> Result<(), sqlx::Error> {
        self.checks += 1;
        self.outcomes
            .pop_front()
            .expect("probe checked more times than scripted")
    }
}

fn driver_error() -> sqlx::Error {
    sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

fn pool_error() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}

#[tokio::test]
async fn test_ready_database_checks_once() {
    let mut conn = ScriptedConnectivity::new(vec![Ok(())]);

    let attempts = wait_until_ready(&mut conn, Duration::from_millis(0))
        .await
        .expect("probe should succeed");

    assert_eq!(attempts, 1);
    assert_eq!(conn.checks, 1);
}

#[tokio::test]
async fn test_retries_through_transient_errors() {
    // Two driver-level failures, then three pool-level failures, then
    // success: the probe must perform exactly six checks.
    let mut conn = ScriptedConnectivity::new(vec![
        Err(driver_error()),
        Err(driver_error()),
        Err(pool_error()),
        Err(pool_error()),
        Err(pool_error()),
        Ok(()),
    ]);

    let attempts = wait_until_ready(&mut conn, Duration::from_millis(0))
        .await
        .expect("probe should eventually succeed");

    assert_eq!(attempts, 6);
    assert_eq!(conn.checks, 6);
}

#[tokio::test]
async fn test_non_transient_error_propagates() {
    let mut conn = ScriptedConnectivity::new(vec![
        Err(driver_error()),
        Err(sqlx::Error::RowNotFound),
        Ok(()),
    ]);

    let result = wait_until_ready(&mut conn, Duration::from_millis(0)).await;

    assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    // The scripted success was never reached.
    assert_eq!(conn.checks, 2);
}

#[tokio::test]
async fn test_sleeps_between_attempts() {
    let mut conn = ScriptedConnectivity::new(vec![Err(driver_error()), Ok(())]);

    let start = std::time::Instant::now();
    wait_until_ready(&mut conn, Duration::from_millis(50))
        .await
        .expect("probe should succeed");

    assert!(start.elapsed() >= Duration::from_millis(50));
}
