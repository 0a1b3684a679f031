/// Database readiness probe
///
/// Startup sequencing utility: blocks until the database accepts a
/// connection, retrying transient failures on a fixed interval. Used by
/// the `ladle-waitdb` binary so deployment orchestration can gate the API
/// server on a ready database.
///
/// The probe is a two-state machine: it stays *waiting* while checks fail
/// transiently and becomes *ready* on the first successful check. There
/// is no retry bound; callers that need one can wrap the future in
/// `tokio::time::timeout`.
///
/// # Example
///
/// ```no_run
/// use ladle_shared::db::readiness::{wait_until_ready, PgConnectivity};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let mut probe = PgConnectivity::new("postgresql://localhost/ladle".to_string());
/// let attempts = wait_until_ready(&mut probe, Duration::from_secs(1)).await?;
/// println!("ready after {} attempts", attempts);
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use std::time::Duration;
use tracing::{info, warn};

/// A single database connectivity check
///
/// Abstracted behind a trait so the retry loop can be driven by scripted
/// outcomes in tests.
#[async_trait]
pub trait Connectivity {
    /// Attempts to reach the database once
    async fn check(&mut self) -> Result<(), sqlx::Error>;
}

/// Connectivity check that opens (and closes) a real PostgreSQL connection
pub struct PgConnectivity {
    url: String,
}

impl PgConnectivity {
    /// Creates a probe for the given connection URL
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl Connectivity for PgConnectivity {
    async fn check(&mut self) -> Result<(), sqlx::Error> {
        let conn = PgConnection::connect(&self.url).await?;
        conn.close().await?;
        Ok(())
    }
}

/// Classifies an error as transient (worth retrying)
///
/// Transient kinds:
/// - driver-level connection failures: I/O and TLS errors while the
///   server is still starting up or not yet listening
/// - pool/acquire-level failures: acquire timeout
/// - server-side startup codes: `57P03` (cannot connect now) and `53300`
///   (too many connections)
///
/// Everything else (bad credentials, missing database, protocol errors)
/// propagates to the caller.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("57P03") | Some("53300"))
        }
        _ => false,
    }
}

/// Blocks until the database is ready, retrying transient failures
///
/// Sleeps `interval` between attempts. Returns the number of checks
/// performed (at least 1). Retries are unbounded; each failure is logged
/// at warn level so a stalled startup is visible.
///
/// # Errors
///
/// Returns the first non-transient error encountered.
pub async fn wait_until_ready<C: Connectivity>(
    connectivity: &mut C,
    interval: Duration,
) -> Result<u64, sqlx::Error> {
    let mut attempts: u64 = 0;

    loop {
        attempts += 1;

        match connectivity.check().await {
            Ok(()) => {
                info!(attempts, "Database is ready");
                return Ok(attempts);
            }
            Err(err) if is_transient(&err) => {
                warn!(
                    attempt = attempts,
                    error = %err,
                    retry_in_ms = interval.as_millis() as u64,
                    "Database unavailable, retrying"
                );
                tokio::time::sleep(interval).await;
            }
            Err(err) => return Err(err),
        }
    }
}
