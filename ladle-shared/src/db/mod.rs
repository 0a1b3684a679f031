/// Database utilities
///
/// - `pool`: PostgreSQL connection pool creation and health checks
/// - `migrations`: sqlx migration runner and status reporting
/// - `readiness`: blocking wait-until-ready probe for startup sequencing
pub mod migrations;
pub mod pool;
pub mod readiness;
