//! Postgres repository implementations.
//!
//! All queries are dynamic (`sqlx::query`/`query_as` with runtime binds) so
//! the workspace builds without a `DATABASE_URL`. Schema lives in
//! `migrations/`.

mod agent;
mod assignment_log;
mod file;
mod payment;

pub use agent::PgAgentRepository;
pub use assignment_log::PgAssignmentLogRepository;
pub use file::PgFileRepository;
pub use payment::PgPaymentRepository;
