//! Docflow Services Library
//!
//! Business logic for the document lifecycle: registration and replacement
//! of file content, payment reconciliation against the gateway, agent
//! assignment, and the process-wide read cache. Services depend on the
//! repository traits from `docflow-db` and the `ObjectStorage` trait from
//! `docflow-storage`, so they run unchanged against Postgres + S3 in
//! production and in-memory + local-filesystem stores in tests.

pub mod assignment;
pub mod cache;
pub mod lifecycle;
pub mod payment;

pub use assignment::{AgentSelector, AssignmentService, RandomSelector};
pub use cache::Cache;
pub use lifecycle::{FileLifecycleService, OrphanReport, RegisteredUpload};
pub use payment::PaymentService;
