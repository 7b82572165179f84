//! Docflow Database Library
//!
//! Document-store repositories for files, payments, agents, and assignment
//! audit logs. Each repository is an async trait with a Postgres
//! implementation (the production wiring) and an in-memory implementation
//! used by tests and local development.
//!
//! The document store is the source of truth for all lifecycle state; the
//! cache layer and the object store are advisory or content-only.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::{
    InMemoryAgentRepository, InMemoryAssignmentLogRepository, InMemoryFileRepository,
    InMemoryPaymentRepository,
};
pub use postgres::{
    PgAgentRepository, PgAssignmentLogRepository, PgFileRepository, PgPaymentRepository,
};
pub use traits::{
    AgentRepository, AssignmentLogRepository, FileRepository, PaymentRepository,
};
