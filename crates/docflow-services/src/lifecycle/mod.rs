//! File lifecycle: registration, content replacement, comments, listings,
//! and orphan reconciliation.

mod service;

pub use service::{FileLifecycleService, OrphanReport, RegisteredUpload};
