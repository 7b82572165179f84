//! Domain models

pub mod agent;
pub mod file;
pub mod payment;

pub use agent::{Agent, AssignmentLogEntry};
pub use file::{
    AssignmentType, File, FileContentUpdate, FileStatus, FileSummary, RegisterUploadRequest,
};
pub use payment::{CreatePaymentRequest, Payment, PaymentStatus};
