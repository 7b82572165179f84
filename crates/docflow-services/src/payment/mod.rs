//! Payment reconciliation against the external gateway.

mod service;
pub mod signature;

pub use service::PaymentService;
