use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Status of one gateway payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Captured,
    Failed,
    Refunded,
}

/// One attempt to pay for exactly one file by one user.
///
/// For verification a payment is looked up by the triple
/// (gateway_order_id, file_id, user_id); that triple must resolve to at most
/// one capturable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Payment {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    /// Amount in decimal currency units.
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: String,
    pub gateway_signature: Option<String>,
    /// Payment method tag reported by the gateway (card, upi, netbanking, ...).
    pub method: Option<String>,
    pub request_ip: Option<String>,
    pub user_agent: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for recording a new payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: String,
    #[serde(default)]
    pub gateway_signature: Option<String>,
    /// Defaults to `captured`: a client-confirmed capture awaiting server
    /// verification.
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub request_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Payment {
    pub fn from_request(req: &CreatePaymentRequest) -> Self {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            file_id: req.file_id,
            user_id: req.user_id,
            amount: req.amount,
            currency: req.currency.clone(),
            status: req.status.unwrap_or(PaymentStatus::Captured),
            gateway_order_id: req.gateway_order_id.clone(),
            gateway_payment_id: req.gateway_payment_id.clone(),
            gateway_signature: req.gateway_signature.clone(),
            method: req.method.clone(),
            request_ip: req.request_ip.clone(),
            user_agent: req.user_agent.clone(),
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePaymentRequest {
        CreatePaymentRequest {
            file_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Decimal::new(500, 0),
            currency: "INR".to_string(),
            gateway_order_id: Some("order_1".to_string()),
            gateway_payment_id: "pay_1".to_string(),
            gateway_signature: None,
            status: None,
            method: None,
            request_ip: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_default_status_is_captured() {
        let payment = Payment::from_request(&request());
        assert_eq!(payment.status, PaymentStatus::Captured);
        assert!(payment.failure_reason.is_none());
    }

    #[test]
    fn test_explicit_status_is_kept() {
        let mut req = request();
        req.status = Some(PaymentStatus::Pending);
        let payment = Payment::from_request(&req);
        assert_eq!(payment.status, PaymentStatus::Pending);
    }
}
