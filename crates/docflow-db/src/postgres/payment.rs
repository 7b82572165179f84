use async_trait::async_trait;
use docflow_core::models::{Payment, PaymentStatus};
use docflow_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::PaymentRepository;

const PAYMENT_COLUMNS: &str = r#"
    id, file_id, user_id, amount, currency, status, gateway_order_id,
    gateway_payment_id, gateway_signature, method, request_ip, user_agent,
    failure_reason, created_at, updated_at
"#;

/// Repository for payment records
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, file_id, user_id, amount, currency, status, gateway_order_id,
                gateway_payment_id, gateway_signature, method, request_ip,
                user_agent, failure_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(payment.id)
        .bind(payment.file_id)
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status)
        .bind(&payment.gateway_order_id)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.gateway_signature)
        .bind(&payment.method)
        .bind(&payment.request_ip)
        .bind(&payment.user_agent)
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_for_verification(
        &self,
        gateway_order_id: &str,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        // A partial unique index guarantees the triple resolves to at most
        // one row; LIMIT 1 documents the expectation at the query level too.
        let row = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {}
            FROM payments
            WHERE gateway_order_id = $1 AND file_id = $2 AND user_id = $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(gateway_order_id)
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        failure_reason: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, failure_reason = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(payment_id)
        .bind(status)
        .bind(failure_reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
