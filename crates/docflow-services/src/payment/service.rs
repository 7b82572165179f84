use chrono::Utc;
use docflow_core::models::{CreatePaymentRequest, FileStatus, Payment, PaymentStatus};
use docflow_core::AppError;
use docflow_db::traits::{FileRepository, PaymentRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::assignment::AssignmentService;
use crate::cache::{file_key, user_files_key, Cache};
use crate::payment::signature::verify_signature;

/// Reconciles gateway payments with file lifecycle state.
///
/// `create_payment` records the client-confirmed capture; `verify_payment`
/// is the server-side callback check. Both invalidate the cache entries they
/// know are stale. Agent assignment is triggered synchronously after a
/// capture but never fails the payment: an unassigned paid file is
/// recoverable via manual assignment, an unrecorded payment is not.
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    files: Arc<dyn FileRepository>,
    assignment: Arc<AssignmentService>,
    cache: Arc<Cache>,
    gateway_secret: String,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        files: Arc<dyn FileRepository>,
        assignment: Arc<AssignmentService>,
        cache: Arc<Cache>,
        gateway_secret: String,
    ) -> Self {
        Self {
            payments,
            files,
            assignment,
            cache,
            gateway_secret,
        }
    }

    /// Record a payment for a file. Defaults to `captured` when the caller
    /// supplies no status; a captured payment best-effort advances the file
    /// to `paid` and triggers agent assignment.
    #[tracing::instrument(skip(self, req), fields(file_id = %req.file_id, user_id = %req.user_id))]
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        if req.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "payment amount must be positive".to_string(),
            ));
        }
        if req.gateway_payment_id.trim().is_empty() {
            return Err(AppError::Validation(
                "gateway payment id is required".to_string(),
            ));
        }

        let file = self
            .files
            .get(req.file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", req.file_id)))?;
        if file.user_id != req.user_id {
            return Err(AppError::Forbidden(
                "file belongs to a different user".to_string(),
            ));
        }

        let payment = Payment::from_request(&req);
        self.payments.insert(&payment).await?;
        tracing::info!(payment_id = %payment.id, status = ?payment.status, "payment recorded");

        if payment.status == PaymentStatus::Captured {
            self.advance_to_paid(file.id, payment.id).await;
        }

        self.cache.invalidate(&user_files_key(req.user_id));
        self.cache.invalidate(&file_key(req.file_id));

        Ok(payment)
    }

    /// Verify a gateway callback. The signature check happens strictly
    /// before any state mutation; on success the payment is marked
    /// `captured` and the file `paid`. Safe to invoke twice with the same
    /// inputs: the second call repeats identical writes.
    #[tracing::instrument(skip(self, gateway_signature))]
    pub async fn verify_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        gateway_signature: &str,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Payment, AppError> {
        let valid = verify_signature(
            &self.gateway_secret,
            gateway_order_id,
            gateway_payment_id,
            gateway_signature,
        )?;
        if !valid {
            return Err(AppError::InvalidSignature(format!(
                "hmac mismatch for order {}",
                gateway_order_id
            )));
        }

        let mut payment = self
            .payments
            .find_for_verification(gateway_order_id, file_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("payment for order {}", gateway_order_id))
            })?;

        self.payments
            .set_status(payment.id, PaymentStatus::Captured, None)
            .await?;
        self.files
            .set_paid(file_id, payment.id, Utc::now())
            .await?;
        payment.status = PaymentStatus::Captured;
        payment.failure_reason = None;

        self.cache.invalidate(&user_files_key(user_id));
        self.cache.invalidate(&file_key(file_id));

        tracing::info!(payment_id = %payment.id, file_id = %file_id, "payment verified and captured");
        Ok(payment)
    }

    /// Mark a payment failed and drop the file back to the retry-eligible
    /// `pending` status.
    #[tracing::instrument(skip(self))]
    pub async fn mark_failed(
        &self,
        gateway_order_id: &str,
        file_id: Uuid,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        let payment = self
            .payments
            .find_for_verification(gateway_order_id, file_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("payment for order {}", gateway_order_id))
            })?;

        self.payments
            .set_status(payment.id, PaymentStatus::Failed, reason)
            .await?;
        self.files.set_status(file_id, FileStatus::Pending).await?;

        self.cache.invalidate(&user_files_key(user_id));
        self.cache.invalidate(&file_key(file_id));

        tracing::warn!(
            payment_id = %payment.id,
            file_id = %file_id,
            reason = reason.unwrap_or("unspecified"),
            "payment marked failed"
        );
        Ok(())
    }

    /// Best-effort: mark the file paid and hand it to an agent. Failures
    /// are logged, never propagated, so the payment record stands.
    async fn advance_to_paid(&self, file_id: Uuid, payment_id: Uuid) {
        if let Err(err) = self.files.set_paid(file_id, payment_id, Utc::now()).await {
            tracing::warn!(file_id = %file_id, error = %err, "failed to advance file to paid");
            return;
        }
        if let Err(err) = self.assignment.assign(file_id).await {
            tracing::warn!(file_id = %file_id, error = %err, "agent assignment failed after capture");
        }
    }
}
