//! Gateway callback signature verification.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 under a
//! shared secret and sends the hex digest alongside the callback. Comparison
//! is constant-time; a length mismatch is simply unequal.

use docflow_core::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 digest of `"{order_id}|{payment_id}"`.
pub fn compute_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Config("payment gateway secret rejected as HMAC key".to_string()))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a gateway-supplied signature.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    supplied: &str,
) -> Result<bool, AppError> {
    let expected = compute_signature(secret, order_id, payment_id)?;
    Ok(expected.as_bytes().ct_eq(supplied.as_bytes()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-gateway-secret";

    #[test]
    fn test_round_trip_verifies() {
        let sig = compute_signature(SECRET, "order_1", "pay_1").unwrap();
        assert!(verify_signature(SECRET, "order_1", "pay_1", &sig).unwrap());
    }

    #[test]
    fn test_signature_is_stable_hex() {
        let a = compute_signature(SECRET, "order_1", "pay_1").unwrap();
        let b = compute_signature(SECRET, "order_1", "pay_1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tampered_inputs_fail() {
        let sig = compute_signature(SECRET, "order_1", "pay_1").unwrap();
        assert!(!verify_signature(SECRET, "order_2", "pay_1", &sig).unwrap());
        assert!(!verify_signature(SECRET, "order_1", "pay_2", &sig).unwrap());
        assert!(!verify_signature("other-secret", "order_1", "pay_1", &sig).unwrap());
    }

    #[test]
    fn test_length_mismatch_is_unequal() {
        assert!(!verify_signature(SECRET, "order_1", "pay_1", "deadbeef").unwrap());
        assert!(!verify_signature(SECRET, "order_1", "pay_1", "").unwrap());
    }
}
