//! Checkout signature verification.
//!
//! The gateway signs `order_id|payment_id` with the account's key secret
//! using HMAC-SHA256 and hands the hex digest to the browser.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 digest as lowercase hex
const SIGNATURE_HEX_LEN: usize = 64;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Hex-encoded HMAC-SHA256 of `order_id|payment_id`.
pub fn compute_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(mac_for(secret, order_id, payment_id).finalize().into_bytes())
}

/// Constant-time comparison against a hex signature. Only the canonical
/// spelling, 64 lowercase hex digits, is accepted.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    if !is_canonical_hex(signature) {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac_for(secret, order_id, payment_id)
        .verify_slice(&expected)
        .is_ok()
}

fn is_canonical_hex(signature: &str) -> bool {
    signature.len() == SIGNATURE_HEX_LEN
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
