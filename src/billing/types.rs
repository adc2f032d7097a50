use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Checkout payment state. Moves once, from `Created` to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Created,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "CREATED",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(PaymentStatus::Created),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "EXPIRED" => Ok(SubscriptionStatus::Expired),
            "CANCELLED" => Ok(SubscriptionStatus::Cancelled),
            other => Err(format!("Unknown subscription status: {}", other)),
        }
    }
}

/// A checkout attempt. `amount` is in display units (e.g. rupees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub order_id: String,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_id: Uuid,
    /// The payment record (not the gateway payment id) that paid for it
    pub payment_id: Uuid,
}

/// Checkout request from a signed-in user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub plan: String,
}

/// What the browser checkout widget needs to open the gateway dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    /// Gateway sub-units
    pub amount: i64,
    pub currency: String,
    /// Public gateway key id
    pub key: String,
    pub payment_record_id: Uuid,
}

/// Body posted by the checkout widget after payment
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: String,
    #[serde(default)]
    pub plan: String,
}

#[derive(Debug, Clone)]
pub struct VerifyPaymentInput {
    pub payment_id: String,
    pub signature: String,
    pub plan: String,
    pub user_id: Uuid,
}

impl VerifyPaymentRequest {
    pub fn into_input(self, user_id: Uuid) -> VerifyPaymentInput {
        VerifyPaymentInput {
            payment_id: self.payment_id,
            signature: self.signature,
            plan: self.plan,
            user_id,
        }
    }
}

/// Convert display units to gateway sub-units.
pub fn to_sub_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_unit_rounding() {
        assert_eq!(to_sub_units(999.0), 99_900);
        assert_eq!(to_sub_units(19.99), 1_999);
        assert_eq!(to_sub_units(0.5), 50);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!("FAILED".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert_eq!(
            "CANCELLED".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Cancelled
        );
    }

    #[test]
    fn test_verify_request_accepts_gateway_field_names() {
        let json = serde_json::json!({
            "razorpay_payment_id": "pay_123",
            "razorpay_signature": "abc",
            "plan": "pro"
        });
        let request: VerifyPaymentRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.payment_id, "pay_123");
        assert_eq!(request.signature, "abc");
    }
}
