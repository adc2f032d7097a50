//! Payments and subscriptions.
//!
//! A checkout creates a gateway order and a CREATED [`Payment`]. After the
//! payer completes the gateway dialog, verification checks the signature,
//! moves the payment to SUCCESS and activates a 30-day [`Subscription`].
//! A failed verification marks the payment FAILED.

pub mod factory;
pub mod gateway;
pub mod memory_store;
pub mod postgres_store;
pub mod signature;
pub mod store;
pub mod tracker;
pub mod types;

pub use factory::create_billing_repository;
pub use gateway::{
    GatewayError, GatewayOrder, GatewayOrderRequest, GatewayPayment, PaymentGateway,
    RazorpayGateway,
};
pub use memory_store::MemoryBillingStore;
pub use postgres_store::PostgresBillingStore;
pub use signature::{compute_signature, verify_signature};
pub use store::{BillingRepository, BillingStoreError};
pub use tracker::{PaymentTracker, SUBSCRIPTION_DAYS};
pub use types::{
    CreateOrderRequest, OrderResponse, Payment, PaymentStatus, Subscription, SubscriptionStatus,
    VerifyPaymentInput, VerifyPaymentRequest,
};
