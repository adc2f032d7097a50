//! Backend trait for payments and subscriptions.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::types::{Payment, Subscription};

#[derive(Debug, Error)]
pub enum BillingStoreError {
    #[error("User already has an active subscription")]
    ActiveSubscriptionExists,

    #[error("Order already recorded: {0}")]
    DuplicateOrder(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait BillingRepository: Send + Sync {
    fn backend_type(&self) -> &'static str;

    async fn insert_payment(&self, payment: &Payment) -> Result<(), BillingStoreError>;

    async fn find_payment_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, BillingStoreError>;

    /// Atomically move a payment from CREATED to SUCCESS and record its
    /// subscription. Returns `None`, changing nothing, when the payment is no
    /// longer CREATED.
    async fn activate(
        &self,
        payment_record_id: Uuid,
        gateway_payment_id: &str,
        signature: &str,
        subscription: &Subscription,
    ) -> Result<Option<Payment>, BillingStoreError>;

    /// Move a payment from CREATED to FAILED. Returns `false` when it was
    /// not CREATED.
    async fn mark_failed(&self, payment_record_id: Uuid) -> Result<bool, BillingStoreError>;

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError>;

    /// Most recent subscription of any status
    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError>;

    /// All payments, newest first
    async fn list_payments(&self) -> Result<Vec<Payment>, BillingStoreError>;

    async fn count_subscriptions(&self) -> Result<u64, BillingStoreError>;
}
