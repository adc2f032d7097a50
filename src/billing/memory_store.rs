//! In-memory billing storage using DashMap.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{BillingRepository, BillingStoreError};
use super::types::{Payment, PaymentStatus, Subscription, SubscriptionStatus};

pub struct MemoryBillingStore {
    payments: DashMap<Uuid, Payment>,
    subscriptions: DashMap<Uuid, Subscription>,
    /// Serializes activation so the one-active-subscription check and the
    /// payment transition happen together
    activation: Mutex<()>,
}

impl Default for MemoryBillingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBillingStore {
    pub fn new() -> Self {
        Self {
            payments: DashMap::new(),
            subscriptions: DashMap::new(),
            activation: Mutex::new(()),
        }
    }

    pub fn payment(&self, id: Uuid) -> Option<Payment> {
        self.payments.get(&id).map(|p| p.clone())
    }

    pub fn subscriptions_for(&self, user_id: Uuid) -> Vec<Subscription> {
        self.subscriptions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn has_active(&self, user_id: Uuid) -> bool {
        self.subscriptions
            .iter()
            .any(|entry| entry.user_id == user_id && entry.status == SubscriptionStatus::Active)
    }
}

#[async_trait]
impl BillingRepository for MemoryBillingStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), BillingStoreError> {
        if self
            .payments
            .iter()
            .any(|entry| entry.order_id == payment.order_id)
        {
            return Err(BillingStoreError::DuplicateOrder(payment.order_id.clone()));
        }
        self.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_payment_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, BillingStoreError> {
        Ok(self
            .payments
            .iter()
            .find(|entry| entry.order_id == order_id)
            .map(|entry| entry.value().clone()))
    }

    async fn activate(
        &self,
        payment_record_id: Uuid,
        gateway_payment_id: &str,
        signature: &str,
        subscription: &Subscription,
    ) -> Result<Option<Payment>, BillingStoreError> {
        let _guard = self
            .activation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(mut payment) = self.payments.get_mut(&payment_record_id) else {
            return Ok(None);
        };
        if payment.status != PaymentStatus::Created {
            return Ok(None);
        }
        if subscription.status == SubscriptionStatus::Active && self.has_active(subscription.user_id)
        {
            return Err(BillingStoreError::ActiveSubscriptionExists);
        }

        payment.status = PaymentStatus::Success;
        payment.payment_id = Some(gateway_payment_id.to_string());
        payment.signature = Some(signature.to_string());
        let updated = payment.clone();
        drop(payment);

        self.subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(Some(updated))
    }

    async fn mark_failed(&self, payment_record_id: Uuid) -> Result<bool, BillingStoreError> {
        Ok(match self.payments.get_mut(&payment_record_id) {
            Some(mut payment) if payment.status == PaymentStatus::Created => {
                payment.status = PaymentStatus::Failed;
                true
            }
            _ => false,
        })
    }

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError> {
        Ok(self
            .subscriptions
            .iter()
            .find(|entry| entry.user_id == user_id && entry.status == SubscriptionStatus::Active)
            .map(|entry| entry.value().clone()))
    }

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError> {
        Ok(self
            .subscriptions_for(user_id)
            .into_iter()
            .max_by_key(|s| s.start_date))
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, BillingStoreError> {
        let mut payments: Vec<Payment> =
            self.payments.iter().map(|e| e.value().clone()).collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn count_subscriptions(&self) -> Result<u64, BillingStoreError> {
        Ok(self.subscriptions.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn payment(order_id: &str) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            order_id: order_id.to_string(),
            payment_id: None,
            signature: None,
            amount: 999.0,
            currency: "INR".to_string(),
            status: PaymentStatus::Created,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    fn subscription_for(payment: &Payment) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            plan: "pro".to_string(),
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: now + Duration::days(30),
            user_id: payment.user_id,
            payment_id: payment.id,
        }
    }

    #[tokio::test]
    async fn test_activate_only_from_created() {
        let store = MemoryBillingStore::new();
        let p = payment("order_1");
        store.insert_payment(&p).await.unwrap();

        let activated = store
            .activate(p.id, "pay_1", "sig", &subscription_for(&p))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(activated.status, PaymentStatus::Success);
        assert_eq!(activated.payment_id.as_deref(), Some("pay_1"));

        // Second activation is rejected and creates nothing
        let again = store
            .activate(p.id, "pay_1", "sig", &subscription_for(&p))
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(store.subscriptions_for(p.user_id).len(), 1);
    }

    #[tokio::test]
    async fn test_mark_failed_only_from_created() {
        let store = MemoryBillingStore::new();
        let p = payment("order_2");
        store.insert_payment(&p).await.unwrap();
        store
            .activate(p.id, "pay_2", "sig", &subscription_for(&p))
            .await
            .unwrap();

        assert!(!store.mark_failed(p.id).await.unwrap());
        assert_eq!(store.payment(p.id).unwrap().status, PaymentStatus::Success);

        let q = payment("order_3");
        store.insert_payment(&q).await.unwrap();
        assert!(store.mark_failed(q.id).await.unwrap());
        assert_eq!(store.payment(q.id).unwrap().status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_second_active_subscription_rejected() {
        let store = MemoryBillingStore::new();
        let first = payment("order_4");
        let mut second = payment("order_5");
        second.user_id = first.user_id;
        store.insert_payment(&first).await.unwrap();
        store.insert_payment(&second).await.unwrap();

        store
            .activate(first.id, "pay_4", "sig", &subscription_for(&first))
            .await
            .unwrap();
        let result = store
            .activate(second.id, "pay_5", "sig", &subscription_for(&second))
            .await;
        assert!(matches!(
            result,
            Err(BillingStoreError::ActiveSubscriptionExists)
        ));
        assert_eq!(
            store.payment(second.id).unwrap().status,
            PaymentStatus::Created
        );
    }

    #[tokio::test]
    async fn test_duplicate_order_rejected() {
        let store = MemoryBillingStore::new();
        store.insert_payment(&payment("order_6")).await.unwrap();
        assert!(matches!(
            store.insert_payment(&payment("order_6")).await,
            Err(BillingStoreError::DuplicateOrder(_))
        ));
    }
}
