//! Checkout orders and payment verification.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{AppError, Result};
use crate::mail::EmailMessage;
use crate::metrics::BillingMetrics;
use crate::tasks::Outcome;
use crate::users::UserRepository;

use super::gateway::{GatewayError, GatewayOrderRequest, PaymentGateway};
use super::signature::verify_signature;
use super::store::{BillingRepository, BillingStoreError};
use super::types::{
    to_sub_units, OrderResponse, Payment, PaymentStatus, Subscription, SubscriptionStatus,
    VerifyPaymentInput,
};

/// Length of a subscription bought with one payment
pub const SUBSCRIPTION_DAYS: i64 = 30;

const CONFIRMATION_SUBJECT: &str = "Payment Successful – Your Subscription is Active 🎉";

/// Tracks payments from order creation to a verified subscription.
#[derive(Clone)]
pub struct PaymentTracker {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn BillingRepository>,
    users: Arc<dyn UserRepository>,
    config: GatewayConfig,
}

impl PaymentTracker {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn BillingRepository>,
        users: Arc<dyn UserRepository>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            gateway,
            repository,
            users,
            config,
        }
    }

    /// Open a gateway order and record a CREATED payment for it.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        amount: f64,
        plan: &str,
    ) -> Result<OrderResponse> {
        let Some((key_id, _)) = self.config.credentials() else {
            return Err(AppError::Configuration(
                "Razorpay configuration error. Please contact support.".to_string(),
            ));
        };

        let plan = plan.trim();
        if plan.is_empty() || !amount.is_finite() || amount == 0.0 {
            return Err(AppError::Validation(
                "Missing required parameters: userId, amount, or plan".to_string(),
            ));
        }
        if amount < 0.0 {
            return Err(AppError::Validation(
                "Amount must be greater than 0".to_string(),
            ));
        }

        let active = self
            .repository
            .find_active_subscription(user_id)
            .await
            .map_err(store_error("create order"))?;
        if active.is_some() {
            return Err(AppError::Conflict(
                "You already have an active subscription".to_string(),
            ));
        }

        let amount_sub_units = to_sub_units(amount);
        let request = GatewayOrderRequest {
            amount: amount_sub_units,
            currency: self.config.currency.clone(),
            receipt: format!("receipt_{}", Utc::now().timestamp_millis()),
            notes: HashMap::from([
                ("plan".to_string(), plan.to_string()),
                ("userId".to_string(), user_id.to_string()),
                ("type".to_string(), "one_time".to_string()),
            ]),
        };

        tracing::info!(
            user_id = %user_id,
            plan = %plan,
            amount = amount,
            amount_sub_units = amount_sub_units,
            currency = %request.currency,
            "Creating gateway order"
        );

        let order = self
            .gateway
            .create_order(&request)
            .await
            .map_err(gateway_error("create order"))?;

        if order.id.is_empty() {
            tracing::error!(?order, "Gateway returned an order without an id");
            return Err(AppError::Upstream(
                "Failed to create order: Invalid response from Razorpay".to_string(),
            ));
        }

        if order.amount != amount_sub_units {
            tracing::warn!(
                order_id = %order.id,
                sent = amount_sub_units,
                received = order.amount,
                "Gateway order amount differs from requested amount"
            );
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            order_id: order.id.clone(),
            payment_id: None,
            signature: None,
            amount,
            currency: self.config.currency.clone(),
            status: PaymentStatus::Created,
            user_id,
            created_at: Utc::now(),
        };
        self.repository
            .insert_payment(&payment)
            .await
            .map_err(store_error("create order"))?;

        BillingMetrics::record_order_created();
        tracing::info!(order_id = %order.id, payment_record_id = %payment.id, "Order created");

        Ok(OrderResponse {
            order_id: order.id,
            amount: amount_sub_units,
            currency: order.currency,
            key: key_id.to_string(),
            payment_record_id: payment.id,
        })
    }

    /// Verify a completed checkout and activate the subscription.
    ///
    /// Any failure marks the payment FAILED if it is still CREATED; the
    /// original error is returned either way.
    pub async fn verify_payment(&self, input: VerifyPaymentInput) -> Result<Outcome<Subscription>> {
        match self.activate(&input).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(
                    payment_id = %input.payment_id,
                    user_id = %input.user_id,
                    error = %err,
                    "Payment verification failed"
                );
                self.compensate(&input).await;
                Err(err)
            }
        }
    }

    async fn activate(&self, input: &VerifyPaymentInput) -> Result<Outcome<Subscription>> {
        let Some((_, secret)) = self.config.credentials() else {
            return Err(AppError::Configuration(
                "Payment verification configuration error.".to_string(),
            ));
        };

        if input.payment_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Payment ID is required for verification".to_string(),
            ));
        }
        if input.signature.trim().is_empty() {
            return Err(AppError::Validation(
                "Payment signature is required for verification".to_string(),
            ));
        }
        if input.plan.trim().is_empty() {
            return Err(AppError::Validation(
                "Plan information is required".to_string(),
            ));
        }

        let order_id = self.order_id_for(&input.payment_id).await?;

        if !verify_signature(secret, &order_id, &input.payment_id, &input.signature) {
            tracing::warn!(
                order_id = %order_id,
                payment_id = %input.payment_id,
                "Signature mismatch"
            );
            return Err(AppError::InvalidSignature(
                "Invalid signature, payment verification failed".to_string(),
            ));
        }

        let payment = self
            .repository
            .find_payment_by_order_id(&order_id)
            .await
            .map_err(store_error("verify payment"))?
            .ok_or_else(|| AppError::NotFound("Payment record not found in database".to_string()))?;

        let start_date = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            plan: input.plan.trim().to_string(),
            status: SubscriptionStatus::Active,
            start_date,
            end_date: start_date + Duration::days(SUBSCRIPTION_DAYS),
            user_id: input.user_id,
            payment_id: payment.id,
        };

        let activated = self
            .repository
            .activate(payment.id, &input.payment_id, &input.signature, &subscription)
            .await
            .map_err(store_error("verify payment"))?;

        if activated.is_none() {
            return Err(AppError::Conflict(
                "Payment has already been processed".to_string(),
            ));
        }

        BillingMetrics::record_payment(PaymentStatus::Success.as_str());
        BillingMetrics::record_subscription_created();
        tracing::info!(
            order_id = %order_id,
            subscription_id = %subscription.id,
            user_id = %input.user_id,
            plan = %subscription.plan,
            "Subscription activated"
        );

        let mut outcome = Outcome::new(subscription.clone());
        match self.users.find_by_id(input.user_id).await {
            Ok(Some(user)) => {
                let email = confirmation_email(&user.email, &user.name, &subscription);
                outcome = outcome.with_email(email);
            }
            Ok(None) => {
                tracing::warn!(user_id = %input.user_id, "No account for confirmation email");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %input.user_id,
                    error = %e,
                    "Failed to load account for confirmation email"
                );
            }
        }

        Ok(outcome)
    }

    async fn order_id_for(&self, payment_id: &str) -> Result<String> {
        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(gateway_error("verify payment"))?;

        payment.order_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            AppError::Upstream("Unable to fetch order details from Razorpay".to_string())
        })
    }

    /// Best-effort rollback of a failed verification. Errors are logged only.
    async fn compensate(&self, input: &VerifyPaymentInput) {
        if input.payment_id.trim().is_empty() || self.config.credentials().is_none() {
            return;
        }

        let order_id = match self.order_id_for(&input.payment_id).await {
            Ok(order_id) => order_id,
            Err(e) => {
                tracing::error!(
                    payment_id = %input.payment_id,
                    error = %e,
                    "Failed to mark payment as failed"
                );
                return;
            }
        };

        let payment = match self.repository.find_payment_by_order_id(&order_id).await {
            Ok(Some(payment)) => payment,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "Failed to mark payment as failed"
                );
                return;
            }
        };

        match self.repository.mark_failed(payment.id).await {
            Ok(true) => {
                BillingMetrics::record_payment(PaymentStatus::Failed.as_str());
                tracing::info!(order_id = %order_id, "Payment marked as failed");
            }
            Ok(false) => {
                tracing::debug!(
                    order_id = %order_id,
                    status = %payment.status,
                    "Payment already settled, left unchanged"
                );
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "Failed to mark payment as failed"
                );
            }
        }
    }

    /// The user's most recent subscription
    pub async fn user_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        self.repository
            .latest_subscription(user_id)
            .await
            .map_err(store_error("get subscription"))
    }

    /// Every payment, newest first
    pub async fn payment_logs(&self) -> Result<Vec<Payment>> {
        self.repository
            .list_payments()
            .await
            .map_err(store_error("get payments"))
    }

    pub async fn count_subscriptions(&self) -> Result<u64> {
        self.repository
            .count_subscriptions()
            .await
            .map_err(store_error("count subscriptions"))
    }
}

fn confirmation_email(to: &str, name: &str, subscription: &Subscription) -> EmailMessage {
    let name = if name.trim().is_empty() { "User" } else { name };
    let html = format!(
        "<p>Dear {name},</p>\
         <p>Your payment for the <strong>{plan}</strong> plan was successful.</p>\
         <p>Your subscription is now <strong>ACTIVE</strong> from <strong>{start}</strong> \
         to <strong>{end}</strong>.</p>\
         <p>Thank you for choosing <strong>EverLetter</strong>!</p>",
        plan = subscription.plan,
        start = subscription.start_date.format("%a %b %d %Y"),
        end = subscription.end_date.format("%a %b %d %Y"),
    );
    EmailMessage::new(to, CONFIRMATION_SUBJECT, html)
}

fn gateway_error(action: &'static str) -> impl FnOnce(GatewayError) -> AppError {
    move |err| match err {
        GatewayError::Api { status, description } => {
            tracing::error!(
                status = status,
                description = %description,
                action = action,
                "Gateway error"
            );
            AppError::Upstream(description)
        }
        other => AppError::upstream(action)(other),
    }
}

fn store_error(action: &'static str) -> impl FnOnce(BillingStoreError) -> AppError {
    move |err| match err {
        BillingStoreError::ActiveSubscriptionExists => {
            AppError::Conflict("You already have an active subscription".to_string())
        }
        other => AppError::upstream(action)(other),
    }
}
