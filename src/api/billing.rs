//! Checkout and payment verification endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::Actor;
use crate::billing::{
    CreateOrderRequest, OrderResponse, Payment, Subscription, VerifyPaymentRequest,
};
use crate::error::Result;
use crate::server::{AppJson, AppState, StaffActor};

/// POST /api/billing/orders
#[tracing::instrument(
    name = "http.create_order",
    skip(state, actor, request),
    fields(user_id = %actor.id, plan = %request.plan)
)]
pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let order = state
        .billing
        .create_order(actor.id, request.amount, &request.plan)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /api/billing/verify
///
/// The account comes from the session, never from the body.
#[tracing::instrument(name = "http.verify_payment", skip_all, fields(user_id = %actor.id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<VerifyPaymentRequest>,
) -> Result<Json<Subscription>> {
    let outcome = state
        .billing
        .verify_payment(request.into_input(actor.id))
        .await?;
    Ok(Json(state.follow_ups.complete(outcome)))
}

/// GET /api/billing/subscription
#[tracing::instrument(name = "http.get_subscription", skip_all, fields(user_id = %actor.id))]
pub async fn get_subscription(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Option<Subscription>>> {
    Ok(Json(state.billing.user_subscription(actor.id).await?))
}

/// GET /api/dashboard/payments
#[tracing::instrument(name = "http.payment_logs", skip_all)]
pub async fn payment_logs(
    State(state): State<AppState>,
    _staff: StaffActor,
) -> Result<Json<Vec<Payment>>> {
    Ok(Json(state.billing.payment_logs().await?))
}
