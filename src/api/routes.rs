use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::server::AppState;

use super::{auth, billing, contact, health, metrics, public, stats, templates, users};

/// Unauthenticated template API. Served with permissive CORS.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(public::list_templates))
        .route(
            "/api/templates/{slug}",
            get(public::get_template).options(public::preflight),
        )
        .route(
            "/api/templates/{slug}/render",
            post(public::render_template).options(public::preflight),
        )
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & metrics
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/api/contact", post(contact::create_contact))
        .nest(
            "/api/auth",
            Router::new()
                .route("/sign-up", post(auth::sign_up))
                .route("/sign-in", post(auth::sign_in)),
        )
        .nest(
            "/api/billing",
            Router::new()
                .route("/orders", post(billing::create_order))
                .route("/verify", post(billing::verify_payment))
                .route("/subscription", get(billing::get_subscription)),
        )
        .nest("/api/dashboard", dashboard_routes())
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // Templates
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/templates/{id}/toggle-pro", post(templates::toggle_pro))
        .route("/templates/{id}/toggle-publish", post(templates::toggle_publish))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/toggle-ban", post(users::toggle_ban))
        .route("/users/{id}/toggle-permission", post(users::toggle_permission))
        .route("/users/{id}/role", put(users::change_role))
        .route("/api-keys", post(users::generate_api_key))
        // Admin
        .route("/stats", get(stats::stats))
        .route("/payments", get(billing::payment_logs))
        .route("/contacts", get(contact::list_contacts))
        .route("/contacts/{id}", delete(contact::delete_contact))
}
