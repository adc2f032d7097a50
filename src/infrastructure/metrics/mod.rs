//! Prometheus metrics for the EverLetter service.
//!
//! - Template metrics (public renders by outcome, authoring mutations)
//! - Billing metrics (orders, payment transitions, subscriptions)
//! - Follow-up metrics (best-effort notification emails)

mod helpers;

pub use helpers::{encode_metrics, BillingMetrics, FollowUpMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "everletter";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Public template lookups and renders by endpoint and outcome
    pub static ref TEMPLATE_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_requests_total", METRIC_PREFIX),
        "Public template requests by endpoint and outcome",
        &["endpoint", "outcome"]
    ).unwrap();

    /// Size of rendered HTML documents
    pub static ref RENDERED_HTML_BYTES: Histogram = register_histogram!(
        format!("{}_rendered_html_bytes", METRIC_PREFIX),
        "Size of rendered template HTML in bytes",
        vec![512.0, 2048.0, 8192.0, 32768.0, 131072.0, 524288.0]
    ).unwrap();

    /// Template authoring mutations by operation
    pub static ref TEMPLATE_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_mutations_total", METRIC_PREFIX),
        "Template mutations by operation",
        &["operation"]
    ).unwrap();

    // ============================================================================
    // Billing Metrics
    // ============================================================================

    /// Checkout orders created at the gateway
    pub static ref ORDERS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_orders_created_total", METRIC_PREFIX),
        "Total checkout orders created"
    ).unwrap();

    /// Payment transitions by terminal status
    pub static ref PAYMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_payments_total", METRIC_PREFIX),
        "Payment transitions by resulting status",
        &["status"]
    ).unwrap();

    /// Subscriptions activated after verified payment
    pub static ref SUBSCRIPTIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_subscriptions_created_total", METRIC_PREFIX),
        "Total subscriptions activated"
    ).unwrap();

    // ============================================================================
    // Follow-up Metrics
    // ============================================================================

    /// Best-effort follow-up tasks by outcome
    pub static ref FOLLOW_UPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_follow_ups_total", METRIC_PREFIX),
        "Best-effort follow-up tasks by kind and outcome",
        &["kind", "outcome"]
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registered() {
        TEMPLATE_REQUESTS_TOTAL
            .with_label_values(&["render", "ok"])
            .inc();
        ORDERS_CREATED_TOTAL.inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("everletter_template_requests_total"));
        assert!(output.contains("everletter_orders_created_total"));
    }
}
