//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    FOLLOW_UPS_TOTAL, ORDERS_CREATED_TOTAL, PAYMENTS_TOTAL, RENDERED_HTML_BYTES,
    SUBSCRIPTIONS_CREATED_TOTAL, TEMPLATE_MUTATIONS_TOTAL, TEMPLATE_REQUESTS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    /// Record a public request outcome (`ok`, `not_found`, `forbidden`, `error`)
    pub fn record_request(endpoint: &str, outcome: &str) {
        TEMPLATE_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
    }

    /// Record the size of a rendered document
    pub fn record_rendered(bytes: usize) {
        RENDERED_HTML_BYTES.observe(bytes as f64);
    }

    /// Record an authoring mutation
    pub fn record_mutation(operation: &str) {
        TEMPLATE_MUTATIONS_TOTAL
            .with_label_values(&[operation])
            .inc();
    }
}

/// Helper struct for recording billing metrics
pub struct BillingMetrics;

impl BillingMetrics {
    pub fn record_order_created() {
        ORDERS_CREATED_TOTAL.inc();
    }

    pub fn record_payment(status: &str) {
        PAYMENTS_TOTAL.with_label_values(&[status]).inc();
    }

    pub fn record_subscription_created() {
        SUBSCRIPTIONS_CREATED_TOTAL.inc();
    }
}

/// Helper struct for recording follow-up metrics
pub struct FollowUpMetrics;

impl FollowUpMetrics {
    pub fn record_sent(kind: &str) {
        FOLLOW_UPS_TOTAL.with_label_values(&[kind, "sent"]).inc();
    }

    pub fn record_failed(kind: &str) {
        FOLLOW_UPS_TOTAL.with_label_values(&[kind, "failed"]).inc();
    }
}
