//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Cratedig server:
//! - HTTP request metrics (latency, counts, errors)
//! - Catalog size and audit trail gauges (collected dynamically)
//!
//! Pipeline counters live in `cratedig_core::metrics` and are registered
//! into the same registry here.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cratedig_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cratedig_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cratedig_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cratedig_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Published packs currently in the catalog.
pub static CATALOG_PACKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cratedig_catalog_packs",
        "Number of published packs in the catalog",
    )
    .unwrap()
});

// =============================================================================
// Audit Metrics (collected dynamically)
// =============================================================================

/// Audit records by event type.
pub static AUDIT_EVENTS_BY_TYPE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "cratedig_audit_events_by_type",
            "Stored audit records by event type",
        ),
        &["type"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Catalog
    registry.register(Box::new(CATALOG_PACKS.clone())).unwrap();

    // Audit
    registry
        .register(Box::new(AUDIT_EVENTS_BY_TYPE.clone()))
        .unwrap();

    // Core metrics (publication pipeline, onboarding, orphan tracking)
    for metric in cratedig_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current
/// values from the catalog and the audit store.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    // Update catalog size
    if let Ok(count) = state.packs().count_packs() {
        CATALOG_PACKS.set(count);
    }

    // Update audit record counts by event type
    for event_type in [
        "service_started",
        "service_stopped",
        "creator_registered",
        "onboarding_started",
        "publication_started",
        "credentials_issued",
        "assets_uploaded",
        "commerce_provisioned",
        "pack_published",
        "publication_failed",
        "pack_updated",
        "pack_deleted",
    ] {
        let filter = cratedig_core::AuditFilter::new().with_event_type(event_type);
        if let Ok(count) = state.audit_store().count(&filter) {
            AUDIT_EVENTS_BY_TYPE
                .with_label_values(&[event_type])
                .set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Slugs and creator ids are free-form path segments; collapse them so
    // label cardinality stays bounded.
    let pack_regex = regex_lite::Regex::new(r"/packs/[^/]+").unwrap();
    let creator_regex = regex_lite::Regex::new(r"/creators/[^/]+").unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = creator_regex.replace_all(path, "/creators/{id}");
    let result = pack_regex.replace_all(&result, "/packs/{slug}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
