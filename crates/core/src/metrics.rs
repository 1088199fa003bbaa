//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Publication pipeline (runs, stage failures, durations)
//! - Catalog mutations (updates, deletions) and onboarding
//! - External service traffic (requests, upload volume)
//! - Reconciliation backlog (orphaned external objects)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Publication Pipeline Metrics
// =============================================================================

/// Publication runs total by result.
pub static PUBLICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cratedig_publications_total", "Total publication runs"),
        &["result"], // "published", "failed", "rejected"
    )
    .unwrap()
});

/// Publication run duration in seconds.
pub static PUBLICATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cratedig_publication_duration_seconds",
            "Duration of publication runs",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Stage failures total by stage.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cratedig_publication_stage_failures_total",
            "Total publication stage failures",
        ),
        &["stage"], // "credential_issuance", "asset_upload", "commerce_provisioning", "persistence"
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cratedig_publication_stage_duration_seconds",
            "Duration of individual publication stages",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["stage"],
    )
    .unwrap()
});

/// Preview samples per published pack.
pub static SAMPLES_PER_PACK: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "cratedig_samples_per_pack",
            "Number of preview samples per published pack",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 50.0]),
    )
    .unwrap()
});

// =============================================================================
// Catalog Mutation and Onboarding Metrics
// =============================================================================

/// Pack updates completed.
pub static PACK_UPDATES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("cratedig_pack_updates_total", "Total pack updates").unwrap()
});

/// Pack deletions completed.
pub static PACK_DELETIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("cratedig_pack_deletions_total", "Total pack deletions").unwrap()
});

/// Onboarding links minted at the payment provider.
pub static ONBOARDING_LINKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cratedig_onboarding_links_total",
        "Total onboarding links created",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// Requests issued to external services.
pub static EXTERNAL_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cratedig_external_requests_total",
            "Total requests issued to external services",
        ),
        &["service"], // "signer", "storage", "payments"
    )
    .unwrap()
});

/// Asset bytes pushed through signed write URLs.
pub static UPLOAD_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cratedig_upload_bytes_total",
        "Total asset bytes pushed to object storage",
    )
    .unwrap()
});

// =============================================================================
// Reconciliation Metrics
// =============================================================================

/// External objects left behind by failed runs and deletions, by kind.
/// These need out-of-band cleanup; the audit log has the identifiers.
pub static ORPHANED_OBJECTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cratedig_orphaned_objects_total",
            "Total external objects orphaned and flagged for reconciliation",
        ),
        &["kind"], // "storage_object", "product"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Publication pipeline
        Box::new(PUBLICATIONS_TOTAL.clone()),
        Box::new(PUBLICATION_DURATION.clone()),
        Box::new(STAGE_FAILURES.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(SAMPLES_PER_PACK.clone()),
        // Catalog mutations and onboarding
        Box::new(PACK_UPDATES.clone()),
        Box::new(PACK_DELETIONS.clone()),
        Box::new(ONBOARDING_LINKS.clone()),
        // External services
        Box::new(EXTERNAL_REQUESTS.clone()),
        Box::new(UPLOAD_BYTES.clone()),
        // Reconciliation
        Box::new(ORPHANED_OBJECTS.clone()),
    ]
}
