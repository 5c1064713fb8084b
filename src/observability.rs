use std::net::SocketAddr;

use anyhow::Context;

use crate::engine::EngineError;

// ── Request-driven metrics ──────────────────────────────────────

/// Counter: timeline computations served.
pub const TIMELINE_QUERIES_TOTAL: &str = "roomres_timeline_queries_total";

/// Histogram: timeline computation latency in seconds.
pub const TIMELINE_QUERY_DURATION_SECONDS: &str = "roomres_timeline_query_duration_seconds";

/// Counter: reservations admitted.
pub const RESERVATIONS_ADMITTED_TOTAL: &str = "roomres_reservations_admitted_total";

/// Counter: reservation requests rejected. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "roomres_reservations_rejected_total";

// ── Storage metrics ─────────────────────────────────────────────

/// Gauge: reservations held by the ledger.
pub const RESERVATIONS_STORED: &str = "roomres_reservations_stored";

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "roomres_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "roomres_wal_flush_batch_size";

/// Counter: WAL compactions completed.
pub const WAL_COMPACTIONS_TOTAL: &str = "roomres_wal_compactions_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> anyhow::Result<()> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to install Prometheus metrics exporter")?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a rejection to a short label for metrics.
pub fn rejection_label(err: &EngineError) -> &'static str {
    match err {
        EngineError::NotFound(_) => "not_found",
        EngineError::InvalidInput(_) => "invalid_input",
        EngineError::InvalidRange { .. } => "invalid_range",
        EngineError::ConflictWithReservation { .. } => "conflict_with_reservation",
        EngineError::ConflictWithClass { .. } => "conflict_with_class",
        EngineError::LimitExceeded(_) => "limit_exceeded",
        EngineError::Storage(_) => "storage",
    }
}
