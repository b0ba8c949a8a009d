use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge};

use crate::error::FetchError;

lazy_static! {
    // ── Upstream accessors ──────────────────────────────────────────────────
    pub static ref UPSTREAM_REQUESTS_COUNTER: CounterVec = register_counter_vec!(
        "scs_tv_upstream_requests_total",
        "Upstream fetches by service and outcome",
        &["service", "outcome"]
    ).unwrap();

    // ── Schedule derivation ─────────────────────────────────────────────────
    pub static ref DROPPED_ROWS_COUNTER: Counter = register_counter!(
        "scs_tv_schedule_dropped_rows_total",
        "Schedule rows dropped because their date could not be parsed"
    ).unwrap();

    // ── Display sessions ────────────────────────────────────────────────────
    pub static ref DISPLAY_SESSIONS_GAUGE: Gauge = register_gauge!(
        "scs_tv_display_sessions",
        "Connected kiosk display sessions"
    ).unwrap();
}

/// Count one accessor call.
pub fn record_fetch<T>(service: &str, result: &Result<T, FetchError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    UPSTREAM_REQUESTS_COUNTER
        .with_label_values(&[service, outcome])
        .inc();
}
