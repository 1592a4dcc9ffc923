//! Client-side metrics
//!
//! Labels carry operation names and outcomes only, never keys or values.
//! Nothing is recorded unless the application installs a recorder.

use metrics::{counter, histogram};
use std::time::Duration;

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_REMOTE_ERROR: &str = "remote_error";
pub const OUTCOME_TRANSPORT_ERROR: &str = "transport_error";

pub const PAGE_READ: &str = "read";
pub const PAGE_KEYS: &str = "keys";

pub fn record_request(operation: &str, outcome: &str, duration: Duration) {
    counter!(
        "zbase_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "zbase_request_duration_seconds",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_page_fetched(kind: &str) {
    counter!("zbase_pages_fetched_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_page_pushed(outcome: &str) {
    counter!("zbase_pages_pushed_total", "outcome" => outcome.to_string()).increment(1);
}
