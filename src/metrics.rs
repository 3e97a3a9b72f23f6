//! Metrics facade for the render engine (§4.4, §9: "the metrics registry,
//! external").
//!
//! The core never chooses an exporter — it emits through the `metrics` crate
//! facade, matching the `log`-facade pattern already used for logging
//! throughout [`crate::browser_pool`] and [`crate::server_pool`]. Whoever
//! wires up the outer API installs a recorder (Prometheus, StatsD, ...);
//! this crate only describes and increments.

use std::time::Duration;

const CONVERSION_TIME_HISTOGRAM: &str = "zpt_render_conversion_time_seconds";
const RENDER_SUCCESS_COUNTER: &str = "zpt_render_jobs_success_total";
const RENDER_FAILURE_COUNTER: &str = "zpt_render_jobs_failure_total";
const HTTP_SERVERS_GAUGE: &str = "zpt_render_http_servers_live";

/// Describes this crate's metrics with a recorder, if one is installed.
/// Safe to call more than once; recorders are expected to deduplicate by
/// name.
pub fn describe() {
    metrics::describe_histogram!(
        CONVERSION_TIME_HISTOGRAM,
        metrics::Unit::Seconds,
        "Wall-clock time from end of resource acquisition to end of the PDF stream read"
    );
    metrics::describe_counter!(RENDER_SUCCESS_COUNTER, "Render jobs that completed successfully");
    metrics::describe_counter!(RENDER_FAILURE_COUNTER, "Render jobs that failed");
    metrics::describe_gauge!(HTTP_SERVERS_GAUGE, "Currently live ephemeral asset servers");
}

/// Records one terminating job: exactly one histogram sample and one
/// success/fail counter increment, per §4.4.
pub fn record_job(elapsed: Duration, success: bool) {
    metrics::histogram!(CONVERSION_TIME_HISTOGRAM).record(elapsed.as_secs_f64());
    if success {
        metrics::counter!(RENDER_SUCCESS_COUNTER).increment(1);
    } else {
        metrics::counter!(RENDER_FAILURE_COUNTER).increment(1);
    }
}

/// Sets the live-asset-server gauge to `count`, mirroring the server pool's
/// `live_count()`.
pub fn set_live_servers(count: usize) {
    metrics::gauge!(HTTP_SERVERS_GAUGE).set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_job_does_not_panic_without_recorder() {
        record_job(Duration::from_millis(500), true);
        record_job(Duration::from_millis(100), false);
        set_live_servers(3);
    }
}
