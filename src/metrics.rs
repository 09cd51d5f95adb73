use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Drop reasons reported under `reports.dropped_total{reason}`
pub const DROP_REASONS: [&str; 2] = ["malformed", "unknown_waypoint"];

/// Event kinds reported under `alerts.emitted_total{kind}`
pub const EVENT_KINDS: [&str; 3] = ["telemetry", "arrived", "approaching"];

/// Start the Prometheus exporter with its own HTTP listener on `0.0.0.0:<port>`
///
/// Must be called from within a tokio runtime.
pub fn start_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("Failed to start metrics exporter on {}", addr))?;

    info!("Metrics available at http://{}/metrics", addr);
    Ok(())
}

/// Initialize alert engine metrics to zero so they appear before any report arrives
pub fn initialize_alert_metrics() {
    // Intake
    metrics::counter!("reports.received_total").absolute(0);
    metrics::counter!("reports.poll_error_total").absolute(0);
    for reason in DROP_REASONS {
        metrics::counter!("reports.dropped_total", "reason" => reason).absolute(0);
    }
    metrics::gauge!("reports.queue_depth").set(0.0);

    // Alerts
    for kind in EVENT_KINDS {
        metrics::counter!("alerts.emitted_total", "kind" => kind).absolute(0);
    }
    metrics::counter!("alerts.publish_error_total").absolute(0);
    metrics::gauge!("alerts.tracked_distance_meters").set(0.0);
}
