use anyhow::Result;
use rapidroute::alert_sinks::{ConsoleAlertSink, LogAlertSink};
use rapidroute::engine::AlertEngine;
use rapidroute::report_sources::HttpPollReportSource;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::{load_processor, maybe_start_metrics};

/// Poll a producer's location endpoint and alert until Ctrl+C
pub async fn handle_poll(
    config: Option<PathBuf>,
    url: String,
    interval_ms: u64,
    metrics_port: Option<u16>,
    show_telemetry: bool,
) -> Result<()> {
    let processor = load_processor(config)?;
    maybe_start_metrics(metrics_port)?;

    info!("Polling {} every {} ms", url, interval_ms);
    let source = HttpPollReportSource::new(&url, Duration::from_millis(interval_ms.max(1)))?;

    let mut engine = AlertEngine::new(processor)
        .with_sink(LogAlertSink)
        .with_sink(ConsoleAlertSink::new(show_telemetry));

    engine.run(source).await?;
    Ok(())
}
