use anyhow::Result;
use rapidroute::alert_sinks::{ConsoleAlertSink, LogAlertSink, NatsAlertPublisher};
use rapidroute::engine::AlertEngine;
use rapidroute::report_sources::NatsReportSource;
use std::path::PathBuf;
use tracing::info;

use super::{load_processor, maybe_start_metrics};

pub struct RunOptions {
    pub nats_url: String,
    pub subject: String,
    pub publish_prefix: Option<String>,
    pub metrics_port: Option<u16>,
    pub show_telemetry: bool,
}

/// Subscribe to report lines on NATS and alert until the subscription ends or Ctrl+C
pub async fn handle_run(config: Option<PathBuf>, options: RunOptions) -> Result<()> {
    let RunOptions {
        nats_url,
        subject,
        publish_prefix,
        metrics_port,
        show_telemetry,
    } = options;

    let processor = load_processor(config)?;
    maybe_start_metrics(metrics_port)?;

    info!("Connecting to NATS at {}...", nats_url);
    let source = NatsReportSource::connect(&nats_url, &subject, "rapidroute-engine").await?;
    info!("Subscribed to {}", subject);

    let mut engine = AlertEngine::new(processor)
        .with_sink(LogAlertSink)
        .with_sink(ConsoleAlertSink::new(show_telemetry));

    if let Some(prefix) = publish_prefix {
        let publisher = NatsAlertPublisher::new(&nats_url, &prefix).await?;
        info!("Publishing alert events under {}.*", prefix);
        engine = engine.with_sink(publisher);
    }

    engine.run(source).await?;
    Ok(())
}
