use anyhow::Result;
use rapidroute::alert_sinks::ConsoleAlertSink;
use rapidroute::engine::{AlertEngine, EngineStats};
use rapidroute::report_sources::ReplayReportSource;
use std::path::PathBuf;

use super::load_processor;

/// Feed recorded report lines through the engine and print a summary.
/// Reads stdin when no path (or `-`) is given.
pub async fn handle_replay(
    config: Option<PathBuf>,
    path: Option<PathBuf>,
    alerts_only: bool,
) -> Result<EngineStats> {
    let processor = load_processor(config)?;
    let mut engine = AlertEngine::new(processor)
        .with_sink(ConsoleAlertSink::new(!alerts_only).without_timestamps());

    let stats = match path {
        Some(path) if path.as_os_str() != "-" => {
            engine.run(ReplayReportSource::from_file(&path).await?).await?
        }
        _ => engine.run(ReplayReportSource::stdin()).await?,
    };

    println!("{}", stats);
    Ok(stats)
}
