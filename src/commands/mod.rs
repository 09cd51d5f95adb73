pub mod bearing;
pub mod poll;
pub mod replay;
pub mod run;
pub mod signals;

pub use bearing::handle_bearing;
pub use poll::handle_poll;
pub use replay::handle_replay;
pub use run::handle_run;
pub use signals::handle_signals;

use anyhow::Result;
use rapidroute::config::{ConfigFile, config_path};
use rapidroute::proximity::ProximityProcessor;
use std::path::PathBuf;
use tracing::info;

/// Load the config file (if any) and build a processor from it
pub(crate) fn load_processor(config_flag: Option<PathBuf>) -> Result<ProximityProcessor> {
    let config = match config_path(config_flag) {
        Some(path) => {
            info!("Loading config from {:?}", path);
            ConfigFile::load(&path)?
        }
        None => ConfigFile::default(),
    };

    let registry = config.registry()?;
    info!(
        "{} signals loaded; arrival radius {} m, alert radius {} m",
        registry.len(),
        config.alerts.arrival_distance_meters,
        config.alerts.alert_distance_meters
    );

    Ok(ProximityProcessor::new(registry, config.alerts))
}

/// Start the Prometheus exporter when a port was requested
pub(crate) fn maybe_start_metrics(metrics_port: Option<u16>) -> Result<()> {
    // Zeroed before the exporter starts so the first scrape sees every series
    rapidroute::metrics::initialize_alert_metrics();
    if let Some(port) = metrics_port {
        info!("Starting metrics server on port {}", port);
        rapidroute::metrics::start_metrics_exporter(port)?;
    }
    Ok(())
}
