//! RapidRoute - proximity and arrival alerts for traffic signals
//!
//! This library turns periodic vehicle position reports into operator alerts
//! when the vehicle approaches or reaches the next signal on its route.

pub mod alert_sinks;
pub mod config;
pub mod engine;
pub mod geodesy;
pub mod log_format;
pub mod metrics;
pub mod proximity;
pub mod report;
pub mod report_sources;
pub mod signals;

pub use alert_sinks::{AlertSink, ConsoleAlertSink, LogAlertSink, NatsAlertPublisher};
pub use config::{AlertConfig, ConfigFile};
pub use engine::{AlertEngine, EngineStats};
pub use geodesy::CompassOctant;
pub use proximity::{AlertEvent, AlertState, ProximityProcessor, ReportError};
pub use report::{ParseReportError, PositionReport};
pub use report_sources::{HttpPollReportSource, NatsReportSource, ReplayReportSource, ReportSource};
pub use signals::{Waypoint, WaypointRegistry};
