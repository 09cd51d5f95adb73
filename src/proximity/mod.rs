//! Proximity alerting for the signal a vehicle is heading to
//!
//! Each accepted report runs one cycle:
//! 1. Resolve start, destination and next signal ids. Any unknown id drops the report.
//! 2. Start a new episode if the next signal changed.
//! 3. Emit telemetry with the distance to the next signal.
//! 4. Emit `Arrived` once per episode when inside the arrival radius.
//! 5. Emit `Approaching` while inside the alert radius, closer than on the previous
//!    report, and not yet arrived.
//! 6. Remember the distance for the next cycle.

mod alert_state;
mod events;

pub use alert_state::AlertState;
pub use events::AlertEvent;

use std::fmt;
use tracing::{debug, trace};

use crate::config::AlertConfig;
use crate::geodesy::{CompassOctant, haversine_distance, initial_bearing, reciprocal_bearing};
use crate::report::{ParseReportError, PositionReport};
use crate::signals::{Waypoint, WaypointRegistry};

/// Which id field of a report referenced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointRole {
    Start,
    Destination,
    Next,
}

impl fmt::Display for WaypointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointRole::Start => write!(f, "start"),
            WaypointRole::Destination => write!(f, "destination"),
            WaypointRole::Next => write!(f, "next"),
        }
    }
}

/// Why a report was dropped without touching the alert state
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    Malformed(ParseReportError),
    UnknownWaypoint { role: WaypointRole, id: u32 },
}

impl ReportError {
    /// Metric label for the drop reason
    pub fn reason(&self) -> &'static str {
        match self {
            ReportError::Malformed(_) => "malformed",
            ReportError::UnknownWaypoint { .. } => "unknown_waypoint",
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Malformed(e) => write!(f, "malformed report: {}", e),
            ReportError::UnknownWaypoint { role, id } => {
                write!(f, "unknown {} signal id {}", role, id)
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Malformed(e) => Some(e),
            ReportError::UnknownWaypoint { .. } => None,
        }
    }
}

impl From<ParseReportError> for ReportError {
    fn from(e: ParseReportError) -> Self {
        ReportError::Malformed(e)
    }
}

/// Turns position reports into alert events for a single vehicle
pub struct ProximityProcessor {
    registry: WaypointRegistry,
    config: AlertConfig,
    state: AlertState,
}

impl ProximityProcessor {
    pub fn new(registry: WaypointRegistry, config: AlertConfig) -> Self {
        Self {
            registry,
            config,
            state: AlertState::new(),
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn registry(&self) -> &WaypointRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Parse and process one wire-format line
    pub fn process_line(&mut self, line: &str) -> Result<Vec<AlertEvent>, ReportError> {
        let report: PositionReport = line.parse()?;
        self.process_report(&report)
    }

    /// Run one alert cycle. On error nothing is emitted and the state is untouched.
    pub fn process_report(
        &mut self,
        report: &PositionReport,
    ) -> Result<Vec<AlertEvent>, ReportError> {
        let start = resolve(&self.registry, WaypointRole::Start, report.start_id)?;
        let destination = resolve(&self.registry, WaypointRole::Destination, report.dest_id)?;
        let next = resolve(&self.registry, WaypointRole::Next, report.next_id)?;

        if self.state.track(&next.name) {
            debug!("Now tracking signal {} '{}'", next.id, next.name);
        }

        let distance = haversine_distance(
            report.vehicle_lat,
            report.vehicle_lon,
            next.latitude,
            next.longitude,
        );
        trace!(
            "{:.1} m to '{}' (previous {:.1} m)",
            distance,
            next.name,
            self.state.last_distance_meters()
        );

        let mut events = vec![AlertEvent::Telemetry {
            start: start.name.clone(),
            destination: destination.name.clone(),
            next: next.name.clone(),
            distance_meters: distance,
        }];

        if distance <= self.config.arrival_distance_meters && !self.state.arrival_alerted() {
            self.state.mark_arrived();
            events.push(AlertEvent::Arrived {
                signal: next.name.clone(),
            });
        }

        let approach_latched = self.config.approach_alert_once && self.state.approach_alerted();
        if distance <= self.config.alert_distance_meters
            && distance < self.state.last_distance_meters()
            && !self.state.arrival_alerted()
            && !approach_latched
        {
            let bearing = initial_bearing(
                report.vehicle_lat,
                report.vehicle_lon,
                next.latitude,
                next.longitude,
            );
            let direction = CompassOctant::from_bearing(reciprocal_bearing(bearing));
            self.state.mark_approach_alerted();
            events.push(AlertEvent::Approaching {
                signal: next.name.clone(),
                direction,
                distance_meters: distance,
            });
        }

        self.state.record_distance(distance);
        Ok(events)
    }
}

fn resolve(
    registry: &WaypointRegistry,
    role: WaypointRole,
    id: u32,
) -> Result<&Waypoint, ReportError> {
    registry
        .lookup(id)
        .ok_or(ReportError::UnknownWaypoint { role, id })
}
