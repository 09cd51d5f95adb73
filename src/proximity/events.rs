use serde::Serialize;
use std::fmt;

use crate::geodesy::CompassOctant;

/// Notifications produced for the operator, in emission order per report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    /// Emitted for every accepted report
    Telemetry {
        start: String,
        destination: String,
        next: String,
        distance_meters: f64,
    },
    /// The vehicle reached the tracked signal
    Arrived { signal: String },
    /// The vehicle is inside the alert radius and getting closer.
    /// `direction` is the side of the signal the vehicle is coming from.
    Approaching {
        signal: String,
        direction: CompassOctant,
        distance_meters: f64,
    },
}

impl AlertEvent {
    /// Short label used for metrics and NATS subjects
    pub fn kind(&self) -> &'static str {
        match self {
            AlertEvent::Telemetry { .. } => "telemetry",
            AlertEvent::Arrived { .. } => "arrived",
            AlertEvent::Approaching { .. } => "approaching",
        }
    }

    /// Telemetry is continuous; the other kinds are actual alerts
    pub fn is_alert(&self) -> bool {
        !matches!(self, AlertEvent::Telemetry { .. })
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertEvent::Telemetry {
                start,
                destination,
                next,
                distance_meters,
            } => write!(
                f,
                "{} -> {} | next: {} | {} m",
                start,
                destination,
                next,
                distance_meters.round() as i64
            ),
            AlertEvent::Arrived { signal } => write!(f, "Arrived at {}", signal),
            AlertEvent::Approaching {
                signal,
                direction,
                distance_meters,
            } => write!(
                f,
                "Approaching {} from the {} ({} m)",
                signal,
                direction,
                distance_meters.round() as i64
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_distance() {
        let event = AlertEvent::Telemetry {
            start: "Chakli Circle".to_string(),
            destination: "Gotri Circle".to_string(),
            next: "Gotri Circle".to_string(),
            distance_meters: 699.6,
        };
        assert_eq!(
            event.to_string(),
            "Chakli Circle -> Gotri Circle | next: Gotri Circle | 700 m"
        );

        let event = AlertEvent::Approaching {
            signal: "Gotri Circle".to_string(),
            direction: CompassOctant::SouthEast,
            distance_meters: 400.4,
        };
        assert_eq!(
            event.to_string(),
            "Approaching Gotri Circle from the South-East (400 m)"
        );
    }

    #[test]
    fn test_json_is_tagged_by_kind() {
        let event = AlertEvent::Arrived {
            signal: "Gotri Circle".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "arrived");
        assert_eq!(json["signal"], "Gotri Circle");

        let event = AlertEvent::Approaching {
            signal: "Gotri Circle".to_string(),
            direction: CompassOctant::North,
            distance_meters: 120.0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "approaching");
        assert_eq!(json["direction"], "North");
        assert_eq!(event.kind(), "approaching");
        assert!(event.is_alert());
    }
}
