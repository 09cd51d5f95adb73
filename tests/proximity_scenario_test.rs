use rapidroute::config::AlertConfig;
use rapidroute::geodesy::{CompassOctant, EARTH_RADIUS_M};
use rapidroute::proximity::{AlertEvent, ProximityProcessor, ReportError, WaypointRole};
use rapidroute::signals::WaypointRegistry;

const GOTRI_LAT: f64 = 22.315556;
const GOTRI_LON: f64 = 73.138000;

/// Wire line for a vehicle `meters` due south of Gotri Circle heading to it
fn line_south_of_gotri(meters: f64, next_id: u32) -> String {
    let lat = GOTRI_LAT - (meters / EARTH_RADIUS_M).to_degrees();
    format!(
        "{:.6},{:.6},{:.6},{:.6},1,5,{}",
        lat,
        GOTRI_LON,
        lat - 0.0001,
        GOTRI_LON,
        next_id
    )
}

fn processor() -> ProximityProcessor {
    ProximityProcessor::new(WaypointRegistry::builtin(), AlertConfig::default())
}

fn alerts(events: &[AlertEvent]) -> Vec<&AlertEvent> {
    events.iter().filter(|e| e.is_alert()).collect()
}

#[test]
fn test_approach_then_arrival_at_gotri() {
    let mut processor = processor();

    // 900 m: outside the alert radius
    let events = processor.process_line(&line_south_of_gotri(900.0, 5)).unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        AlertEvent::Telemetry {
            start,
            destination,
            next,
            distance_meters,
        } => {
            assert_eq!(start, "Chakli Circle");
            assert_eq!(destination, "Gotri Circle");
            assert_eq!(next, "Gotri Circle");
            assert!((distance_meters - 900.0).abs() < 1.0);
        }
        other => panic!("expected telemetry, got {:?}", other),
    }

    // 700 m and 400 m: approaching from the south each time
    for meters in [700.0, 400.0] {
        let events = processor.process_line(&line_south_of_gotri(meters, 5)).unwrap();
        assert_eq!(events.len(), 2, "at {} m", meters);
        assert_eq!(events[0].kind(), "telemetry");
        match &events[1] {
            AlertEvent::Approaching {
                signal,
                direction,
                distance_meters,
            } => {
                assert_eq!(signal, "Gotri Circle");
                assert_eq!(*direction, CompassOctant::South);
                assert!((distance_meters - meters).abs() < 1.0);
            }
            other => panic!("expected approaching, got {:?}", other),
        }
    }

    // 40 m: arrival, no approach alert
    let events = processor.process_line(&line_south_of_gotri(40.0, 5)).unwrap();
    assert_eq!(
        alerts(&events),
        vec![&AlertEvent::Arrived {
            signal: "Gotri Circle".to_string()
        }]
    );

    // Still closing in after arrival: telemetry only
    for meters in [20.0, 5.0] {
        let events = processor.process_line(&line_south_of_gotri(meters, 5)).unwrap();
        assert!(alerts(&events).is_empty(), "at {} m", meters);
    }
    assert!(processor.state().arrival_alerted());
}

#[test]
fn test_unknown_next_signal_changes_nothing() {
    let mut processor = processor();
    processor.process_line(&line_south_of_gotri(700.0, 5)).unwrap();
    let before = processor.state().clone();

    let result = processor.process_line(&line_south_of_gotri(400.0, 999));
    assert_eq!(
        result,
        Err(ReportError::UnknownWaypoint {
            role: WaypointRole::Next,
            id: 999
        })
    );
    assert_eq!(processor.state(), &before);

    // Processing resumes with the same episode
    let events = processor.process_line(&line_south_of_gotri(400.0, 5)).unwrap();
    assert_eq!(alerts(&events).len(), 1);
}

#[test]
fn test_malformed_lines_are_dropped() {
    let mut processor = processor();
    processor.process_line(&line_south_of_gotri(700.0, 5)).unwrap();
    let before = processor.state().clone();

    for line in [
        "",
        "22.3,73.1,22.3,73.1,1,5",
        "22.3,73.1,22.3,73.1,1,5,5,9",
        "north,73.1,22.3,73.1,1,5,5",
        "22.3,73.1,22.3,73.1,1,5,-5",
        "95.0,73.1,22.3,73.1,1,5,5",
    ] {
        let result = processor.process_line(line);
        assert!(
            matches!(result, Err(ReportError::Malformed(_))),
            "{:?} gave {:?}",
            line,
            result
        );
    }
    assert_eq!(processor.state(), &before);
}

#[test]
fn test_switching_next_signal_starts_new_episode() {
    let mut processor = processor();
    processor.process_line(&line_south_of_gotri(30.0, 5)).unwrap();
    assert!(processor.state().arrival_alerted());

    // Nilamber Circle (id 9) is about 1.5 km south of Gotri
    let events = processor.process_line(&line_south_of_gotri(30.0, 9)).unwrap();
    assert_eq!(processor.state().tracked_signal(), Some("Nilamber Circle"));
    assert!(!processor.state().arrival_alerted());
    assert!(alerts(&events).is_empty());
}

#[test]
fn test_single_fire_approach_mode() {
    let config = AlertConfig {
        approach_alert_once: true,
        ..AlertConfig::default()
    };
    let mut processor = ProximityProcessor::new(WaypointRegistry::builtin(), config);

    let mut approaches = 0;
    for meters in [900.0, 700.0, 400.0, 200.0] {
        let events = processor.process_line(&line_south_of_gotri(meters, 5)).unwrap();
        approaches += events
            .iter()
            .filter(|e| matches!(e, AlertEvent::Approaching { .. }))
            .count();
    }
    assert_eq!(approaches, 1);
}
