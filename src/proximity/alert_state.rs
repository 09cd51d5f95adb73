/// Running alert state for the signal currently being approached
///
/// Exactly one of these exists per processor. An episode starts whenever the
/// tracked signal name changes, and everything else is reset with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    tracked_signal: Option<String>,
    /// `f64::INFINITY` until the first distance of the episode is measured
    last_distance_meters: f64,
    arrival_alerted: bool,
    /// Only consulted when single-fire approach alerts are enabled
    approach_alerted: bool,
}

impl Default for AlertState {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertState {
    pub fn new() -> Self {
        Self {
            tracked_signal: None,
            last_distance_meters: f64::INFINITY,
            arrival_alerted: false,
            approach_alerted: false,
        }
    }

    pub fn tracked_signal(&self) -> Option<&str> {
        self.tracked_signal.as_deref()
    }

    /// Distance recorded at the end of the previous report, or infinity
    pub fn last_distance_meters(&self) -> f64 {
        self.last_distance_meters
    }

    pub fn has_distance(&self) -> bool {
        self.last_distance_meters.is_finite()
    }

    pub fn arrival_alerted(&self) -> bool {
        self.arrival_alerted
    }

    pub fn approach_alerted(&self) -> bool {
        self.approach_alerted
    }

    /// Start a new episode if `signal` differs from the tracked one.
    /// Returns true when a reset happened.
    pub(crate) fn track(&mut self, signal: &str) -> bool {
        if self.tracked_signal.as_deref() == Some(signal) {
            return false;
        }

        self.tracked_signal = Some(signal.to_string());
        self.last_distance_meters = f64::INFINITY;
        self.arrival_alerted = false;
        self.approach_alerted = false;
        true
    }

    pub(crate) fn mark_arrived(&mut self) {
        self.arrival_alerted = true;
    }

    pub(crate) fn mark_approach_alerted(&mut self) {
        self.approach_alerted = true;
    }

    pub(crate) fn record_distance(&mut self, distance_meters: f64) {
        self.last_distance_meters = distance_meters;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_no_target() {
        let state = AlertState::new();
        assert_eq!(state.tracked_signal(), None);
        assert!(state.last_distance_meters().is_infinite());
        assert!(!state.has_distance());
        assert!(!state.arrival_alerted());
        assert!(!state.approach_alerted());
    }

    #[test]
    fn test_track_same_signal_keeps_state() {
        let mut state = AlertState::new();
        assert!(state.track("Gotri Circle"));
        state.record_distance(120.0);
        state.mark_arrived();

        assert!(!state.track("Gotri Circle"));
        assert_eq!(state.last_distance_meters(), 120.0);
        assert!(state.arrival_alerted());
    }

    #[test]
    fn test_track_new_signal_resets_everything() {
        let mut state = AlertState::new();
        state.track("Gotri Circle");
        state.record_distance(30.0);
        state.mark_arrived();
        state.mark_approach_alerted();

        assert!(state.track("Chakli Circle"));
        assert_eq!(state.tracked_signal(), Some("Chakli Circle"));
        assert!(!state.has_distance());
        assert!(!state.arrival_alerted());
        assert!(!state.approach_alerted());

        // Returning to the earlier signal is a fresh episode too
        state.mark_arrived();
        assert!(state.track("Gotri Circle"));
        assert!(!state.arrival_alerted());
    }
}
