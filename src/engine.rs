use anyhow::Result;
use std::fmt;
use tracing::{Instrument, debug, error, info, info_span};

use crate::alert_sinks::AlertSink;
use crate::proximity::{AlertEvent, ProximityProcessor, ReportError};
use crate::report_sources::ReportSource;

/// Lines buffered between the source and the processing loop
pub const REPORT_QUEUE_SIZE: usize = 256;

/// Counters kept for the lifetime of one engine
///
/// Sources forward undecodable input instead of discarding it, so every line a
/// source yields is counted here, including ones dropped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub reports_received: u64,
    pub reports_accepted: u64,
    pub dropped_malformed: u64,
    pub dropped_unknown_waypoint: u64,
    pub arrivals: u64,
    pub approach_alerts: u64,
}

impl EngineStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_malformed + self.dropped_unknown_waypoint
    }

    fn record_events(&mut self, events: &[AlertEvent]) {
        self.reports_accepted += 1;
        for event in events {
            match event {
                AlertEvent::Telemetry { .. } => {}
                AlertEvent::Arrived { .. } => self.arrivals += 1,
                AlertEvent::Approaching { .. } => self.approach_alerts += 1,
            }
        }
    }

    fn record_drop(&mut self, error: &ReportError) {
        match error {
            ReportError::Malformed(_) => self.dropped_malformed += 1,
            ReportError::UnknownWaypoint { .. } => self.dropped_unknown_waypoint += 1,
        }
    }
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports ({} accepted, {} malformed, {} unknown signal), {} arrivals, {} approach alerts",
            self.reports_received,
            self.reports_accepted,
            self.dropped_malformed,
            self.dropped_unknown_waypoint,
            self.arrivals,
            self.approach_alerts
        )
    }
}

/// Drives a [`ProximityProcessor`] from a report source and fans events out to sinks
///
/// Sinks see every event of a report in emission order before the next report is
/// processed.
pub struct AlertEngine {
    processor: ProximityProcessor,
    sinks: Vec<Box<dyn AlertSink>>,
    stats: EngineStats,
}

impl AlertEngine {
    pub fn new(processor: ProximityProcessor) -> Self {
        Self {
            processor,
            sinks: Vec::new(),
            stats: EngineStats::default(),
        }
    }

    pub fn with_sink<K: AlertSink + 'static>(mut self, sink: K) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn processor(&self) -> &ProximityProcessor {
        &self.processor
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Process a single raw line and dispatch its events.
    /// Returns the number of events emitted; dropped reports emit none.
    pub fn handle_line(&mut self, line: &str) -> usize {
        self.stats.reports_received += 1;
        metrics::counter!("reports.received_total").increment(1);

        let events = match self.processor.process_line(line) {
            Ok(events) => events,
            Err(e) => {
                debug!("Dropped report {:?}: {}", line, e);
                self.stats.record_drop(&e);
                metrics::counter!("reports.dropped_total", "reason" => e.reason()).increment(1);
                return 0;
            }
        };

        self.stats.record_events(&events);
        metrics::gauge!("alerts.tracked_distance_meters")
            .set(self.processor.state().last_distance_meters());

        for event in &events {
            metrics::counter!("alerts.emitted_total", "kind" => event.kind()).increment(1);
            for sink in &self.sinks {
                sink.handle(event);
            }
        }

        events.len()
    }

    /// Consume `source` until it ends or Ctrl+C is received
    ///
    /// The source is read on its own task and handed over through a bounded queue,
    /// so a slow sink applies backpressure to the source instead of growing memory.
    pub async fn run<S>(&mut self, source: S) -> Result<EngineStats>
    where
        S: ReportSource + 'static,
    {
        let description = source.describe();
        let (report_tx, report_rx) = flume::bounded::<String>(REPORT_QUEUE_SIZE);

        let feeder = tokio::spawn(
            feed_reports(source, report_tx).instrument(info_span!("report_feeder")),
        );

        info!("Processing reports from {}", description);

        let span = info_span!("alert_engine", source = %description);
        async {
            let shutdown = tokio::signal::ctrl_c();
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    received = report_rx.recv_async() => match received {
                        Ok(line) => {
                            metrics::gauge!("reports.queue_depth").set(report_rx.len() as f64);
                            self.handle_line(&line);
                        }
                        Err(_) => {
                            info!("Report source {} finished", description);
                            break;
                        }
                    },
                    _ = &mut shutdown => {
                        info!("Received shutdown signal (Ctrl+C), stopping");
                        break;
                    }
                }
            }
        }
        .instrument(span)
        .await;

        info!("Alert engine stopped: {}", self.stats);

        feeder.abort();
        if let Ok(Err(e)) = feeder.await {
            return Err(e.context(format!("Report source {} failed", description)));
        }

        Ok(self.stats.clone())
    }
}

async fn feed_reports<S: ReportSource>(mut source: S, report_tx: flume::Sender<String>) -> Result<()> {
    loop {
        match source.next_report().await {
            Ok(Some(line)) => {
                if report_tx.send_async(line).await.is_err() {
                    debug!("Report queue closed, stopping feeder");
                    return Ok(());
                }
            }
            Ok(None) => return Ok(()),
            Err(e) => {
                error!("Failed to read from {}: {}", source.describe(), e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertConfig;
    use crate::report_sources::ReplayReportSource;
    use crate::signals::WaypointRegistry;
    use std::sync::{Arc, Mutex};
    use tokio::io::BufReader;

    #[derive(Clone, Default)]
    struct CollectingSink {
        events: Arc<Mutex<Vec<AlertEvent>>>,
    }

    impl AlertSink for CollectingSink {
        fn handle(&self, event: &AlertEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn engine_with_sink() -> (AlertEngine, CollectingSink) {
        let processor = ProximityProcessor::new(WaypointRegistry::builtin(), AlertConfig::default());
        let sink = CollectingSink::default();
        (AlertEngine::new(processor).with_sink(sink.clone()), sink)
    }

    #[test]
    fn test_handle_line_counts_drops() {
        let (mut engine, sink) = engine_with_sink();

        assert_eq!(engine.handle_line("not,a,report"), 0);
        assert_eq!(engine.handle_line("22.3,73.1,22.3,73.1,1,5,999"), 0);

        let stats = engine.stats();
        assert_eq!(stats.reports_received, 2);
        assert_eq!(stats.dropped_malformed, 1);
        assert_eq!(stats.dropped_unknown_waypoint, 1);
        assert_eq!(stats.dropped(), 2);
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_line_dispatches_in_order() {
        let (mut engine, sink) = engine_with_sink();

        // Standing on Gotri Circle itself
        let emitted = engine.handle_line("22.315556,73.138000,22.315556,73.138000,1,5,5");
        assert_eq!(emitted, 2);

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0].kind(), "telemetry");
        assert_eq!(events[1].kind(), "arrived");
        assert_eq!(engine.stats().arrivals, 1);
        assert_eq!(engine.stats().reports_accepted, 1);
    }

    #[tokio::test]
    async fn test_run_drains_source_and_returns_stats() {
        let (mut engine, sink) = engine_with_sink();

        let data: &[u8] = b"# route\n\
            garbage\n\
            22.315556,73.138000,22.315556,73.138000,1,5,5\n\
            22.315556,73.138000,22.315556,73.138000,1,5,5\n";
        let source = ReplayReportSource::new(BufReader::new(data), "memory".to_string());

        let stats = engine.run(source).await.unwrap();

        assert_eq!(stats.reports_received, 3);
        assert_eq!(stats.dropped_malformed, 1);
        assert_eq!(stats.arrivals, 1);
        // Two telemetry events plus one arrival
        assert_eq!(sink.events.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_run_counts_undecodable_line_as_malformed() {
        let (mut engine, sink) = engine_with_sink();

        let data: &[u8] = b"22.315556,73.138000,22.315556,73.138000,1,5,5\n\
            22.315556,73.13\xff\xfe,22.315556,73.138000,1,5,5\n\
            22.315556,73.138000,22.315556,73.138000,1,5,5\n";
        let source = ReplayReportSource::new(BufReader::new(data), "memory".to_string());

        let stats = engine.run(source).await.unwrap();

        assert_eq!(stats.reports_received, 3);
        assert_eq!(stats.reports_accepted, 2);
        assert_eq!(stats.dropped_malformed, 1);
        assert_eq!(sink.events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_stats_display() {
        let stats = EngineStats {
            reports_received: 4,
            reports_accepted: 3,
            dropped_malformed: 1,
            dropped_unknown_waypoint: 0,
            arrivals: 1,
            approach_alerts: 2,
        };
        assert_eq!(
            stats.to_string(),
            "4 reports (3 accepted, 1 malformed, 0 unknown signal), 1 arrivals, 2 approach alerts"
        );
    }
}
