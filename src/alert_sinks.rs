//! Destinations for alert events
//!
//! Sinks are called synchronously on the processing path, so anything slow
//! (network publishing) is pushed onto a spawned task.

use anyhow::Result;
use async_nats::Client;
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::proximity::AlertEvent;

pub trait AlertSink: Send + Sync {
    fn handle(&self, event: &AlertEvent);
}

/// Prints operator-facing lines to stdout
pub struct ConsoleAlertSink {
    show_telemetry: bool,
    timestamps: bool,
}

impl ConsoleAlertSink {
    pub fn new(show_telemetry: bool) -> Self {
        Self {
            show_telemetry,
            timestamps: true,
        }
    }

    /// Omit the wall-clock prefix, for events that were not received live
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    fn format_line(&self, event: &AlertEvent) -> Option<String> {
        if !event.is_alert() && !self.show_telemetry {
            return None;
        }
        let marker = match event {
            AlertEvent::Telemetry { .. } => " ",
            AlertEvent::Approaching { .. } => ">",
            AlertEvent::Arrived { .. } => "*",
        };
        if self.timestamps {
            Some(format!(
                "[{}] {} {}",
                Local::now().format("%H:%M:%S"),
                marker,
                event
            ))
        } else {
            Some(format!("{} {}", marker, event))
        }
    }
}

impl AlertSink for ConsoleAlertSink {
    fn handle(&self, event: &AlertEvent) {
        if let Some(line) = self.format_line(event) {
            println!("{}", line);
        }
    }
}

/// Writes events to the tracing log
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn handle(&self, event: &AlertEvent) {
        if event.is_alert() {
            info!("{}", event);
        } else {
            debug!("{}", event);
        }
    }
}

/// Publish an event as JSON to `<prefix>.<kind>`
async fn publish_to_nats(nats_client: &Client, prefix: &str, event: &AlertEvent) -> Result<()> {
    let subject = format!("{}.{}", prefix, event.kind());
    let payload = serde_json::to_vec(event)?;

    nats_client.publish(subject.clone(), payload.into()).await?;
    debug!("Published {} event to {}", event.kind(), subject);

    Ok(())
}

/// NATS publisher for alert events
#[derive(Clone)]
pub struct NatsAlertPublisher {
    nats_client: Arc<Client>,
    subject_prefix: String,
}

impl NatsAlertPublisher {
    pub async fn new(nats_url: &str, subject_prefix: &str) -> Result<Self> {
        info!("Connecting alert publisher to NATS server at {}", nats_url);
        let nats_client = async_nats::ConnectOptions::new()
            .name("rapidroute-alerts")
            .connect(nats_url)
            .await?;

        Ok(Self::from_client(nats_client, subject_prefix))
    }

    pub fn from_client(nats_client: Client, subject_prefix: &str) -> Self {
        Self {
            nats_client: Arc::new(nats_client),
            subject_prefix: subject_prefix.trim_end_matches('.').to_string(),
        }
    }
}

impl AlertSink for NatsAlertPublisher {
    fn handle(&self, event: &AlertEvent) {
        let nats_client = Arc::clone(&self.nats_client);
        let prefix = self.subject_prefix.clone();
        let event = event.clone();

        tokio::spawn(async move {
            if let Err(e) = publish_to_nats(&nats_client, &prefix, &event).await {
                error!("Failed to publish {} event: {}", event.kind(), e);
                metrics::counter!("alerts.publish_error_total").increment(1);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrived() -> AlertEvent {
        AlertEvent::Arrived {
            signal: "Gotri Circle".to_string(),
        }
    }

    fn telemetry() -> AlertEvent {
        AlertEvent::Telemetry {
            start: "Chakli Circle".to_string(),
            destination: "Gotri Circle".to_string(),
            next: "Gotri Circle".to_string(),
            distance_meters: 312.4,
        }
    }

    #[test]
    fn test_console_line_without_timestamps() {
        let sink = ConsoleAlertSink::new(true).without_timestamps();
        assert_eq!(
            sink.format_line(&arrived()).as_deref(),
            Some("* Arrived at Gotri Circle")
        );
        assert_eq!(
            sink.format_line(&telemetry()).as_deref(),
            Some("  Chakli Circle -> Gotri Circle | next: Gotri Circle | 312 m")
        );
    }

    #[test]
    fn test_console_line_with_timestamps() {
        let sink = ConsoleAlertSink::new(false);
        let line = sink.format_line(&arrived()).unwrap();
        // "[HH:MM:SS] * Arrived at Gotri Circle"
        assert!(line.starts_with('['));
        assert_eq!(&line[9..], "] * Arrived at Gotri Circle");
    }

    #[test]
    fn test_console_hides_telemetry_unless_enabled() {
        let sink = ConsoleAlertSink::new(false).without_timestamps();
        assert_eq!(sink.format_line(&telemetry()), None);
    }
}
