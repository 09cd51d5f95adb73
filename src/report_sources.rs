//! Sources of raw position report lines
//!
//! This module provides a trait-based abstraction over how report lines reach the
//! engine. This enables:
//! - Production: NATS subscription or polling a producer's `/location` endpoint
//! - Testing and diagnostics: replaying lines from a file or stdin
//!
//! Sources only deliver text; parsing and validation happen in the processor.
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Trait for sources of raw report lines
#[async_trait]
pub trait ReportSource: Send {
    /// Get the next report line from the source
    ///
    /// Returns:
    /// - `Ok(Some(line))` - Next line available
    /// - `Ok(None)` - End of stream (no more reports)
    /// - `Err(e)` - Unrecoverable error reading from the source
    async fn next_report(&mut self) -> Result<Option<String>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// NATS report source
///
/// Each message payload on the subject is one report line.
pub struct NatsReportSource {
    subscriber: async_nats::Subscriber,
    subject: String,
}

impl NatsReportSource {
    /// Create a NATS report source by connecting and subscribing
    ///
    /// # Arguments
    /// * `nats_url` - NATS server URL (e.g., "nats://localhost:4222")
    /// * `subject` - NATS subject carrying report lines (e.g., "rapidroute.location")
    /// * `client_name` - Client name for NATS connection
    pub async fn connect(nats_url: &str, subject: &str, client_name: &str) -> Result<Self> {
        let client = async_nats::ConnectOptions::new()
            .name(client_name)
            .connect(nats_url)
            .await
            .with_context(|| format!("Failed to connect to NATS at {}", nats_url))?;

        let subscriber = client
            .subscribe(subject.to_string())
            .await
            .with_context(|| format!("Failed to subscribe to {}", subject))?;

        Ok(Self {
            subscriber,
            subject: subject.to_string(),
        })
    }
}

#[async_trait]
impl ReportSource for NatsReportSource {
    async fn next_report(&mut self) -> Result<Option<String>> {
        // Undecodable payloads are forwarded lossily; the processor drops them as malformed
        Ok(self
            .subscriber
            .next()
            .await
            .map(|msg| String::from_utf8_lossy(&msg.payload).into_owned()))
    }

    fn describe(&self) -> String {
        format!("nats:{}", self.subject)
    }
}

/// Polls an HTTP endpoint that returns one report line per request
///
/// Failed requests and non-2xx responses (producers answer 500 while no route is
/// active) are logged and skipped; the next tick simply tries again.
pub struct HttpPollReportSource {
    client: reqwest::Client,
    url: String,
    interval: Interval,
}

impl HttpPollReportSource {
    pub fn new(url: &str, poll_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(poll_interval.max(Duration::from_secs(5)))
            .build()
            .context("Failed to build HTTP client")?;

        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            client,
            url: url.to_string(),
            interval,
        })
    }

    async fn fetch(&self) -> Result<String> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl ReportSource for HttpPollReportSource {
    async fn next_report(&mut self) -> Result<Option<String>> {
        loop {
            self.interval.tick().await;

            match self.fetch().await {
                Ok(body) => {
                    let line = body.trim();
                    if line.is_empty() {
                        debug!("Empty response from {}", self.url);
                        continue;
                    }
                    return Ok(Some(line.to_string()));
                }
                Err(e) => {
                    warn!("Polling {} failed: {}", self.url, e);
                    metrics::counter!("reports.poll_error_total").increment(1);
                }
            }
        }
    }

    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }
}

/// Replays report lines from a file or stdin
///
/// Blank lines and lines starting with `#` are skipped. Lines that are not valid
/// UTF-8 are decoded lossily and passed on rather than ending the replay.
///
/// ```text
/// # Chakli Circle -> Gotri Circle
/// 22.307470,73.138000,22.307000,73.138000,1,5,5
/// 22.309260,73.138000,22.307470,73.138000,1,5,5
/// ```
pub struct ReplayReportSource<R> {
    reader: R,
    name: String,
    line_buffer: Vec<u8>,
    lines_read: usize,
}

impl ReplayReportSource<BufReader<File>> {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .await
            .with_context(|| format!("Failed to open {:?}", path.as_ref()))?;

        debug!("Opened replay source from: {:?}", path.as_ref());

        Ok(Self::new(
            BufReader::new(file),
            path.as_ref().display().to_string(),
        ))
    }
}

impl ReplayReportSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin".to_string())
    }
}

impl<R> ReplayReportSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, name: String) -> Self {
        Self {
            reader,
            name,
            line_buffer: Vec::new(),
            lines_read: 0,
        }
    }

    /// Number of raw lines consumed so far, including skipped ones
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

#[async_trait]
impl<R> ReportSource for ReplayReportSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_report(&mut self) -> Result<Option<String>> {
        loop {
            self.line_buffer.clear();
            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.line_buffer)
                .await?;

            if bytes_read == 0 {
                debug!(
                    "Reached end of {} after {} lines",
                    self.name, self.lines_read
                );
                return Ok(None);
            }

            self.lines_read += 1;

            let text = String::from_utf8_lossy(&self.line_buffer);
            if let Cow::Owned(_) = text {
                debug!(
                    "Line {} of {} is not valid UTF-8",
                    self.lines_read, self.name
                );
            }

            let line = text.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Ok(Some(line.to_string()));
        }
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.name)
    }
}
