mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

use commands::run::RunOptions;

const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

#[derive(Parser, Debug)]
#[command(
    name = "rapidroute",
    version,
    about = "Proximity and arrival alerts for vehicles approaching traffic signals"
)]
struct Cli {
    /// TOML config file (default: $RAPIDROUTE_CONFIG, then ./rapidroute.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Consume report lines from a NATS subject
    Run {
        /// NATS server URL (default: $NATS_URL or nats://localhost:4222)
        #[arg(long)]
        nats_url: Option<String>,

        /// Subject carrying report lines
        #[arg(long, default_value = "rapidroute.location")]
        subject: String,

        /// Publish alert events as JSON under <PREFIX>.<kind>
        #[arg(long)]
        publish_prefix: Option<String>,

        /// Serve Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,

        /// Also print telemetry lines to the console
        #[arg(long, default_value_t = false)]
        telemetry: bool,
    },
    /// Poll an HTTP endpoint that returns the current report line
    Poll {
        /// Endpoint URL, e.g. http://192.168.1.10:5000/location
        #[arg(long)]
        url: String,

        /// Milliseconds between requests
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Serve Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,

        /// Also print telemetry lines to the console
        #[arg(long, default_value_t = false)]
        telemetry: bool,
    },
    /// Replay report lines from a file (or stdin) and print the events
    Replay {
        /// File with one report per line; `-` or omitted reads stdin
        path: Option<PathBuf>,

        /// Print only arrival and approach alerts
        #[arg(long, default_value_t = false)]
        alerts_only: bool,
    },
    /// List the known signals and their ids
    Signals,
    /// Show distance, bearing and approach side between two points
    Bearing {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    rapidroute::log_format::init_logging(!cli.no_color)?;

    match cli.command {
        Commands::Run {
            nats_url,
            subject,
            publish_prefix,
            metrics_port,
            telemetry,
        } => {
            let nats_url = nats_url
                .or_else(|| env::var("NATS_URL").ok())
                .unwrap_or_else(|| DEFAULT_NATS_URL.to_string());
            commands::handle_run(
                cli.config,
                RunOptions {
                    nats_url,
                    subject,
                    publish_prefix,
                    metrics_port,
                    show_telemetry: telemetry,
                },
            )
            .await
        }
        Commands::Poll {
            url,
            interval_ms,
            metrics_port,
            telemetry,
        } => commands::handle_poll(cli.config, url, interval_ms, metrics_port, telemetry).await,
        Commands::Replay { path, alerts_only } => {
            commands::handle_replay(cli.config, path, alerts_only).await?;
            Ok(())
        }
        Commands::Signals => commands::handle_signals(cli.config),
        Commands::Bearing {
            lat1,
            lon1,
            lat2,
            lon2,
        } => commands::handle_bearing(lat1, lon1, lat2, lon2),
    }
}
