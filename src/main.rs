//! # CRSF Receiver
//!
//! Reads an ExpressLRS receiver wired to a UART, prints decoded channel and
//! link state as JSON lines, and optionally sends battery telemetry back.
//!
//! ```bash
//! crsf-receiver [config.toml]
//! ```
//!
//! Logs go to stderr (and to `logging.dir` when configured); snapshots go to
//! stdout.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crsf_receiver::config::{Config, LoggingConfig};
use crsf_receiver::serial::{open_with_paths, ReceiverLink, TokioSerialPort};
use crsf_receiver::telemetry::Snapshot;

/// Log file name prefix inside `logging.dir`
const LOG_FILE_PREFIX: &str = "crsf-receiver.log";

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard must live
/// until exit so buffered file output is flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path)),
        None => Ok(Config::default()),
    }
}

/// Main entry point
///
/// # Control Flow
///
/// 1. Load configuration and set up logging
/// 2. Every `poll_interval_ms`: (re)open the port if needed, then drain and
///    decode whatever bytes have arrived
/// 3. Every `report_interval_ms`: print a JSON snapshot of decoded state
/// 4. Every `battery.interval_ms` (if enabled): send battery telemetry
/// 5. Ctrl+C closes the port and exits
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = init_logging(&config.logging);

    info!("CRSF Receiver v{} starting...", env!("CARGO_PKG_VERSION"));

    let ports = config.serial.candidate_ports();
    let battery = config.battery.sensor();

    let mut link: ReceiverLink<TokioSerialPort> = ReceiverLink::new();
    let mut next_connect = Instant::now();

    let mut poll_interval = interval(Duration::from_millis(config.receiver.poll_interval_ms));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut report_interval = interval(Duration::from_millis(config.receiver.report_interval_ms));
    report_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut battery_interval = interval(Duration::from_millis(config.battery.interval_ms));
    battery_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Polling every {}ms, press Ctrl+C to exit", config.receiver.poll_interval_ms);

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                if !link.is_connected() {
                    if Instant::now() < next_connect {
                        continue;
                    }

                    match open_with_paths(&ports[..], config.serial.baud_rate, config.serial.timeout()) {
                        Ok(port) => {
                            info!("Receiver connected at {}", port.path());
                            link.connect(port);
                        }
                        Err(e) => {
                            warn!("{}; retrying in {}ms", e, config.serial.reconnect_interval_ms);
                            next_connect = Instant::now() + config.serial.reconnect_interval();
                            continue;
                        }
                    }
                }

                if let Err(e) = link.update().await {
                    warn!("Connection lost: {}", e);
                    next_connect = Instant::now() + config.serial.reconnect_interval();
                }
            }

            _ = report_interval.tick() => {
                match Snapshot::capture(link.receiver()).to_json_line() {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to serialize snapshot: {}", e),
                }
            }

            _ = battery_interval.tick(), if config.battery.enabled && link.is_connected() => {
                if let Err(e) = link.send_battery_telemetry(&battery).await {
                    warn!("Failed to send battery telemetry: {}", e);
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Receiver stats: {:?}", link.stats());
                break;
            }
        }
    }

    link.close();
    Ok(())
}
