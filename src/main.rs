//! # Dualpad Host
//!
//! Reads a DualShock 4 or DualSense over USB HID, applies profile remapping
//! and macros, drives the lightbar and writes the canonical gamepad state as
//! JSON Lines.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use dualpad_host::config::{Config, LoggingConfig};
use dualpad_host::controller::CanonicalGamepadState;
use dualpad_host::hid::{HidController, MAX_REPORT_SIZE};
use dualpad_host::listener::Listener;
use dualpad_host::state_log::StateLog;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Input reports buffered between the reader thread and the main task
const REPORT_CHANNEL_CAPACITY: usize = 256;

/// Number of input reports between status log messages
const LOG_INTERVAL_REPORTS: u64 = 10_000;

/// Daily log file prefix inside `[logging] log_dir`
const LOG_FILE_PREFIX: &str = "dualpad-host.log";

/// Main entry point for Dualpad Host
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults if the file is missing)
///    - Set up logging to stderr or a daily rolling file
///    - Open the controller's HID device and attach the listener, which
///      sets the lightbar to the default profile's colour
///
/// 2. **Main Loop**
///    - A reader thread forwards input reports over a channel
///    - Each report runs through the listener pipeline
///    - A fixed poll interval retries the lightbar if needed and pushes the
///      canonical state to the state log
///
/// 3. **Shutdown** on Ctrl+C or when the controller goes away
///    - Detach the listener
///    - Flush the state log and report how many states were written
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is invalid
/// - No supported controller can be opened
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, config_found) = load_config(&config_path)?;

    let _log_guard = init_logging(&config.logging);

    info!("Dualpad Host v{} starting...", env!("CARGO_PKG_VERSION"));
    if config_found {
        info!("Loaded configuration from {}", config_path);
    } else {
        warn!("{} not found, using default configuration", config_path);
    }

    let controller = HidController::open(&config.device.path)?;
    let device_info = controller.info();
    let descriptor = controller.descriptor().to_vec();
    let (mut reader, mut transport) = controller.into_split();
    let mut state_log = StateLog::open(&config.output.state_log)?;

    let mut listener = Listener::new(&config);
    if !listener.attach(device_info, &descriptor, &mut transport) {
        debug!("Lightbar not set at attach");
    }

    let (report_tx, mut report_rx) = mpsc::channel::<Bytes>(REPORT_CHANNEL_CAPACITY);
    std::thread::Builder::new()
        .name("hid-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; MAX_REPORT_SIZE];
            loop {
                match reader.read_report(&mut buf) {
                    Ok(0) => continue,
                    Ok(n) => {
                        if report_tx.blocking_send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Read from {} failed: {}", reader.path(), e);
                        break;
                    }
                }
            }
        })
        .context("Failed to start the report reader")?;

    let mut poll = interval(Duration::from_millis(config.device.poll_interval_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Running at {} ms poll interval", config.device.poll_interval_ms);
    info!("Press Ctrl+C to exit");

    let mut state = CanonicalGamepadState::default();
    let mut report_count: u64 = 0;
    let mut propagated_count: u64 = 0;

    loop {
        tokio::select! {
            report = report_rx.recv() => {
                let Some(report) = report else {
                    warn!("Controller disconnected");
                    break;
                };

                report_count += 1;
                if listener.on_report(&report, Instant::now()) {
                    propagated_count += 1;
                }

                if report_count % LOG_INTERVAL_REPORTS == 0 {
                    info!(
                        "Processed {} reports ({} propagated), profile {:?}",
                        report_count, propagated_count, listener.profile()
                    );
                }
            }

            _ = poll.tick() => {
                listener.poll(Instant::now(), &mut transport, &mut state);
                if let Err(e) = state_log.record(listener.profile(), &state) {
                    warn!("Failed to write state log: {}", e);
                }
            }

            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    listener.detach();
    state_log.flush()?;
    info!(
        "Total reports processed: {}, states logged: {}",
        report_count,
        state_log.records()
    );

    Ok(())
}

/// Load the configuration, falling back to defaults when the file is
/// missing. Returns whether the file was found.
fn load_config(path: &str) -> Result<(Config, bool)> {
    if !Path::new(path).exists() {
        return Ok((Config::default(), false));
    }
    let config = Config::load(path).with_context(|| format!("Invalid configuration in {}", path))?;
    Ok((config, true))
}

/// Initialize tracing. `RUST_LOG` overrides the configured level.
///
/// The returned guard must live until exit so buffered file logs are
/// flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.log_dir.is_empty() {
        // stdout is reserved for the state log
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Some(guard)
}
