//! domectl: bench entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                     │
//! │  SerialTransport  JsonFileConfig  LogEventSink  Clock     │
//! │  BenchHardware (Motor + Limit + PaddleInput + Safety)     │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          ControlService (pure logic)               │  │
//! │  │  Dome queue · Paddles · Virtual paddles · Link     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The bench binary is passive.  Nothing feeds [`REQUESTS`] and the safety
//! flag is fixed at "permitted", so the dome stays in manual mode: the
//! loop relays controller status, runs the physical and virtual paddles
//! and logs telemetry.  Hosts that need gotos, shutter control or
//! tracking embed [`ControlService`] and push
//! [`DomeRequest`](domectl::app::commands::DomeRequest)s into their own
//! channel.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use domectl::adapters::bench::{BenchHardware, NoSwitches};
use domectl::adapters::config_file::JsonFileConfig;
use domectl::adapters::log_sink::LogEventSink;
use domectl::adapters::safety_flag::SafetyFlag;
use domectl::adapters::serial::SerialTransport;
use domectl::adapters::time::MonotonicClock;
use domectl::app::commands::RequestChannel;
use domectl::app::events::AppEvent;
use domectl::app::ports::{ConfigPort, EventSink};
use domectl::app::service::ControlService;
use domectl::config::DomeConfig;
use domectl::protocol::link::SerialLink;

const DEFAULT_CONFIG_PATH: &str = "domectl.json";

/// Remote hosts push work here; the control loop drains it every tick.
static REQUESTS: RequestChannel = RequestChannel::new();

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("domectl v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config ─────────────────────────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let store = JsonFileConfig::new(path);
    let config = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config load failed ({}), using defaults", e);
            DomeConfig::default()
        }
    };
    config
        .validate()
        .context("configuration rejected")?;

    // ── 3. Serial link ────────────────────────────────────────
    let link = match SerialTransport::open(&config.serial) {
        Ok(port) => SerialLink::new(port, config.serial.timeout_ms),
        Err(e) => {
            warn!(
                "cannot open {} ({}), running disconnected",
                config.serial.port, e
            );
            SerialLink::disconnected(config.serial.timeout_ms)
        }
    };

    // ── 4. Service ────────────────────────────────────────────
    let mut hw = BenchHardware::with_ports(NoSwitches, SafetyFlag::new(true));
    let mut log_sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    let interval = Duration::from_millis(config.control_loop_interval_ms);
    let telemetry_every = (config.telemetry_interval_secs * 1000)
        .div_ceil(config.control_loop_interval_ms)
        .max(1);

    let mut service = ControlService::new(config, link);
    service.start(&mut log_sink);

    info!("entering control loop ({} ms)", interval.as_millis());

    // ── 5. Control loop ───────────────────────────────────────
    let mut telemetry_counter: u64 = 0;
    loop {
        std::thread::sleep(interval);

        service.tick(clock.now_ms(), &REQUESTS, &mut hw, &mut log_sink);

        telemetry_counter += 1;
        if telemetry_counter >= telemetry_every {
            telemetry_counter = 0;
            log_sink.emit(&AppEvent::Telemetry(service.build_telemetry()));
        }
    }
}
