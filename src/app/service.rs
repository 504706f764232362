//! Control service: the hexagonal core.
//!
//! [`ControlService`] owns the dome state machine, both paddle state
//! machines, the outbound buffer and the serial link.  All other I/O flows
//! through port traits injected at call sites, so the whole service runs
//! against mock adapters in tests.
//!
//! ```text
//!  RequestChannel ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  SerialLink ◀─────▶ │        ControlService         │
//!  PaddleInputPort ─▶ │  Dome · Paddles · Virtual    │ ──▶ MotorPort
//!  SafetyPort ──────▶ └──────────────────────────────┘
//! ```
//!
//! One tick, in order:
//!
//! 1. drain remote requests
//! 2. read inbound frames and dispatch them
//! 3. dome tracking
//! 4. dome step
//! 5. physical paddles
//! 6. virtual paddles
//! 7. flush the outbound frame

use log::{info, warn};

use crate::config::DomeConfig;
use crate::dome::geometry::{TelescopePosition, corrected_azimuth};
use crate::dome::state::DomeSnapshot;
use crate::dome::{Dome, angular_distance};
use crate::error::AdmissionError;
use crate::paddle::Transitions;
use crate::paddle::physical::Paddles;
use crate::paddle::virtual_paddle::VirtualPaddles;
use crate::protocol::dispatch::dispatch_frame;
use crate::protocol::link::SerialLink;
use crate::protocol::outbound::{OutboundBuffer, OutboundCommand};
use crate::protocol::transport::Transport;

use super::commands::{DomeRequest, RequestChannel};
use super::events::{AppEvent, PaddleSource, TelemetryData};
use super::ports::{EventSink, LimitPort, MotorPort, PaddleInputPort, SafetyPort};

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

pub struct ControlService<T: Transport> {
    config: DomeConfig,
    dome: Dome,
    paddles: Paddles,
    virtual_paddles: VirtualPaddles,
    link: SerialLink<T>,
    outbound: OutboundBuffer,
    /// Latest telescope position from the host.
    position: Option<TelescopePosition>,
    last_tracking_ms: Option<u64>,
    tick_count: u64,
}

impl<T: Transport> ControlService<T> {
    pub fn new(config: DomeConfig, link: SerialLink<T>) -> Self {
        Self {
            dome: Dome::new(&config),
            paddles: Paddles::new(config.site, config.rates),
            virtual_paddles: VirtualPaddles::new(config.rates, config.virtual_button_timeout_ms),
            link,
            outbound: OutboundBuffer::new(),
            position: None,
            last_tracking_ms: None,
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let state = self.dome.state();
        let event = AppEvent::Started {
            auto: state.auto,
            tracking: state.tracking,
            connected: self.link.is_connected(),
        };
        info!(
            "ControlService started (auto={}, tracking={}, connected={})",
            state.auto,
            state.tracking,
            self.link.is_connected()
        );
        sink.emit(&event);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at `now_ms`.
    ///
    /// `hw` provides every hardware-facing port the tick needs; passing it
    /// as one value avoids overlapping mutable borrows.
    pub fn tick(
        &mut self,
        now_ms: u64,
        requests: &RequestChannel,
        hw: &mut (impl MotorPort + LimitPort + PaddleInputPort + SafetyPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Remote requests
        while let Ok(req) = requests.try_receive() {
            // Rejections are already reported through the sink.
            let _ = self.handle_request(req, &*hw, sink);
        }

        // 2. Inbound frames
        for polled in self.link.poll_inbound(now_ms) {
            match polled {
                Ok(commands) => {
                    let rejected = dispatch_frame(&commands, self.dome.state_mut());
                    if rejected > 0 {
                        sink.emit(&AppEvent::CommandsRejected(rejected));
                    }
                }
                Err(e) => {
                    warn!("inbound frame dropped: {}", e);
                    sink.emit(&AppEvent::FrameDropped(e));
                }
            }
        }

        // 3. Tracking
        self.track(now_ms, &*hw, sink);

        // 4. Dome step
        for event in self.dome.step(now_ms, &mut self.outbound) {
            sink.emit(&AppEvent::Dome(event));
        }

        // 5. Physical paddles
        let inputs = hw.read();
        let transitions = self.paddles.check(inputs, hw);
        emit_paddle(sink, PaddleSource::Physical, transitions);

        // 6. Virtual paddles
        let state = self.dome.state_mut();
        let speed = state.slew_speed;
        let transitions = self
            .virtual_paddles
            .check(&mut state.buttons, speed, now_ms, hw);
        emit_paddle(sink, PaddleSource::Virtual, transitions);

        // 7. Outbound frame
        let commands = self.outbound.drain();
        if let Err(e) = self.link.send(&commands) {
            sink.emit(&AppEvent::FrameDropped(e));
        }
    }

    // ── Request handling ──────────────────────────────────────

    /// Apply one remote request.  Rejections are logged and emitted.
    pub fn handle_request(
        &mut self,
        req: DomeRequest,
        safety: &impl SafetyPort,
        sink: &mut impl EventSink,
    ) -> Result<(), AdmissionError> {
        let result = match req {
            DomeRequest::MoveTo { azimuth, force } => self.dome.move_to(azimuth, force, safety),
            DomeRequest::Open { force } => self.dome.open(force, safety),
            DomeRequest::Close { force } => self.dome.close(force, safety),
            DomeRequest::SetAuto(on) => {
                self.dome.set_auto(on);
                self.outbound.push(OutboundCommand::DomeAuto(on));
                Ok(())
            }
            DomeRequest::SetTracking(on) => {
                self.dome.set_tracking(on);
                info!("dome tracking {}", if on { "enabled" } else { "disabled" });
                Ok(())
            }
            DomeRequest::UpdatePosition(pos) => {
                self.position = Some(pos);
                self.outbound.publish_position(&pos);
                Ok(())
            }
            DomeRequest::Send(cmd) => {
                self.outbound.push(cmd);
                Ok(())
            }
        };
        if let Err(error) = result {
            sink.emit(&AppEvent::RequestRejected {
                request: req.name(),
                error,
            });
        }
        result
    }

    // ── Tracking ──────────────────────────────────────────────

    fn track(&mut self, now_ms: u64, safety: &impl SafetyPort, sink: &mut impl EventSink) {
        let state = self.dome.state();
        if !(state.tracking && state.auto) || !self.dome.is_idle() {
            return;
        }
        let Some(pos) = self.position else {
            return;
        };
        let due = self
            .last_tracking_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.config.tracking_interval_ms);
        if !due {
            return;
        }
        self.last_tracking_ms = Some(now_ms);

        let target = match corrected_azimuth(&pos, &self.config.geometry) {
            Ok(az) => az.rem_euclid(360.0),
            Err(e) => {
                warn!("tracking skipped: {}", e);
                sink.emit(&AppEvent::TrackingSkipped(e));
                return;
            }
        };
        let from = state.azimuth;
        let needed = from.is_none_or(|cur| {
            angular_distance(cur, target) >= self.config.arrival_tolerance_deg
        });
        if !needed {
            return;
        }
        match self.dome.move_to(target, false, safety) {
            Ok(()) => sink.emit(&AppEvent::TrackingMove { from, to: target }),
            Err(error) => sink.emit(&AppEvent::RequestRejected {
                request: "track",
                error,
            }),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> DomeSnapshot {
        self.dome.snapshot()
    }

    pub fn build_telemetry(&self) -> TelemetryData {
        let (frames_rx, frames_tx, link_errors) = self.link.counters();
        TelemetryData {
            tick: self.tick_count,
            connected: self.link.is_connected(),
            frames_rx,
            frames_tx,
            link_errors,
            dome: self.dome.snapshot(),
        }
    }

    pub fn dome(&self) -> &Dome {
        &self.dome
    }

    pub fn paddles(&self) -> &Paddles {
        &self.paddles
    }

    pub fn virtual_paddles(&self) -> &VirtualPaddles {
        &self.virtual_paddles
    }

    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }

    pub fn config(&self) -> &DomeConfig {
        &self.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn emit_paddle(sink: &mut impl EventSink, source: PaddleSource, transitions: Transitions) {
    for transition in transitions {
        sink.emit(&AppEvent::Paddle { source, transition });
    }
}
