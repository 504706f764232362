//! Dome command queue and state machine.
//!
//! ```text
//!            move_to / open / close (admission checks)
//!                          │
//!                          ▼
//!   ┌──────┐  pop (auto) ┌──────────────┐  arrived / unknown az / timeout
//!   │ Idle │────────────▶│ Executing(c) │──────────────────────────────┐
//!   └──────┘             └──────────────┘                              │
//!      ▲                        │ shutter / query: next step           │
//!      └────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! At most one command is in flight.  The rest wait in a bounded FIFO.
//! [`Dome::step`] is called once per control tick and never blocks.

pub mod geometry;
pub mod state;

use heapless::Deque;
use log::{info, warn};
use serde::Serialize;

use crate::app::ports::{DomeDrivePort, DriveDirection, SafetyPort, ShutterAction};
use crate::config::DomeConfig;
use crate::error::AdmissionError;

use state::{DomeSnapshot, DomeState};

/// Queue capacity, including the in-flight command's successors.
pub const QUEUE_DEPTH: usize = 16;

/// One queued dome operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DomeCommand {
    GotoAzimuth(f64),
    OpenShutter,
    CloseShutter,
    QueryShutterStatus,
}

/// Why a goto ended without arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbandonReason {
    /// No azimuth reading was available.
    AzimuthUnknown,
    /// The move ran longer than `max_dome_move_ms`.
    TimedOut,
    /// Automatic mode was switched off mid-move.
    ManualMode,
}

/// State machine output for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DomeEvent {
    Started(DomeCommand),
    Completed(DomeCommand),
    Arrived { azimuth: f64 },
    Abandoned { target: f64, reason: AbandonReason },
}

/// Events from one step: at most a start and a finish.
pub type StepEvents = heapless::Vec<DomeEvent, 2>;

// ───────────────────────────────────────────────────────────────
// Helpers
// ───────────────────────────────────────────────────────────────

/// Shortest rotation from `current` to `target`.  `Right` increases azimuth.
pub fn rotation_for(current: f64, target: f64) -> DriveDirection {
    if target > current {
        if target - current < 180.0 {
            DriveDirection::Right
        } else {
            DriveDirection::Left
        }
    } else if current - target < 180.0 {
        DriveDirection::Left
    } else {
        DriveDirection::Right
    }
}

/// Smallest angle between two azimuths, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Raw encoder byte (256 counts per turn) to degrees.
pub fn encoder_to_azimuth(raw: u8, offset: i32) -> f64 {
    let counts = (i32::from(raw) + offset).rem_euclid(256);
    f64::from(counts) / 256.0 * 360.0
}

// ───────────────────────────────────────────────────────────────
// Dome
// ───────────────────────────────────────────────────────────────

pub struct Dome {
    state: DomeState,
    queue: Deque<DomeCommand, QUEUE_DEPTH>,
    current: Option<DomeCommand>,
    tolerance_deg: f64,
    max_move_ms: u64,
    open_action: ShutterAction,
}

impl Dome {
    pub fn new(config: &DomeConfig) -> Self {
        Self {
            state: DomeState::new(
                config.default_auto_dome,
                config.default_dome_tracking,
                config.encoder_offset,
            ),
            queue: Deque::new(),
            current: None,
            tolerance_deg: config.arrival_tolerance_deg,
            max_move_ms: config.max_dome_move_ms,
            open_action: if config.open_with_windshield {
                ShutterAction::OpenWithWindshield
            } else {
                ShutterAction::OpenWithoutWindshield
            },
        }
    }

    // ── Admission ─────────────────────────────────────────────

    /// Queue a goto.  `force` overrides the safety interlock only.
    pub fn move_to(
        &mut self,
        azimuth: f64,
        force: bool,
        safety: &impl SafetyPort,
    ) -> Result<(), AdmissionError> {
        self.admit(Some(azimuth), force, safety, 1)
            .inspect_err(|e| warn!("dome: move to {azimuth} rejected: {e}"))?;
        self.enqueue(DomeCommand::GotoAzimuth(azimuth))
    }

    /// Queue a shutter open followed by a status query.
    pub fn open(&mut self, force: bool, safety: &impl SafetyPort) -> Result<(), AdmissionError> {
        self.admit(None, force, safety, 2)
            .inspect_err(|e| warn!("dome: open rejected: {e}"))?;
        self.enqueue(DomeCommand::OpenShutter)?;
        self.enqueue(DomeCommand::QueryShutterStatus)
    }

    /// Queue a shutter close followed by a status query.
    pub fn close(&mut self, force: bool, safety: &impl SafetyPort) -> Result<(), AdmissionError> {
        self.admit(None, force, safety, 2)
            .inspect_err(|e| warn!("dome: close rejected: {e}"))?;
        self.enqueue(DomeCommand::CloseShutter)?;
        self.enqueue(DomeCommand::QueryShutterStatus)
    }

    fn admit(
        &self,
        azimuth: Option<f64>,
        force: bool,
        safety: &impl SafetyPort,
        slots: usize,
    ) -> Result<(), AdmissionError> {
        if !self.state.auto {
            return Err(AdmissionError::NotAutoMode);
        }
        if azimuth.is_some_and(|az| !(az.is_finite() && (0.0..360.0).contains(&az))) {
            return Err(AdmissionError::InvalidAzimuth);
        }
        if !(force || safety.motion_permitted()) {
            return Err(AdmissionError::SafetyInterlock);
        }
        if QUEUE_DEPTH - self.queue.len() < slots {
            return Err(AdmissionError::QueueFull);
        }
        Ok(())
    }

    fn enqueue(&mut self, cmd: DomeCommand) -> Result<(), AdmissionError> {
        self.queue
            .push_back(cmd)
            .map_err(|_| AdmissionError::QueueFull)
    }

    // ── Tick ──────────────────────────────────────────────────

    /// Advance the state machine once.
    pub fn step(&mut self, now_ms: u64, drive: &mut impl DomeDrivePort) -> StepEvents {
        let mut events = StepEvents::new();

        if !self.state.auto {
            if let Some(DomeCommand::GotoAzimuth(target)) = self.current {
                drive.drive(DriveDirection::Stop);
                self.current = None;
                warn!("dome: manual mode, abandoning goto {target:.0}");
                let _ = events.push(DomeEvent::Abandoned {
                    target,
                    reason: AbandonReason::ManualMode,
                });
            }
            return events;
        }

        let Some(cmd) = self.current else {
            if let Some(next) = self.queue.pop_front() {
                self.start(next, now_ms, drive, &mut events);
            }
            return events;
        };

        match cmd {
            DomeCommand::GotoAzimuth(target) => {
                self.drive_toward(target, now_ms, drive, &mut events);
            }
            DomeCommand::OpenShutter => self.complete(cmd, Some(true), &mut events),
            DomeCommand::CloseShutter => self.complete(cmd, Some(false), &mut events),
            DomeCommand::QueryShutterStatus => self.complete(cmd, None, &mut events),
        }
        events
    }

    fn complete(&mut self, cmd: DomeCommand, shutter_open: Option<bool>, events: &mut StepEvents) {
        if let Some(open) = shutter_open {
            self.state.shutter_open = open;
        }
        self.current = None;
        let _ = events.push(DomeEvent::Completed(cmd));
    }

    fn start(
        &mut self,
        cmd: DomeCommand,
        now_ms: u64,
        drive: &mut impl DomeDrivePort,
        events: &mut StepEvents,
    ) {
        info!("dome: starting {:?}", cmd);
        self.current = Some(cmd);
        self.state.last_command_ms = Some(now_ms);
        let _ = events.push(DomeEvent::Started(cmd));

        match cmd {
            DomeCommand::OpenShutter => drive.shutter(self.open_action),
            DomeCommand::CloseShutter => drive.shutter(ShutterAction::Close),
            DomeCommand::QueryShutterStatus => {}
            DomeCommand::GotoAzimuth(target) => {
                self.state.commanded_azimuth = Some(target);
                self.drive_toward(target, now_ms, drive, events);
            }
        }
    }

    fn drive_toward(
        &mut self,
        target: f64,
        now_ms: u64,
        drive: &mut impl DomeDrivePort,
        events: &mut StepEvents,
    ) {
        if let Some(raw) = drive.read_encoder() {
            self.state.azimuth = Some(encoder_to_azimuth(raw, self.state.encoder_offset));
        }
        let started = self.state.last_command_ms.unwrap_or(now_ms);
        let elapsed = now_ms.saturating_sub(started);

        let outcome = match self.state.azimuth {
            None => Some(DomeEvent::Abandoned {
                target,
                reason: AbandonReason::AzimuthUnknown,
            }),
            Some(az) if angular_distance(az, target) < self.tolerance_deg => {
                self.state.failed = false;
                Some(DomeEvent::Arrived { azimuth: az })
            }
            Some(_) if elapsed > self.max_move_ms => {
                self.state.failed = true;
                Some(DomeEvent::Abandoned {
                    target,
                    reason: AbandonReason::TimedOut,
                })
            }
            Some(az) => {
                drive.drive(rotation_for(az, target));
                None
            }
        };

        if let Some(event) = outcome {
            drive.drive(DriveDirection::Stop);
            self.current = None;
            match event {
                DomeEvent::Abandoned { reason, .. } => {
                    warn!("dome: goto {target:.0} abandoned ({reason:?}) after {elapsed} ms");
                }
                _ => info!("dome: arrived at {target:.0}"),
            }
            let _ = events.push(event);
        }
    }

    // ── Queries and mode ──────────────────────────────────────

    /// A command is in flight.
    pub fn in_use(&self) -> bool {
        self.current.is_some()
    }

    /// Nothing in flight and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    pub fn current(&self) -> Option<DomeCommand> {
        self.current
    }

    /// Queued commands, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &DomeCommand> {
        self.queue.iter()
    }

    pub fn state(&self) -> &DomeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DomeState {
        &mut self.state
    }

    pub fn set_auto(&mut self, on: bool) {
        if self.state.auto != on {
            info!("dome: {} mode", if on { "auto" } else { "manual" });
        }
        self.state.auto = on;
    }

    pub fn set_tracking(&mut self, on: bool) {
        self.state.tracking = on;
    }

    pub fn snapshot(&self) -> DomeSnapshot {
        let s = &self.state;
        DomeSnapshot {
            azimuth: s.azimuth.unwrap_or(-1.0),
            commanded_azimuth: s.commanded_azimuth.unwrap_or(-1.0),
            in_use: self.in_use(),
            queued: self.queue.len(),
            shutter_open: s.shutter_open,
            shutter_observed_open: s.shutter_observed_open,
            failed: s.failed,
            auto: s.auto,
            tracking: s.tracking,
            mirror_cover: s.mirror_cover_status(),
            dome_drive: s.dome_drive_status(),
            shutter: s.shutter_status(),
            encoder: s.encoder_status(),
            lights: s.lights_status(),
            focus: s.focus,
            slew_speed: s.slew_speed.label(),
            buttons: s.buttons,
        }
    }
}
