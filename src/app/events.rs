//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use serde::Serialize;

use crate::dome::DomeEvent;
use crate::dome::state::DomeSnapshot;
use crate::error::{AdmissionError, FrameError, GeometryError};
use crate::paddle::PaddleTransition;

/// Which paddle produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaddleSource {
    Physical,
    Virtual,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.
    Started { auto: bool, tracking: bool, connected: bool },

    /// Dome state machine progress.
    Dome(DomeEvent),

    /// A paddle started or stopped an axis motor.
    Paddle { source: PaddleSource, transition: PaddleTransition },

    /// A remote request was refused.
    RequestRejected { request: &'static str, error: AdmissionError },

    /// Inbound serial data was discarded.
    FrameDropped(FrameError),

    /// Commands inside an otherwise valid frame were rejected.
    CommandsRejected(usize),

    /// Tracking generated a new goto.
    TrackingMove { from: Option<f64>, to: f64 },

    /// Tracking could not compute a dome azimuth this tick.
    TrackingSkipped(GeometryError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub tick: u64,
    pub connected: bool,
    pub frames_rx: u64,
    pub frames_tx: u64,
    pub link_errors: u64,
    pub dome: DomeSnapshot,
}
