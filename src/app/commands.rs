//! Inbound requests to the control service.
//!
//! Remote hosts (RPC, GUI, scripts) never touch dome state directly.  They
//! push a [`DomeRequest`] into a [`RequestChannel`]; the control loop
//! drains it at the start of every tick.
//!
//! ```text
//! ┌──────────────┐  DomeRequest  ┌────────────────┐
//! │ remote host  │──────────────▶│ ControlService │
//! │ (any thread) │   depth 8     │ (tick thread)  │
//! └──────────────┘               └────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::dome::geometry::TelescopePosition;
use crate::protocol::outbound::OutboundCommand;

/// Channel depth for remote requests.
pub const REQUEST_DEPTH: usize = 8;

/// Bounded request channel shared between remote hosts and the tick thread.
pub type RequestChannel = Channel<CriticalSectionRawMutex, DomeRequest, REQUEST_DEPTH>;

/// Work a remote host can ask of the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomeRequest {
    /// Queue a dome goto.
    MoveTo { azimuth: f64, force: bool },
    /// Queue a shutter open.
    Open { force: bool },
    /// Queue a shutter close.
    Close { force: bool },
    /// Switch between automatic and manual-only mode.
    SetAuto(bool),
    /// Enable or disable dome tracking.
    SetTracking(bool),
    /// New telescope position; published to the controller and used for
    /// tracking.
    UpdatePosition(TelescopePosition),
    /// Pass a raw outbound command through (lights, mirror cover, focus).
    Send(OutboundCommand),
}

impl DomeRequest {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move",
            Self::Open { .. } => "open",
            Self::Close { .. } => "close",
            Self::SetAuto(_) => "set-auto",
            Self::SetTracking(_) => "set-tracking",
            Self::UpdatePosition(_) => "position",
            Self::Send(_) => "send",
        }
    }
}
