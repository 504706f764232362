//! Dome-side observed state.
//!
//! [`DomeState`] is everything the dome controller reports plus the host's
//! own mode flags.  Inbound commands are folded in through
//! [`DomeState::apply`]; nothing else parses wire data.

use log::debug;
use serde::Serialize;

use crate::paddle::virtual_paddle::{SlewSpeed, VirtualButtons};
use crate::protocol::inbound::{
    DOME_DRIVE, DOME_ENCODER, DOME_LIGHTS, FocusReport, InboundCommand, MIRROR_COVER, SHUTTER,
    SHUTTER_OPENED,
};

/// Observed dome state and operator flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DomeState {
    /// Last reported azimuth; `None` until the controller reports one.
    pub azimuth: Option<f64>,
    /// Target of the most recent goto.
    pub commanded_azimuth: Option<f64>,
    /// Set when an open completes, cleared when a close completes.
    pub shutter_open: bool,
    /// What the controller says about the shutter.
    pub shutter_observed_open: bool,
    /// The last goto timed out.
    pub failed: bool,
    /// Automatic mode; manual-only when false.
    pub auto: bool,
    /// Follow the telescope.
    pub tracking: bool,
    /// When the in-flight command was started (ms).
    pub last_command_ms: Option<u64>,
    /// Added to the raw encoder byte before converting to degrees.
    pub encoder_offset: i32,

    pub mirror_cover: u8,
    pub dome_drive: u8,
    pub shutter: u8,
    pub encoder: u8,
    pub lights: u8,
    pub focus: FocusReport,

    pub slew_speed: SlewSpeed,
    pub buttons: VirtualButtons,
}

impl DomeState {
    pub fn new(auto: bool, tracking: bool, encoder_offset: i32) -> Self {
        Self {
            azimuth: None,
            commanded_azimuth: None,
            shutter_open: false,
            shutter_observed_open: false,
            failed: false,
            auto,
            tracking,
            last_command_ms: None,
            encoder_offset,
            mirror_cover: 0,
            dome_drive: 0,
            shutter: 0,
            encoder: 0,
            lights: 1,
            focus: FocusReport::default(),
            slew_speed: SlewSpeed::Unspecified,
            buttons: VirtualButtons::default(),
        }
    }

    /// Fold one inbound command into state.
    pub fn apply(&mut self, cmd: InboundCommand) {
        debug!("inbound: {:?}", cmd);
        match cmd {
            InboundCommand::ButtonPressed { button, speed } => {
                self.slew_speed = speed;
                self.buttons.press(button);
            }
            InboundCommand::ButtonsReleased => self.buttons.release_all(),
            InboundCommand::MirrorCover(i) => self.mirror_cover = i,
            InboundCommand::DomeDrive(i) => self.dome_drive = i,
            InboundCommand::Azimuth(az) => self.azimuth = Some(f64::from(az)),
            InboundCommand::Focus(report) => self.focus = report,
            InboundCommand::Shutter(i) => {
                self.shutter = i;
                self.shutter_observed_open = i == SHUTTER_OPENED;
            }
            InboundCommand::Encoder(i) => self.encoder = i,
            InboundCommand::Lights(i) => self.lights = i,
        }
    }

    pub fn mirror_cover_status(&self) -> &'static str {
        status(&MIRROR_COVER, self.mirror_cover)
    }

    pub fn dome_drive_status(&self) -> &'static str {
        status(&DOME_DRIVE, self.dome_drive)
    }

    pub fn shutter_status(&self) -> &'static str {
        status(&SHUTTER, self.shutter)
    }

    pub fn encoder_status(&self) -> &'static str {
        status(&DOME_ENCODER, self.encoder)
    }

    pub fn lights_status(&self) -> &'static str {
        status(&DOME_LIGHTS, self.lights)
    }
}

fn status(table: &[&'static str], index: u8) -> &'static str {
    table.get(usize::from(index)).copied().unwrap_or("unknown")
}

/// Read-only view for publication and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomeSnapshot {
    /// Degrees, or -1 when unknown.
    pub azimuth: f64,
    pub commanded_azimuth: f64,
    pub in_use: bool,
    pub queued: usize,
    pub shutter_open: bool,
    pub shutter_observed_open: bool,
    pub failed: bool,
    pub auto: bool,
    pub tracking: bool,
    pub mirror_cover: &'static str,
    pub dome_drive: &'static str,
    pub shutter: &'static str,
    pub encoder: &'static str,
    pub lights: &'static str,
    pub focus: FocusReport,
    pub slew_speed: &'static str,
    pub buttons: VirtualButtons,
}
