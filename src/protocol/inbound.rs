//! Inbound vocabulary (dome controller → host).
//!
//! Every inbound command is a lower-case letter followed by a decimal
//! payload.  Parsers here turn the payload into an [`InboundCommand`]
//! immediately, so nothing downstream ever looks at strings again.
//!
//! | Letter  | Payload        | Command                          |
//! |---------|----------------|----------------------------------|
//! | a b c d | speed code 0–3 | virtual N / S / E / W pressed    |
//! | e       | ignored        | all virtual buttons released     |
//! | f       | 0–4            | mirror cover status              |
//! | g       | 0–7            | dome drive status                |
//! | h       | 0–360          | dome azimuth                     |
//! | i       | `s,e,a,r`      | secondary mirror / focus report  |
//! | j       | 0–5            | shutter status                   |
//! | k       | 0–1            | encoder initialised status       |
//! | l       | 0–1            | dome lights status               |

use serde::Serialize;

use crate::error::FieldError;
use crate::paddle::virtual_paddle::{SlewSpeed, VirtualButton};

// ---------------------------------------------------------------------------
// Status tables (index = payload value, text must not change)
// ---------------------------------------------------------------------------

pub const MIRROR_COVER: [&str; 5] = [
    "mirror cover closed",
    "mirror cover opened",
    "mirror cover opening",
    "mirror cover closing",
    "mirror cover partly opened",
];

pub const DOME_DRIVE: [&str; 8] = [
    "Dome stopped",
    "Arrived at goto position",
    "Going To",
    "Driving right",
    "Driving left",
    "Dome parked",
    "Encoder not initialised",
    "Goto cancelled",
];

pub const SHUTTER: [&str; 6] = [
    "Shutter closed",
    "Shutter opened",
    "Shutter driving up without windshield",
    "Shutter driving up with windshield",
    "Shutter stopped part way up",
    "Shutter stopped part way down",
];

/// Index of the "Shutter opened" entry in [`SHUTTER`].
pub const SHUTTER_OPENED: u8 = 1;

pub const DOME_ENCODER: [&str; 2] = ["Dome encoder not initialised", " Dome encoder initialised"];

pub const DOME_LIGHTS: [&str; 2] = ["Dome lights on", "Dome lights off"];

// ---------------------------------------------------------------------------
// Typed commands
// ---------------------------------------------------------------------------

/// Secondary mirror and focuser report carried by the `i` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FocusReport {
    pub secondary_mirror: i32,
    pub focus_endstop: i32,
    pub focus_absolute: i32,
    pub focus_relative: i32,
}

/// A fully parsed inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCommand {
    /// One virtual paddle button pressed (a–d).
    ButtonPressed { button: VirtualButton, speed: SlewSpeed },
    /// All virtual paddle buttons released (e).
    ButtonsReleased,
    /// Index into [`MIRROR_COVER`] (f).
    MirrorCover(u8),
    /// Index into [`DOME_DRIVE`] (g).
    DomeDrive(u8),
    /// Dome azimuth in whole degrees, already normalised to 0–359 (h).
    Azimuth(u16),
    /// Focus report (i).
    Focus(FocusReport),
    /// Index into [`SHUTTER`] (j).
    Shutter(u8),
    /// Index into [`DOME_ENCODER`] (k).
    Encoder(u8),
    /// Index into [`DOME_LIGHTS`] (l).
    Lights(u8),
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

fn parse_int(payload: &str) -> Result<i64, FieldError> {
    payload.trim().parse::<i64>().map_err(|_| FieldError::NotNumeric)
}

fn parse_index(payload: &str, len: usize) -> Result<u8, FieldError> {
    let value = parse_int(payload)?;
    let max = len as i64 - 1;
    if (0..=max).contains(&value) {
        Ok(value as u8)
    } else {
        Err(FieldError::OutOfRange { value, max })
    }
}

fn parse_button(payload: &str, button: VirtualButton) -> Result<InboundCommand, FieldError> {
    let code = parse_int(payload)?;
    let speed = SlewSpeed::from_code(code).ok_or(FieldError::OutOfRange {
        value: code,
        max: SlewSpeed::MAX_CODE,
    })?;
    Ok(InboundCommand::ButtonPressed { button, speed })
}

// ---------------------------------------------------------------------------
// Per-letter parsers (registered in the dispatch table)
// ---------------------------------------------------------------------------

pub(crate) fn parse_north(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_button(payload, VirtualButton::North)
}

pub(crate) fn parse_south(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_button(payload, VirtualButton::South)
}

pub(crate) fn parse_east(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_button(payload, VirtualButton::East)
}

pub(crate) fn parse_west(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_button(payload, VirtualButton::West)
}

pub(crate) fn parse_release(_payload: &str) -> Result<InboundCommand, FieldError> {
    Ok(InboundCommand::ButtonsReleased)
}

pub(crate) fn parse_mirror_cover(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_index(payload, MIRROR_COVER.len()).map(InboundCommand::MirrorCover)
}

pub(crate) fn parse_dome_drive(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_index(payload, DOME_DRIVE.len()).map(InboundCommand::DomeDrive)
}

pub(crate) fn parse_azimuth(payload: &str) -> Result<InboundCommand, FieldError> {
    let value = parse_int(payload)?;
    if !(0..=360).contains(&value) {
        return Err(FieldError::OutOfRange { value, max: 360 });
    }
    Ok(InboundCommand::Azimuth((value % 360) as u16))
}

pub(crate) fn parse_focus(payload: &str) -> Result<InboundCommand, FieldError> {
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != 4 {
        return Err(FieldError::FieldCount {
            expected: 4,
            found: fields.len(),
        });
    }
    let mut values = [0i32; 4];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field.trim().parse::<i32>().map_err(|_| FieldError::NotNumeric)?;
    }
    Ok(InboundCommand::Focus(FocusReport {
        secondary_mirror: values[0],
        focus_endstop: values[1],
        focus_absolute: values[2],
        focus_relative: values[3],
    }))
}

pub(crate) fn parse_shutter(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_index(payload, SHUTTER.len()).map(InboundCommand::Shutter)
}

pub(crate) fn parse_encoder(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_index(payload, DOME_ENCODER.len()).map(InboundCommand::Encoder)
}

pub(crate) fn parse_lights(payload: &str) -> Result<InboundCommand, FieldError> {
    parse_index(payload, DOME_LIGHTS.len()).map(InboundCommand::Lights)
}
