//! Outbound vocabulary (host → dome controller).
//!
//! | Letter | Payload                                              |
//! |--------|------------------------------------------------------|
//! | A      | RA `HH:MM:SS`                                        |
//! | B      | Dec `±DD:MM:SS`                                      |
//! | C      | hour angle `±HH:MM:SS`                               |
//! | D      | local sidereal time `HH:MM:SS`                       |
//! | E      | dome goto azimuth `%03d`                             |
//! | F      | dome auto-goto enable `1` / disable `0`              |
//! | G      | dome auto `1` / manual `0`                           |
//! | H      | manual drive stop `0` / left `1` / right `2`         |
//! | I      | focus goto `%03d`                                    |
//! | J      | focus goto stop `0`                                  |
//! | K      | focus manual stop `0` / in `1` / out `2`             |
//! | L      | shutter stop `0` / open `1` / open + windshield `2` / close `3` |
//! | O      | lights on `1` / off `0`                              |
//! | P      | mirror cover open `1` / close `2`                    |
//!
//! Widths are fixed; the controller firmware parses by position.

use log::trace;

use crate::app::ports::{DomeDrivePort, DriveDirection, ShutterAction};
use crate::dome::geometry::TelescopePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Stop,
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorCoverAction {
    Open,
    Close,
}

/// One outbound command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutboundCommand {
    /// Right ascension in hours.
    RightAscension(f64),
    /// Declination in degrees.
    Declination(f64),
    /// Hour angle in hours.
    HourAngle(f64),
    /// Local sidereal time in hours.
    SiderealTime(f64),
    DomeGoto(u16),
    DomeAutoGoto(bool),
    DomeAuto(bool),
    DomeManual(DriveDirection),
    FocusGoto(u16),
    FocusGotoStop,
    FocusManual(FocusDirection),
    Shutter(ShutterAction),
    Lights(bool),
    MirrorCover(MirrorCoverAction),
}

impl OutboundCommand {
    /// Wire text, letter included, separator excluded.
    pub fn encode(&self) -> String {
        match *self {
            Self::RightAscension(h) => format!("A{}", sexagesimal(h.rem_euclid(24.0), false)),
            Self::Declination(d) => format!("B{}", sexagesimal(d, true)),
            Self::HourAngle(h) => format!("C{}", sexagesimal(h, true)),
            Self::SiderealTime(h) => format!("D{}", sexagesimal(h.rem_euclid(24.0), false)),
            Self::DomeGoto(az) => format!("E{:03}", az),
            Self::DomeAutoGoto(on) => format!("F{}", u8::from(on)),
            Self::DomeAuto(on) => format!("G{}", u8::from(on)),
            Self::DomeManual(dir) => format!(
                "H{}",
                match dir {
                    DriveDirection::Stop => 0,
                    DriveDirection::Left => 1,
                    DriveDirection::Right => 2,
                }
            ),
            Self::FocusGoto(pos) => format!("I{:03}", pos),
            Self::FocusGotoStop => String::from("J0"),
            Self::FocusManual(dir) => format!(
                "K{}",
                match dir {
                    FocusDirection::Stop => 0,
                    FocusDirection::In => 1,
                    FocusDirection::Out => 2,
                }
            ),
            Self::Shutter(action) => format!(
                "L{}",
                match action {
                    ShutterAction::Stop => 0,
                    ShutterAction::OpenWithoutWindshield => 1,
                    ShutterAction::OpenWithWindshield => 2,
                    ShutterAction::Close => 3,
                }
            ),
            Self::Lights(on) => format!("O{}", u8::from(on)),
            Self::MirrorCover(action) => format!(
                "P{}",
                match action {
                    MirrorCoverAction::Open => 1,
                    MirrorCoverAction::Close => 2,
                }
            ),
        }
    }
}

/// Format `value` (hours or degrees) as `HH:MM:SS`, rounded to the second.
///
/// With `signed`, a leading `+` or `-` is always written.
pub fn sexagesimal(value: f64, signed: bool) -> String {
    let total = (value.abs() * 3600.0).round() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    let sign = match (signed, value < 0.0 && total > 0) {
        (false, _) => "",
        (true, true) => "-",
        (true, false) => "+",
    };
    format!("{sign}{h:02}:{m:02}:{s:02}")
}

// ---------------------------------------------------------------------------
// Per-tick buffer
// ---------------------------------------------------------------------------

/// Outbound commands collected during one tick.
///
/// Also the dome drive of the service: manual drive commands only go out
/// when the direction changes, so repeated start/stop calls are free.
#[derive(Debug, Default)]
pub struct OutboundBuffer {
    pending: Vec<OutboundCommand>,
    last_drive: Option<DriveDirection>,
}

impl OutboundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one command.  A raw `H` updates the tracked drive direction
    /// so a later stop from the dome queue is not suppressed.
    pub fn push(&mut self, cmd: OutboundCommand) {
        trace!("outbound: {:?}", cmd);
        if let OutboundCommand::DomeManual(direction) = cmd {
            self.last_drive = Some(direction);
        }
        self.pending.push(cmd);
    }

    /// Queue the telescope coordinate block (A–D).
    pub fn publish_position(&mut self, pos: &TelescopePosition) {
        self.push(OutboundCommand::RightAscension(pos.ra_hours));
        self.push(OutboundCommand::Declination(pos.dec_deg));
        self.push(OutboundCommand::HourAngle(pos.hour_angle_hours()));
        self.push(OutboundCommand::SiderealTime(pos.lst_hours));
    }

    /// Take everything queued so far as wire strings.
    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).map(|c| c.encode()).collect()
    }

    pub fn pending(&self) -> &[OutboundCommand] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Last manual drive direction sent, if any.
    pub fn drive_state(&self) -> Option<DriveDirection> {
        self.last_drive
    }
}

impl DomeDrivePort for OutboundBuffer {
    fn drive(&mut self, direction: DriveDirection) {
        if self.last_drive != Some(direction) {
            self.push(OutboundCommand::DomeManual(direction));
        }
    }

    fn shutter(&mut self, action: ShutterAction) {
        self.push(OutboundCommand::Shutter(action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_payloads() {
        assert_eq!(OutboundCommand::DomeGoto(5).encode(), "E005");
        assert_eq!(OutboundCommand::DomeGoto(270).encode(), "E270");
        assert_eq!(OutboundCommand::FocusGoto(42).encode(), "I042");
        assert_eq!(OutboundCommand::FocusGotoStop.encode(), "J0");
        assert_eq!(OutboundCommand::DomeAuto(false).encode(), "G0");
        assert_eq!(OutboundCommand::DomeAutoGoto(true).encode(), "F1");
        assert_eq!(OutboundCommand::FocusManual(FocusDirection::Out).encode(), "K2");
        assert_eq!(
            OutboundCommand::Shutter(ShutterAction::OpenWithWindshield).encode(),
            "L2"
        );
        assert_eq!(OutboundCommand::Lights(true).encode(), "O1");
        assert_eq!(
            OutboundCommand::MirrorCover(MirrorCoverAction::Close).encode(),
            "P2"
        );
    }

    #[test]
    fn sexagesimal_fields() {
        assert_eq!(OutboundCommand::Declination(-5.5).encode(), "B-05:30:00");
        assert_eq!(OutboundCommand::Declination(12.0).encode(), "B+12:00:00");
        assert_eq!(OutboundCommand::RightAscension(1.5).encode(), "A01:30:00");
        assert_eq!(OutboundCommand::HourAngle(-0.25).encode(), "C-00:15:00");
        assert_eq!(OutboundCommand::SiderealTime(25.0).encode(), "D01:00:00");
    }

    #[test]
    fn sexagesimal_rounds_with_carry() {
        // 59.9999 minutes rounds up into the next hour.
        assert_eq!(sexagesimal(1.0 + 59.9999 / 60.0, false), "02:00:00");
        assert_eq!(sexagesimal(-0.00001, true), "+00:00:00");
    }

    #[test]
    fn drive_sends_only_changes() {
        let mut buf = OutboundBuffer::new();
        buf.drive(DriveDirection::Right);
        buf.drive(DriveDirection::Right);
        buf.drive(DriveDirection::Stop);
        buf.drive(DriveDirection::Stop);
        assert_eq!(buf.drain(), vec!["H2".to_string(), "H0".to_string()]);
        assert!(buf.is_empty());
        assert_eq!(buf.drive_state(), Some(DriveDirection::Stop));
    }

    #[test]
    fn first_stop_is_sent() {
        let mut buf = OutboundBuffer::new();
        buf.drive(DriveDirection::Stop);
        assert_eq!(buf.drain(), vec!["H0".to_string()]);
    }

    #[test]
    fn raw_drive_is_tracked() {
        let mut buf = OutboundBuffer::new();
        buf.drive(DriveDirection::Stop);
        buf.push(OutboundCommand::DomeManual(DriveDirection::Left));
        assert_eq!(buf.drive_state(), Some(DriveDirection::Left));
        buf.drive(DriveDirection::Stop);
        assert_eq!(
            buf.drain(),
            vec!["H0".to_string(), "H1".to_string(), "H0".to_string()]
        );
    }

    #[test]
    fn shutter_always_sent() {
        let mut buf = OutboundBuffer::new();
        buf.shutter(ShutterAction::Close);
        buf.shutter(ShutterAction::Close);
        assert_eq!(buf.drain().len(), 2);
    }
}
