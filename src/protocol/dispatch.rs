//! Inbound command dispatch.
//!
//! The first character of a command selects a parser from [`TABLE`]; the
//! parser turns the rest into an [`InboundCommand`] which is folded into
//! [`DomeState`].  A bad command is logged and skipped, and the remaining
//! commands of the frame are still applied.

use log::{error, warn};

use crate::dome::state::DomeState;
use crate::error::FieldError;

use super::inbound::{self, InboundCommand};

type ParseFn = fn(&str) -> Result<InboundCommand, FieldError>;

/// Letter → parser.
static TABLE: [(char, ParseFn); 12] = [
    ('a', inbound::parse_north),
    ('b', inbound::parse_south),
    ('c', inbound::parse_east),
    ('d', inbound::parse_west),
    ('e', inbound::parse_release),
    ('f', inbound::parse_mirror_cover),
    ('g', inbound::parse_dome_drive),
    ('h', inbound::parse_azimuth),
    ('i', inbound::parse_focus),
    ('j', inbound::parse_shutter),
    ('k', inbound::parse_encoder),
    ('l', inbound::parse_lights),
];

/// Parse one command string without touching any state.
pub fn parse_command(command: &str) -> Result<InboundCommand, FieldError> {
    let mut chars = command.chars();
    let letter = chars.next().ok_or(FieldError::Empty)?;
    let parse = TABLE
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, f)| *f)
        .ok_or(FieldError::UnknownLetter(letter))?;
    parse(chars.as_str())
}

/// Parse `command` and apply it to `state`.
///
/// On error `state` is left exactly as it was.
pub fn dispatch(command: &str, state: &mut DomeState) -> Result<(), FieldError> {
    match parse_command(command) {
        Ok(cmd) => {
            state.apply(cmd);
            Ok(())
        }
        Err(e @ FieldError::UnknownLetter(_)) => {
            error!("invalid command: {:?}", command);
            Err(e)
        }
        Err(e) => {
            warn!("rejected command {:?}: {}", command, e);
            Err(e)
        }
    }
}

/// Dispatch every command of a decoded frame.  Returns how many were
/// rejected.
pub fn dispatch_frame<S: AsRef<str>>(commands: &[S], state: &mut DomeState) -> usize {
    commands
        .iter()
        .filter(|c| dispatch(c.as_ref(), state).is_err())
        .count()
}
