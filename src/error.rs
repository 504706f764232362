//! Unified error types for the dome controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the dispatch table and the dome state machine
//! without allocation.
//!
//! | Category        | Type               | Recovery                               |
//! |-----------------|--------------------|----------------------------------------|
//! | Frame           | [`FrameError`]     | frame discarded, next tick retries     |
//! | Field           | [`FieldError`]     | field unchanged, frame continues       |
//! | Queue admission | [`AdmissionError`] | request rejected, state unchanged      |
//! | Geometry        | [`GeometryError`]  | tracking skips the tick                |

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Serial data could not be framed.
    Frame(FrameError),
    /// A single command inside a frame had a bad payload.
    Field(FieldError),
    /// A dome request was refused.
    Admission(AdmissionError),
    /// Azimuth correction has no solution.
    Geometry(GeometryError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Admission(e) => write!(f, "admission: {e}"),
            Self::Geometry(e) => write!(f, "geometry: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// No `*` sentinel arrived within the read timeout.
    Malformed,
    /// Bytes before the sentinel were not ASCII.
    NotAscii,
    /// Too many bytes accumulated without a sentinel.
    Overflow,
    /// The underlying transport reported a read or write failure.
    Transport,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "unterminated frame"),
            Self::NotAscii => write!(f, "non-ASCII bytes in frame"),
            Self::Overflow => write!(f, "frame exceeds maximum length"),
            Self::Transport => write!(f, "transport I/O failed"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// First character does not name any inbound command.
    UnknownLetter(char),
    /// Command string was empty.
    Empty,
    /// Payload was not a decimal integer.
    NotNumeric,
    /// Payload parsed but is outside the table or range.
    OutOfRange { value: i64, max: i64 },
    /// Comma-separated payload had the wrong number of fields.
    FieldCount { expected: usize, found: usize },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLetter(c) => write!(f, "unknown command letter {c:?}"),
            Self::Empty => write!(f, "empty command"),
            Self::NotNumeric => write!(f, "payload is not numeric"),
            Self::OutOfRange { value, max } => write!(f, "value {value} outside 0..={max}"),
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
        }
    }
}

impl From<FieldError> for Error {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

// ---------------------------------------------------------------------------
// Queue admission errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    /// The dome is in manual-only mode.
    NotAutoMode,
    /// Azimuth is not a finite number in `[0, 360)`.
    InvalidAzimuth,
    /// Safety tags are set and the request was not forced.
    SafetyInterlock,
    /// The command queue has no room for the request.
    QueueFull,
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAutoMode => write!(f, "dome not in auto mode"),
            Self::InvalidAzimuth => write!(f, "azimuth must be between 0 and 359"),
            Self::SafetyInterlock => write!(f, "no dome activity until safety tags cleared"),
            Self::QueueFull => write!(f, "dome command queue full"),
        }
    }
}

impl From<AdmissionError> for Error {
    fn from(e: AdmissionError) -> Self {
        Self::Admission(e)
    }
}

// ---------------------------------------------------------------------------
// Geometry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// The pointing ray does not meet the dome sphere (negative discriminant).
    NoIntersection,
    /// The N-S direction cosine is zero, the projection is undefined.
    DegenerateDirection,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoIntersection => write!(f, "pointing ray does not intersect dome"),
            Self::DegenerateDirection => write!(f, "degenerate pointing direction"),
        }
    }
}

impl From<GeometryError> for Error {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
