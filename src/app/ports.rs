//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (motor driver, limit switches, paddle inputs, dome
//! drive, safety flag, event sinks, config storage) implement these
//! traits.  The [`ControlService`](super::service::ControlService) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! ## Contract notes
//!
//! - **MotorPort** calls are fire-and-forget and MUST be idempotent:
//!   starting a running axis or stopping a stopped one is a no-op.
//! - **SafetyPort** is read-only from the core's point of view.
//! - **ConfigPort** implementations MUST validate before persisting.

use crate::config::DomeConfig;
use crate::paddle::Axis;

// ───────────────────────────────────────────────────────────────
// Motor port (domain → telescope axis motors)
// ───────────────────────────────────────────────────────────────

/// Paddle-speed motion on one telescope axis.
pub trait MotorPort {
    /// Start moving `axis` at `velocity` (arcsec/s, East/North positive).
    fn start_paddle(&mut self, axis: Axis, velocity: f64);

    /// Stop paddle motion on `axis`.
    fn stop_paddle(&mut self, axis: Axis);
}

// ───────────────────────────────────────────────────────────────
// Limit port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// RA soft/hard limit state.  Declination is not gated at this layer.
pub trait LimitPort {
    fn can_move_east(&self) -> bool;
    fn can_move_west(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Paddle input port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw switch state of both hand paddles, one bit per switch.
///
/// Bit assignments are in [`crate::paddle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaddleInputs {
    pub fine: u8,
    pub coarse: u8,
}

/// Reads the hard-wired paddle switches.
pub trait PaddleInputPort {
    fn read(&mut self) -> PaddleInputs;
}

// ───────────────────────────────────────────────────────────────
// Safety port (interlock → domain, read-only)
// ───────────────────────────────────────────────────────────────

/// The site safety interlock.
///
/// `motion_permitted()` is true while the interlock allows unattended
/// dome activity.  Dome admission refuses work otherwise unless forced.
pub trait SafetyPort {
    fn motion_permitted(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Dome drive port (domain → dome controller)
// ───────────────────────────────────────────────────────────────

/// Manual dome rotation.  `Right` increases azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDirection {
    Stop,
    Left,
    Right,
}

/// Shutter actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterAction {
    Stop,
    OpenWithoutWindshield,
    OpenWithWindshield,
    Close,
}

/// Drives the dome rotation and shutter.
pub trait DomeDrivePort {
    /// Set the manual drive direction.  Repeating the current direction
    /// must have no effect.
    fn drive(&mut self, direction: DriveDirection);

    /// Actuate the shutter.
    fn shutter(&mut self, action: ShutterAction);

    /// Most recent raw encoder byte (0–255 for a full turn), if this drive
    /// has direct encoder access.
    fn read_encoder(&mut self) -> Option<u8> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`DomeConfig::default()`] if nothing is
    /// stored yet.
    fn load(&self) -> Result<DomeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DomeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("config not found"),
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::StorageFull => Self::Config("storage full"),
            ConfigError::IoError => Self::Config("I/O error"),
        }
    }
}
