//! Controller configuration parameters
//!
//! All tunable parameters for the dome and paddle controller.  Values are
//! loaded from a JSON file by [`JsonFileConfig`](crate::adapters::config_file::JsonFileConfig)
//! and validated before use.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Which telescope the controller is wired to.  Determines how the coarse
/// paddle speed switches are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Site {
    /// Fine and coarse paddles; coarse speed is `Set` or `Slew`.
    Perth,
    /// Coarse paddle only, two speed switches select `Guide`, `Set` or `Slew`.
    NewZealand,
}

/// Axis rates used by the paddles, in arcseconds per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleRates {
    pub guide: f64,
    pub fine_set: f64,
    pub coarse_set: f64,
    pub slew: f64,
}

impl Default for PaddleRates {
    fn default() -> Self {
        Self {
            guide: 5.0,
            fine_set: 30.0,
            coarse_set: 600.0,
            slew: 3600.0,
        }
    }
}

/// Physical layout of the dome relative to the telescope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomeGeometry {
    /// Dome radius (metres).
    pub radius_m: f64,
    /// Distance from the tube centre to the dome centre along the
    /// declination axis (metres).
    pub tube_offset_m: f64,
    /// Height of the polar axis intersection above the dome centre (metres).
    pub vertical_offset_m: f64,
    /// Observatory latitude (degrees, north positive).
    pub latitude_deg: f64,
    /// Telescope is on the east side of the pier.
    pub east_of_pier: bool,
}

impl DomeGeometry {
    /// Tube-centre offset as a fraction of the dome radius.
    pub fn abs_p(&self) -> f64 {
        self.tube_offset_m / self.radius_m
    }

    /// Vertical offset as a fraction of the dome radius.
    pub fn eta(&self) -> f64 {
        self.vertical_offset_m / self.radius_m
    }
}

impl Default for DomeGeometry {
    fn default() -> Self {
        Self {
            radius_m: 3.48,
            tube_offset_m: 0.55,
            vertical_offset_m: 0.2,
            latitude_deg: -43.9866,
            east_of_pier: false,
        }
    }
}

/// Serial link parameters.  The dome controller only speaks 9600 8N1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud: u32,
    /// Read timeout; also the age at which a partial frame is discarded.
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::from("/dev/ttyUSB0"),
            baud: 9600,
            timeout_ms: 1000,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomeConfig {
    pub site: Site,
    pub rates: PaddleRates,

    // --- Dome ---
    /// Counts added to the raw encoder byte before converting to azimuth.
    pub encoder_offset: i32,
    /// Travel time before a goto is abandoned as failed (milliseconds).
    pub max_dome_move_ms: u64,
    /// A goto is complete when the dome is within this many degrees.
    pub arrival_tolerance_deg: f64,
    /// Minimum time between tracking-generated moves (milliseconds).
    pub tracking_interval_ms: u64,
    /// Start in automatic mode.
    pub default_auto_dome: bool,
    /// Start with dome tracking enabled.
    pub default_dome_tracking: bool,
    /// Open the shutter with the windshield raised.
    pub open_with_windshield: bool,
    pub geometry: DomeGeometry,

    // --- Paddles ---
    /// Virtual buttons release after this long without a protocol update.
    pub virtual_button_timeout_ms: u64,

    // --- Link and timing ---
    pub serial: SerialConfig,
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u64,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u64,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            site: Site::NewZealand,
            rates: PaddleRates::default(),

            encoder_offset: 27,
            max_dome_move_ms: 180_000, // 3 min, a full turn is ~2
            arrival_tolerance_deg: 5.0,
            tracking_interval_ms: 10_000,
            default_auto_dome: false,
            default_dome_tracking: false,
            open_with_windshield: false,
            geometry: DomeGeometry::default(),

            virtual_button_timeout_ms: 1000,

            serial: SerialConfig::default(),
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 10,
        }
    }
}

impl DomeConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.rates;
        if [r.guide, r.fine_set, r.coarse_set, r.slew]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(ConfigError::ValidationFailed("paddle rates must be positive"));
        }
        if !(-255..=255).contains(&self.encoder_offset) {
            return Err(ConfigError::ValidationFailed("encoder_offset must be -255–255"));
        }
        if !(1_000..=900_000).contains(&self.max_dome_move_ms) {
            return Err(ConfigError::ValidationFailed(
                "max_dome_move_ms must be 1000–900000",
            ));
        }
        if !(0.5..=45.0).contains(&self.arrival_tolerance_deg) {
            return Err(ConfigError::ValidationFailed(
                "arrival_tolerance_deg must be 0.5–45.0",
            ));
        }
        let g = &self.geometry;
        if !g.radius_m.is_finite()
            || g.radius_m <= 0.0
            || g.tube_offset_m < 0.0
            || g.tube_offset_m >= g.radius_m
        {
            return Err(ConfigError::ValidationFailed(
                "geometry: need radius_m > tube_offset_m >= 0",
            ));
        }
        if g.vertical_offset_m.abs() >= g.radius_m {
            return Err(ConfigError::ValidationFailed(
                "geometry: vertical_offset_m must be inside the dome",
            ));
        }
        if !(-90.0..=90.0).contains(&g.latitude_deg) {
            return Err(ConfigError::ValidationFailed("latitude_deg must be -90–90"));
        }
        if !(100..=60_000).contains(&self.virtual_button_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "virtual_button_timeout_ms must be 100–60000",
            ));
        }
        if self.serial.port.is_empty() {
            return Err(ConfigError::ValidationFailed("serial.port must not be empty"));
        }
        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("serial.timeout_ms must be > 0"));
        }
        if !(10..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 10–5000",
            ));
        }
        if !(1..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 1–3600",
            ));
        }
        Ok(())
    }
}
