//! Dome azimuth correction.
//!
//! The telescope tube sits off the polar axis, and the dome radius is about
//! the tube length, so the slit has to point somewhere other than the
//! telescope azimuth.  The tube centre is placed in dome-centred cartesian
//! coordinates (unit = dome radius), the pointing ray from there is
//! intersected with the dome sphere, and the upper intersection is turned
//! back into an azimuth.
//!
//! ```text
//!   x: east     y: north     z: up
//!
//!   x0 =  p·cos(ha)
//!   y0 = -p·sin(ha)·sin(lat)
//!   z0 =  η - p·sin(ha)·cos(lat)          p = ±ABSP by pier side
//! ```

use serde::{Deserialize, Serialize};

use crate::config::DomeGeometry;
use crate::error::GeometryError;

/// Below this the N-S direction cosine is treated as zero.
const MIN_DIRECTION_COSINE: f64 = 1e-12;

/// Where the telescope is pointing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelescopePosition {
    pub ra_hours: f64,
    pub dec_deg: f64,
    pub alt_deg: f64,
    pub azi_deg: f64,
    pub lst_hours: f64,
    /// Fixed dome azimuth for this position, bypassing the correction.
    pub dome_override: Option<f64>,
}

impl TelescopePosition {
    /// Hour angle (LST − RA) in hours, wrapped into `[-12, 12)`.
    pub fn hour_angle_hours(&self) -> f64 {
        (self.lst_hours - self.ra_hours + 12.0).rem_euclid(24.0) - 12.0
    }
}

/// Dome azimuth (degrees, `[0, 360)`) that puts the slit in front of the tube.
pub fn corrected_azimuth(
    pos: &TelescopePosition,
    geometry: &DomeGeometry,
) -> Result<f64, GeometryError> {
    if let Some(az) = pos.dome_override {
        return Ok(az);
    }

    let p = if geometry.east_of_pier {
        -geometry.abs_p()
    } else {
        geometry.abs_p()
    };
    let ha = (pos.hour_angle_hours() * 15.0).to_radians();
    let lat = geometry.latitude_deg.to_radians();
    let (alt, azi) = (pos.alt_deg.to_radians(), pos.azi_deg.to_radians());

    let x0 = p * ha.cos();
    let y0 = -p * ha.sin() * lat.sin();
    let z0 = geometry.eta() - p * ha.sin() * lat.cos();

    let a = -alt.cos() * azi.sin();
    let b = -alt.cos() * azi.cos();
    let c = alt.sin();
    if b.abs() < MIN_DIRECTION_COSINE {
        return Err(GeometryError::DegenerateDirection);
    }

    // Substitute x and z in terms of y into x² + y² + z² = 1.
    let alpha = (a * a + c * c) / (b * b);
    let beta = 2.0 * (a * x0 + c * z0) / b;
    let qa = alpha + 1.0;
    let qb = beta - 2.0 * alpha * y0;
    let qc = alpha * y0 * y0 - beta * y0 + x0 * x0 + z0 * z0 - 1.0;

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Err(GeometryError::NoIntersection);
    }
    let root = disc.sqrt();

    let y1 = (-qb + root) / (2.0 * qa);
    let z1 = (y1 - y0) * c / b + z0;
    let (x, y) = if z1 > 0.0 {
        ((y1 - y0) * a / b + x0, y1)
    } else {
        let y2 = (-qb - root) / (2.0 * qa);
        ((y2 - y0) * a / b + x0, y2)
    };

    Ok((x.atan2(y).to_degrees() + 180.0).rem_euclid(360.0))
}
