//! Observer location.

use serde::{Deserialize, Serialize};

/// Geographic location on Earth's surface.
///
/// One observer per run. The engine never uses the coordinates itself; they
/// are handed to the positional source, which owns topocentric corrections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees, north positive. Range: [-90, 90].
    pub latitude_deg: f64,
    /// Geodetic longitude in degrees, east positive. Range: [-180, 180].
    pub longitude_deg: f64,
    /// Altitude above mean sea level in meters.
    #[serde(default)]
    pub altitude_m: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Check coordinate ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.latitude_deg.is_finite() || !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err("latitude_deg must be within [-90, 90]");
        }
        if !self.longitude_deg.is_finite() || !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err("longitude_deg must be within [-180, 180]");
        }
        if !self.altitude_m.is_finite() {
            return Err("altitude_m must be finite");
        }
        Ok(())
    }
}

impl Default for GeoLocation {
    /// Greenwich, sea level.
    fn default() -> Self {
        Self::new(51.4769, 0.0, 0.0)
    }
}
