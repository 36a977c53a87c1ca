//! Angle normalization and shortest-path arithmetic on the ecliptic circle.

/// Normalize an angle to [0, 360) degrees.
pub fn normalize_360(deg: f64) -> f64 {
    let r = deg % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

/// Normalize an angle to (-180, +180].
pub fn normalize_to_pm180(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Signed shortest-path motion from `from` to `to`, in (-180, +180].
pub fn signed_delta_deg(from: f64, to: f64) -> f64 {
    normalize_to_pm180(to - from)
}

/// Unsigned shortest-path separation between two longitudes, in [0, 180].
pub fn separation_deg(a: f64, b: f64) -> f64 {
    signed_delta_deg(a, b).abs()
}

/// Representative of `value` (mod 360) lying within ±180° of `reference`.
///
/// Used to compare neighbouring longitudes across the 0°/360° seam: with
/// reference 359°, the value 1° becomes 361°.
pub fn unwrap_near(reference: f64, value: f64) -> f64 {
    reference + signed_delta_deg(reference, value)
}
