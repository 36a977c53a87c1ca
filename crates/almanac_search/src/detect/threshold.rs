//! Threshold-crossing primitives.

use almanac_core::{normalize_360, unwrap_near};

/// Direction of a scalar threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingDirection {
    Rising,
    Falling,
}

/// Crossing of `threshold` between the previous and current value.
///
/// Rising when `prev < T <= cur`, falling when `prev > T >= cur`. The two
/// cannot both hold.
pub fn scalar_crossing(prev: f64, cur: f64, threshold: f64) -> Option<CrossingDirection> {
    if prev < threshold && cur >= threshold {
        Some(CrossingDirection::Rising)
    } else if prev > threshold && cur <= threshold {
        Some(CrossingDirection::Falling)
    } else {
        None
    }
}

/// A periodic longitude boundary crossed between two minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeCrossing {
    /// Boundary longitude in [0, 360).
    pub boundary_deg: f64,
    /// Region index (`floor((lon - offset) / period)`, unwrapped) entered
    /// by the crossing.
    pub entered: i64,
    /// Region index left.
    pub left: i64,
    /// `true` when longitude increased across the boundary.
    pub forward: bool,
}

/// Boundaries `offset + k * period` crossed between `prev` and `cur`.
///
/// `cur` is first moved to the representative within 180 deg of `prev`,
/// so the 359 -> 0 seam is a short forward step rather than a long
/// backward sweep. Each boundary `B` follows [`scalar_crossing`]: forward
/// when `prev < B <= cur`, backward when `prev > B >= cur`.
pub fn longitude_crossings(prev: f64, cur: f64, period: f64, offset: f64) -> Vec<LongitudeCrossing> {
    let cur = unwrap_near(prev, cur);
    let pos = |lon: f64| (lon - offset) / period;
    let boundary = |k: i64| normalize_360(offset + k as f64 * period);

    if cur > prev {
        let first = pos(prev).floor() as i64 + 1;
        let last = pos(cur).floor() as i64;
        (first..=last)
            .map(|k| LongitudeCrossing {
                boundary_deg: boundary(k),
                entered: k,
                left: k - 1,
                forward: true,
            })
            .collect()
    } else if cur < prev {
        let lowest = pos(cur).ceil() as i64;
        let above = pos(prev).ceil() as i64;
        (lowest..above)
            .rev()
            .map(|k| LongitudeCrossing {
                boundary_deg: boundary(k),
                entered: k - 1,
                left: k,
                forward: false,
            })
            .collect()
    } else {
        Vec::new()
    }
}
