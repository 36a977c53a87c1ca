//! Retrograde and direct stations by directional reversal.
//!
//! A coarse sign change of the longitude difference would fire on any noise
//! in the samples. Instead every sample of the margin on both sides must lie
//! on the same side of the current longitude: all earlier samples below it
//! and all later ones at or below it for a retrograde station, and the
//! mirror for a direct station. Neighbours are first moved to within 180 deg
//! of the current longitude so the 0/360 seam looks continuous.

use almanac_core::unwrap_near;

use crate::event::{InstantEvent, Phenomenon, StationType};
use crate::window::{DetectionWindow, ScalarWindow};

/// Classify the reversal at the centre of `lon`, if any.
pub fn classify_station(lon: &ScalarWindow) -> Option<StationType> {
    let c = lon.current();
    let before = lon.before().iter().map(|&v| unwrap_near(c, v));
    let after = lon.after().iter().map(|&v| unwrap_near(c, v));

    if before.clone().all(|v| v < c) && after.clone().all(|v| v <= c) {
        Some(StationType::StationRetrograde)
    } else if before.clone().all(|v| v > c) && after.clone().all(|v| v >= c) {
        Some(StationType::StationDirect)
    } else {
        None
    }
}

/// Station of the window's body at the window's minute, over `margin`
/// samples each side.
pub fn detect_station(window: &DetectionWindow<'_>, margin: usize) -> Option<InstantEvent> {
    if margin == 0 {
        return None;
    }
    let lon = window.scalar(margin, |s| s.longitude)?;
    let station = classify_station(&lon)?;
    Some(InstantEvent::new(
        window.at(),
        Phenomenon::Station {
            body: window.body(),
            station,
        },
    ))
}
