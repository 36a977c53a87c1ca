//! Sun elevation crossings: sunrise/sunset and the three twilights.

use crate::detect::threshold::{CrossingDirection, scalar_crossing};
use crate::event::{ALL_TWILIGHTS, InstantEvent, Phenomenon, TwilightDirection};
use crate::window::DetectionWindow;

/// Twilight events at the window's minute. `sun` must be the Sun's window.
///
/// The Sun can only cross one depression angle per minute in practice, but
/// every kind is tested independently.
pub fn detect_twilight(sun: &DetectionWindow<'_>) -> Vec<InstantEvent> {
    let Some((prev, cur)) = sun.step(|s| s.elevation) else {
        return Vec::new();
    };
    ALL_TWILIGHTS
        .into_iter()
        .filter_map(|kind| {
            let direction = match scalar_crossing(prev, cur, kind.elevation_deg())? {
                CrossingDirection::Rising => TwilightDirection::Dawn,
                CrossingDirection::Falling => TwilightDirection::Dusk,
            };
            Some(InstantEvent::new(
                sun.at(),
                Phenomenon::Twilight { kind, direction },
            ))
        })
        .collect()
}
