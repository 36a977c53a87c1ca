//! Local maxima: greatest elongation and peak brightness.

use almanac_core::{is_local_max, normalize_to_pm180, separation_deg};

use crate::event::{ElongationSide, InstantEvent, Phenomenon};
use crate::window::DetectionWindow;

/// Greatest elongation of `body` from the Sun at the window's minute.
///
/// Elongation is the shortest-path separation of the two longitudes; the
/// side is taken from the signed difference at the current minute.
pub fn detect_max_elongation(
    body: &DetectionWindow<'_>,
    sun: &DetectionWindow<'_>,
    margin: usize,
) -> Option<InstantEvent> {
    if margin == 0 {
        return None;
    }
    let elong = body.scalar_with(sun, margin, |b, s| {
        Some(separation_deg(s.longitude?, b.longitude?))
    })?;
    if !is_local_max(elong.before(), elong.current(), elong.after()) {
        return None;
    }
    let signed = normalize_to_pm180(body.current()?.longitude? - sun.current()?.longitude?);
    Some(InstantEvent::new(
        body.at(),
        Phenomenon::MaxElongation {
            body: body.body(),
            side: ElongationSide::from_signed(signed),
            degrees: elong.current(),
        },
    ))
}

/// Brightness peak (`illumination / distance^2`) of the window's body.
pub fn detect_peak_brightness(window: &DetectionWindow<'_>, margin: usize) -> Option<InstantEvent> {
    if margin == 0 {
        return None;
    }
    let b = window.scalar(margin, |s| s.brightness())?;
    is_local_max(b.before(), b.current(), b.after()).then(|| {
        InstantEvent::new(
            window.at(),
            Phenomenon::PeakBrightness {
                body: window.body(),
            },
        )
    })
}
