//! Morning/evening visibility phases of the inner planets.
//!
//! The signed elongation `e = pm180(lon - lon_sun)` is negative west of the
//! Sun (morning sky) and positive east of it (evening sky). A planet becomes
//! visible when `|e|` rises through its visibility threshold and is lost
//! when `|e|` falls back through it.

use almanac_core::normalize_to_pm180;

use crate::detect::threshold::{CrossingDirection, scalar_crossing};
use crate::event::{ElongationSide, InstantEvent, Phenomenon, VisibilityPhase};
use crate::window::DetectionWindow;

/// Visibility phase change of `body` at the window's minute.
pub fn detect_visibility(
    body: &DetectionWindow<'_>,
    sun: &DetectionWindow<'_>,
    threshold_deg: f64,
) -> Option<InstantEvent> {
    let (prev, cur) =
        body.step_with(sun, |b, s| Some(normalize_to_pm180(b.longitude? - s.longitude?)))?;
    let direction = scalar_crossing(prev.abs(), cur.abs(), threshold_deg)?;
    // Near the threshold both minutes are on the same side; use the current one.
    let side = ElongationSide::from_signed(if cur == 0.0 { prev } else { cur });
    let phase = match (side, direction) {
        (ElongationSide::Morning, CrossingDirection::Rising) => VisibilityPhase::MorningRise,
        (ElongationSide::Morning, CrossingDirection::Falling) => VisibilityPhase::MorningSet,
        (ElongationSide::Evening, CrossingDirection::Rising) => VisibilityPhase::EveningRise,
        (ElongationSide::Evening, CrossingDirection::Falling) => VisibilityPhase::EveningSet,
    };
    Some(InstantEvent::new(
        body.at(),
        Phenomenon::Visibility {
            body: body.body(),
            phase,
        },
    ))
}

#[cfg(test)]
mod tests {
    use almanac_core::{Body, Minute, MinuteRange, Sample};

    use super::*;
    use crate::window::BodyTrack;

    fn phase_for(body_lons: [f64; 3], sun_lons: [f64; 3], threshold: f64) -> Option<VisibilityPhase> {
        let span = MinuteRange::new(Minute(0), Minute(2)).unwrap();
        let mk = |body, lons: [f64; 3]| {
            BodyTrack::from_samples(
                body,
                span,
                lons.into_iter()
                    .enumerate()
                    .map(|(i, l)| (Minute(i as i64), Sample::with_longitude(l))),
            )
        };
        let b = mk(Body::Mercury, body_lons);
        let s = mk(Body::Sun, sun_lons);
        let e = detect_visibility(
            &b.window(Minute(1), 1).unwrap(),
            &s.window(Minute(1), 1).unwrap(),
            threshold,
        )?;
        match e.phenomenon {
            Phenomenon::Visibility { phase, .. } => Some(phase),
            _ => None,
        }
    }

    #[test]
    fn four_phases() {
        let sun = [100.0; 3];
        assert_eq!(
            phase_for([90.1, 89.9, 89.8], sun, 10.0),
            Some(VisibilityPhase::MorningRise)
        );
        assert_eq!(
            phase_for([89.9, 90.1, 90.2], sun, 10.0),
            Some(VisibilityPhase::MorningSet)
        );
        assert_eq!(
            phase_for([109.9, 110.1, 110.2], sun, 10.0),
            Some(VisibilityPhase::EveningRise)
        );
        assert_eq!(
            phase_for([110.1, 109.9, 109.8], sun, 10.0),
            Some(VisibilityPhase::EveningSet)
        );
    }

    #[test]
    fn passing_through_conjunction_is_silent() {
        assert_eq!(phase_for([99.9, 100.1, 100.2], [100.0; 3], 10.0), None);
    }

    #[test]
    fn threshold_across_seam() {
        // Sun at 5 deg, Venus crosses 5 deg west of it at 0/360
        assert_eq!(
            phase_for([0.1, 359.9, 359.8], [5.0; 3], 5.0),
            Some(VisibilityPhase::MorningRise)
        );
    }
}
