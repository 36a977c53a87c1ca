//! Pairwise aspects: orb entry/exit, exactness and trend reversals.
//!
//! For each aspect angle the deviation `d = |sep - angle|` is tracked over
//! the three minutes around the current one. Entering and leaving the orb
//! are threshold crossings of `d`; the trend reversals inside the orb are
//! local extrema of `d`. Every minimum inside the orb is the exact aspect,
//! however close the bodies actually get.

use almanac_config::AspectSettings;
use almanac_core::{AspectKind, Body, separation_deg};

use crate::event::{AspectPhase, InstantEvent, Phenomenon};
use crate::window::DetectionWindow;

/// Deviation of the separation of `a` and `b` from `kind`'s angle.
pub fn aspect_deviation(a: f64, b: f64, kind: AspectKind) -> f64 {
    (separation_deg(a, b) - kind.angle_deg()).abs()
}

/// Phase event for one aspect given deviations at `t-1`, `t`, `t+1`.
///
/// At most one phase fires per minute; orb crossings take precedence over
/// trend reversals.
pub fn classify_aspect(prev: f64, cur: f64, next: f64, orb: f64) -> Option<AspectPhase> {
    if prev > orb && cur <= orb {
        return Some(AspectPhase::Begins);
    }
    if prev <= orb && cur > orb {
        return Some(AspectPhase::Ends);
    }
    if cur > orb {
        return None;
    }
    if cur < prev && cur <= next {
        Some(AspectPhase::Exact)
    } else if cur > prev && cur >= next {
        Some(AspectPhase::Applying)
    } else {
        None
    }
}

/// Aspect events between the bodies of `first` and `second` at their minute.
pub fn detect_aspects(
    first: &DetectionWindow<'_>,
    second: &DetectionWindow<'_>,
    settings: &AspectSettings,
) -> Vec<InstantEvent> {
    let Some(lon_a) = first.scalar(1, |s| s.longitude) else {
        return Vec::new();
    };
    let Some(lon_b) = second.scalar(1, |s| s.longitude) else {
        return Vec::new();
    };
    let pairs = [
        (lon_a.before()[0], lon_b.before()[0]),
        (lon_a.current(), lon_b.current()),
        (lon_a.after()[0], lon_b.after()[0]),
    ];

    settings
        .kinds
        .iter()
        .filter_map(|&kind| {
            let [p, c, n] = pairs.map(|(a, b)| aspect_deviation(a, b, kind));
            let phase = classify_aspect(p, c, n, settings.orb_for(kind))?;
            Some(aspect_event(first, second.body(), kind, phase))
        })
        .collect()
}

fn aspect_event(
    first: &DetectionWindow<'_>,
    second: Body,
    aspect: AspectKind,
    phase: AspectPhase,
) -> InstantEvent {
    InstantEvent::new(
        first.at(),
        Phenomenon::Aspect {
            first: first.body(),
            second,
            aspect,
            phase,
        },
    )
}
