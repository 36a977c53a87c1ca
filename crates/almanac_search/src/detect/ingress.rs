//! Zodiac boundary crossings: sign cusps, decan boundaries, sign midpoints.

use almanac_core::{DECAN_SPAN_DEG, Decan, SIGN_SPAN_DEG, Sign};

use crate::detect::threshold::longitude_crossings;
use crate::event::{IngressBoundary, InstantEvent, Motion, Phenomenon};
use crate::window::DetectionWindow;

/// Longitude of a sign's midpoint relative to its cusp.
pub const PEAK_OFFSET_DEG: f64 = 15.0;

/// Sign, decan and peak crossings of the window's body at the window's minute.
///
/// A sign cusp is also a decan boundary; both events are emitted. Events are
/// ordered sign, decan, peak.
pub fn detect_ingress(window: &DetectionWindow<'_>) -> Vec<InstantEvent> {
    let Some((prev, cur)) = window.step(|s| s.longitude) else {
        return Vec::new();
    };
    let body = window.body();
    let at = window.at();
    let mut out = Vec::new();

    let motion = |forward: bool| {
        if forward {
            Motion::Direct
        } else {
            Motion::Retrograde
        }
    };

    for c in longitude_crossings(prev, cur, SIGN_SPAN_DEG, 0.0) {
        let boundary = IngressBoundary::Sign {
            from: Sign::from_index(c.left),
            to: Sign::from_index(c.entered),
        };
        out.push(InstantEvent::new(
            at,
            Phenomenon::Ingress {
                body,
                boundary,
                motion: motion(c.forward),
            },
        ));
    }
    for c in longitude_crossings(prev, cur, DECAN_SPAN_DEG, 0.0) {
        let boundary = IngressBoundary::Decan {
            from: Decan::from_index(c.left),
            to: Decan::from_index(c.entered),
        };
        out.push(InstantEvent::new(
            at,
            Phenomenon::Ingress {
                body,
                boundary,
                motion: motion(c.forward),
            },
        ));
    }
    for c in longitude_crossings(prev, cur, SIGN_SPAN_DEG, PEAK_OFFSET_DEG) {
        // peak k is the midpoint of sign k
        let sign = Sign::from_index(if c.forward { c.entered } else { c.left });
        out.push(InstantEvent::new(
            at,
            Phenomenon::Ingress {
                body,
                boundary: IngressBoundary::Peak { sign },
                motion: motion(c.forward),
            },
        ));
    }
    out
}
