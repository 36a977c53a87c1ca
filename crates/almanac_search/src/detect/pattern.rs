//! Multi-body aspect patterns (T-Square, Grand Trine, Kite, ...).
//!
//! A pattern is a cyclic sequence of arcs between bodies taken in zodiac
//! order. A k-subset of bodies, sorted by longitude, matches a pattern when
//! for some rotation or reflection of the arc sequence every pairwise
//! separation agrees with the template's within the pattern orb.

use almanac_core::{Body, separation_deg};
use itertools::Itertools;

use crate::event::{ALL_PATTERNS, InstantEvent, PatternKind, PatternPhase, Phenomenon};

/// Previous and current longitude of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeStep {
    pub body: Body,
    pub prev: f64,
    pub cur: f64,
}

/// Whether the longitudes `lons` (any order) form `pattern` within `orb`.
pub fn matches_pattern(pattern: PatternKind, lons: &[f64], orb: f64) -> bool {
    let gaps = pattern.gaps_deg();
    let k = gaps.len();
    if lons.len() != k {
        return false;
    }
    let mut sorted = lons.to_vec();
    sorted.sort_by(f64::total_cmp);

    let reversed: Vec<f64> = gaps.iter().rev().copied().collect();
    [gaps, reversed.as_slice()].into_iter().any(|template| {
        (0..k).any(|rot| {
            // expected positions of the sorted bodies relative to the first
            let mut expected = Vec::with_capacity(k);
            let mut acc = 0.0;
            for i in 0..k {
                expected.push(acc);
                acc += template[(rot + i) % k];
            }
            (0..k).tuple_combinations().all(|(i, j)| {
                let actual = separation_deg(sorted[i], sorted[j]);
                let want = separation_deg(expected[i], expected[j]);
                (actual - want).abs() <= orb
            })
        })
    })
}

/// Patterns forming or dissolving between the previous and current minute.
///
/// Every k-subset of `bodies` is tested against every pattern with k
/// participants. Bodies in events are sorted by their zodiac position at
/// `at`.
pub fn detect_patterns(
    at: almanac_core::Minute,
    bodies: &[LongitudeStep],
    orb: f64,
) -> Vec<InstantEvent> {
    let mut out = Vec::new();
    for pattern in ALL_PATTERNS {
        let k = pattern.body_count();
        if bodies.len() < k {
            continue;
        }
        for subset in bodies.iter().combinations(k) {
            let prev: Vec<f64> = subset.iter().map(|s| s.prev).collect();
            let cur: Vec<f64> = subset.iter().map(|s| s.cur).collect();
            let before = matches_pattern(pattern, &prev, orb);
            let now = matches_pattern(pattern, &cur, orb);
            let phase = match (before, now) {
                (false, true) => PatternPhase::Forms,
                (true, false) => PatternPhase::Dissolves,
                _ => continue,
            };
            let participants: Vec<Body> = subset
                .iter()
                .sorted_by(|a, b| a.cur.total_cmp(&b.cur))
                .map(|s| s.body)
                .collect();
            out.push(InstantEvent::new(
                at,
                Phenomenon::Pattern {
                    pattern,
                    bodies: participants,
                    phase,
                },
            ));
        }
    }
    out
}
