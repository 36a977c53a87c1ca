//! Duration synthesis: pairing beginning and ending events into intervals.
//!
//! [`pair`] is a greedy two-pointer walk over one subject's beginnings and
//! endings. [`synthesize`] extracts the subject keys from each event's
//! phenomenon, groups, and pairs each group on its own.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use almanac_core::Minute;
use serde::Serialize;
use tracing::{debug, warn};

use crate::event::{
    AspectPhase, DurationEvent, DurationSubject, IngressBoundary, InstantEvent, PatternPhase,
    Phenomenon, Role, StationType, TwilightDirection, TwilightKind, VisibilityPhase,
};

/// Result of pairing one subject's events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pairing<'a> {
    /// Accepted `(beginning, ending)` pairs in chronological order.
    pub pairs: Vec<(&'a InstantEvent, &'a InstantEvent)>,
    /// Endings at or before the beginning they were tested against.
    pub discarded: Vec<&'a InstantEvent>,
    /// Beginnings left without an ending (interval runs past the range end).
    pub dangling_beginnings: Vec<&'a InstantEvent>,
    /// Endings left without a beginning.
    pub dangling_endings: Vec<&'a InstantEvent>,
}

/// Pair `beginnings` with `endings`, both sorted ascending by timestamp.
///
/// An ending at or before the current beginning cannot close it: the ending
/// is discarded with a warning and the same beginning is tried against the
/// next ending. Otherwise both advance. Whatever is left over is dangling.
/// Assumes at most one open period at a time.
pub fn pair<'a>(
    beginnings: &'a [InstantEvent],
    endings: &'a [InstantEvent],
    label: &str,
) -> Pairing<'a> {
    let mut out = Pairing::default();
    let (mut i, mut j) = (0, 0);

    while i < beginnings.len() && j < endings.len() {
        let (b, e) = (&beginnings[i], &endings[j]);
        if e.at <= b.at {
            warn!(
                subject = label,
                beginning = %b.at,
                ending = %e.at,
                "ending does not follow its beginning; discarded"
            );
            out.discarded.push(e);
            j += 1;
        } else {
            out.pairs.push((b, e));
            i += 1;
            j += 1;
        }
    }

    out.dangling_beginnings.extend(&beginnings[i..]);
    out.dangling_endings.extend(&endings[j..]);
    if !out.dangling_beginnings.is_empty() || !out.dangling_endings.is_empty() {
        warn!(
            subject = label,
            beginnings = out.dangling_beginnings.len(),
            endings = out.dangling_endings.len(),
            "unpaired events; the interval extends past the queried range"
        );
    }
    out
}

/// Subjects an event opens or closes.
///
/// One event may play two roles: astronomical dusk ends the astronomical
/// light and begins the night; a sign ingress ends the transit of the sign
/// left and begins the transit of the sign entered.
pub fn roles(phenomenon: &Phenomenon) -> Vec<(DurationSubject, Role)> {
    match phenomenon {
        Phenomenon::Twilight { kind, direction } => {
            let light = DurationSubject::Light { kind: *kind };
            let astronomical = *kind == TwilightKind::Astronomical;
            match direction {
                TwilightDirection::Dawn => {
                    let mut r = vec![(light, Role::Begins)];
                    if astronomical {
                        r.push((DurationSubject::Night, Role::Ends));
                    }
                    r
                }
                TwilightDirection::Dusk => {
                    let mut r = vec![(light, Role::Ends)];
                    if astronomical {
                        r.push((DurationSubject::Night, Role::Begins));
                    }
                    r
                }
            }
        }
        Phenomenon::Ingress {
            body,
            boundary: IngressBoundary::Sign { from, to },
            ..
        } => vec![
            (
                DurationSubject::SignTransit {
                    body: *body,
                    sign: *from,
                },
                Role::Ends,
            ),
            (
                DurationSubject::SignTransit {
                    body: *body,
                    sign: *to,
                },
                Role::Begins,
            ),
        ],
        Phenomenon::Station { body, station } => {
            let subject = DurationSubject::Retrograde { body: *body };
            match station {
                StationType::StationRetrograde => vec![(subject, Role::Begins)],
                StationType::StationDirect => vec![(subject, Role::Ends)],
            }
        }
        Phenomenon::Visibility { body, phase } => {
            let body = *body;
            vec![match phase {
                VisibilityPhase::MorningRise => {
                    (DurationSubject::MorningStar { body }, Role::Begins)
                }
                VisibilityPhase::MorningSet => {
                    (DurationSubject::MorningStar { body }, Role::Ends)
                }
                VisibilityPhase::EveningRise => {
                    (DurationSubject::EveningStar { body }, Role::Begins)
                }
                VisibilityPhase::EveningSet => {
                    (DurationSubject::EveningStar { body }, Role::Ends)
                }
            }]
        }
        Phenomenon::Aspect {
            first,
            second,
            aspect,
            phase,
        } => {
            let subject = DurationSubject::AspectOrb {
                first: *first,
                second: *second,
                aspect: *aspect,
            };
            match phase {
                AspectPhase::Begins => vec![(subject, Role::Begins)],
                AspectPhase::Ends => vec![(subject, Role::Ends)],
                _ => Vec::new(),
            }
        }
        Phenomenon::Pattern {
            pattern,
            bodies,
            phase,
        } => {
            let mut bodies = bodies.clone();
            bodies.sort();
            let subject = DurationSubject::Pattern {
                pattern: *pattern,
                bodies,
            };
            match phase {
                PatternPhase::Forms => vec![(subject, Role::Begins)],
                PatternPhase::Dissolves => vec![(subject, Role::Ends)],
            }
        }
        Phenomenon::Ingress { .. }
        | Phenomenon::MaxElongation { .. }
        | Phenomenon::PeakBrightness { .. } => Vec::new(),
    }
}

/// A recoverable pairing anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum PairingWarning {
    /// An ending at or before the beginning it was tested against.
    DiscardedEnding { subject: DurationSubject, at: Minute },
    /// Beginnings with no ending inside the range.
    DanglingBeginnings {
        subject: DurationSubject,
        at: Vec<Minute>,
    },
    /// Endings with no beginning inside the range.
    DanglingEndings {
        subject: DurationSubject,
        at: Vec<Minute>,
    },
}

impl Display for PairingWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiscardedEnding { subject, at } => {
                write!(f, "{subject}: discarded ending at {at}")
            }
            Self::DanglingBeginnings { subject, at } => {
                write!(f, "{subject}: {} beginning(s) without an ending", at.len())
            }
            Self::DanglingEndings { subject, at } => {
                write!(f, "{subject}: {} ending(s) without a beginning", at.len())
            }
        }
    }
}

/// Durations and the warnings produced while pairing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Synthesis {
    /// Sorted by start, then end.
    pub durations: Vec<DurationEvent>,
    pub warnings: Vec<PairingWarning>,
}

/// Group `events` by subject and pair each group.
pub fn synthesize(events: &[InstantEvent]) -> Synthesis {
    let mut groups: BTreeMap<DurationSubject, (Vec<InstantEvent>, Vec<InstantEvent>)> =
        BTreeMap::new();
    for event in events {
        for (subject, role) in roles(&event.phenomenon) {
            let (begins, ends) = groups.entry(subject).or_default();
            match role {
                Role::Begins => begins.push(event.clone()),
                Role::Ends => ends.push(event.clone()),
            }
        }
    }

    let mut out = Synthesis::default();
    for (subject, (mut begins, mut ends)) in groups {
        begins.sort_by_key(|e| e.at);
        ends.sort_by_key(|e| e.at);
        let label = subject.label();
        let pairing = pair(&begins, &ends, &label);

        out.durations.extend(
            pairing
                .pairs
                .iter()
                .filter_map(|(b, e)| DurationEvent::new(b.at, e.at, subject.clone())),
        );
        out.warnings.extend(
            pairing
                .discarded
                .iter()
                .map(|e| PairingWarning::DiscardedEnding {
                    subject: subject.clone(),
                    at: e.at,
                }),
        );
        if !pairing.dangling_beginnings.is_empty() {
            out.warnings.push(PairingWarning::DanglingBeginnings {
                subject: subject.clone(),
                at: pairing.dangling_beginnings.iter().map(|e| e.at).collect(),
            });
        }
        if !pairing.dangling_endings.is_empty() {
            out.warnings.push(PairingWarning::DanglingEndings {
                subject: subject.clone(),
                at: pairing.dangling_endings.iter().map(|e| e.at).collect(),
            });
        }
    }

    out.durations.sort_by_key(|d| (d.start(), d.end()));
    debug!(
        durations = out.durations.len(),
        warnings = out.warnings.len(),
        "durations synthesized"
    );
    out
}

#[cfg(test)]
mod tests {
    use almanac_core::{Body, Sign};

    use super::*;

    fn station(at: i64, body: Body, station: StationType) -> InstantEvent {
        InstantEvent::new(Minute(at), Phenomenon::Station { body, station })
    }

    fn twilight(at: i64, kind: TwilightKind, direction: TwilightDirection) -> InstantEvent {
        InstantEvent::new(Minute(at), Phenomenon::Twilight { kind, direction })
    }

    fn marks(times: &[i64]) -> Vec<InstantEvent> {
        times
            .iter()
            .map(|&t| station(t, Body::Mars, StationType::StationRetrograde))
            .collect()
    }

    fn ats(pairs: &[(&InstantEvent, &InstantEvent)]) -> Vec<(i64, i64)> {
        pairs.iter().map(|(b, e)| (b.at.0, e.at.0)).collect()
    }

    #[test]
    fn n_to_n() {
        let b = marks(&[0, 10, 20, 30]);
        let e = marks(&[5, 15, 25, 35]);
        let p = pair(&b, &e, "test");
        assert_eq!(ats(&p.pairs), vec![(0, 5), (10, 15), (20, 25), (30, 35)]);
        assert!(p.discarded.is_empty());
        assert!(p.dangling_beginnings.is_empty() && p.dangling_endings.is_empty());
    }

    #[test]
    fn empty_inputs() {
        let some = marks(&[1, 2, 3]);
        let p = pair(&[], &some, "test");
        assert!(p.pairs.is_empty());
        assert_eq!(p.dangling_endings.len(), 3);
        let p = pair(&some, &[], "test");
        assert!(p.pairs.is_empty());
        assert_eq!(p.dangling_beginnings.len(), 3);
    }

    #[test]
    fn early_ending_discarded() {
        let b = marks(&[0]);
        let e = marks(&[-1, 5]);
        let p = pair(&b, &e, "test");
        assert_eq!(ats(&p.pairs), vec![(0, 5)]);
        assert_eq!(p.discarded.len(), 1);
        assert_eq!(p.discarded[0].at, Minute(-1));
    }

    #[test]
    fn equal_timestamps_are_invalid() {
        let b = marks(&[4]);
        let e = marks(&[4, 9]);
        let p = pair(&b, &e, "test");
        assert_eq!(ats(&p.pairs), vec![(4, 9)]);
        assert_eq!(p.discarded.len(), 1);
    }

    #[test]
    fn retrograde_paired_per_body() {
        let events = vec![
            station(10, Body::Mars, StationType::StationRetrograde),
            station(15, Body::Venus, StationType::StationRetrograde),
            station(20, Body::Venus, StationType::StationDirect),
            station(40, Body::Mars, StationType::StationDirect),
        ];
        let s = synthesize(&events);
        assert!(s.warnings.is_empty());
        let got: Vec<(i64, i64, String)> = s
            .durations
            .iter()
            .map(|d| (d.start().0, d.end().0, d.label().to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                (10, 40, "Mars Retrograde".to_string()),
                (15, 20, "Venus Retrograde".to_string()),
            ]
        );
    }

    #[test]
    fn morning_and_evening_stars_pair_per_body() {
        let seen = |at: i64, body: Body, phase: VisibilityPhase| {
            InstantEvent::new(Minute(at), Phenomenon::Visibility { body, phase })
        };
        let events = vec![
            seen(10, Body::Venus, VisibilityPhase::MorningRise),
            seen(12, Body::Mercury, VisibilityPhase::EveningRise),
            seen(40, Body::Mercury, VisibilityPhase::EveningSet),
            seen(50, Body::Venus, VisibilityPhase::MorningSet),
            seen(60, Body::Mercury, VisibilityPhase::MorningRise),
        ];
        let s = synthesize(&events);
        let got: Vec<(i64, i64, String)> = s
            .durations
            .iter()
            .map(|d| (d.start().0, d.end().0, d.label().to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                (10, 50, "Venus Morning Star".to_string()),
                (12, 40, "Mercury Evening Star".to_string()),
            ]
        );
        assert_eq!(
            s.warnings,
            vec![PairingWarning::DanglingBeginnings {
                subject: DurationSubject::MorningStar {
                    body: Body::Mercury
                },
                at: vec![Minute(60)],
            }]
        );
    }

    #[test]
    fn civil_dawn_to_dusk_is_daylight() {
        let events = vec![
            twilight(100, TwilightKind::Civil, TwilightDirection::Dawn),
            twilight(900, TwilightKind::Civil, TwilightDirection::Dusk),
        ];
        let s = synthesize(&events);
        assert_eq!(s.durations.len(), 1);
        let d = &s.durations[0];
        assert_eq!((d.start(), d.end()), (Minute(100), Minute(900)));
        assert_eq!(d.label(), "Daylight");
        assert!(d.categories().contains("Civil"));
    }

    #[test]
    fn astronomical_dusk_ends_light_and_begins_night() {
        let events = vec![
            twilight(0, TwilightKind::Astronomical, TwilightDirection::Dawn),
            twilight(800, TwilightKind::Astronomical, TwilightDirection::Dusk),
            twilight(1440, TwilightKind::Astronomical, TwilightDirection::Dawn),
        ];
        let s = synthesize(&events);
        let labels: Vec<(&str, i64, i64)> = s
            .durations
            .iter()
            .map(|d| (d.label(), d.start().0, d.end().0))
            .collect();
        assert_eq!(
            labels,
            vec![("Astronomical Light", 0, 800), ("Night", 800, 1440)]
        );
        // the second dawn's light never ends, the first dawn never closed a night
        assert!(s.warnings.iter().any(|w| matches!(
            w,
            PairingWarning::DanglingBeginnings {
                subject: DurationSubject::Light { .. },
                ..
            }
        )));
        assert!(s.warnings.iter().any(|w| matches!(
            w,
            PairingWarning::DiscardedEnding {
                subject: DurationSubject::Night,
                ..
            }
        )));
    }

    #[test]
    fn sign_transit_between_ingresses() {
        let ingress = |at, from, to| {
            InstantEvent::new(
                Minute(at),
                Phenomenon::Ingress {
                    body: Body::Moon,
                    boundary: IngressBoundary::Sign { from, to },
                    motion: crate::event::Motion::Direct,
                },
            )
        };
        let events = vec![
            ingress(0, Sign::Aries, Sign::Taurus),
            ingress(3000, Sign::Taurus, Sign::Gemini),
        ];
        let s = synthesize(&events);
        assert_eq!(s.durations.len(), 1);
        assert_eq!(s.durations[0].label(), "Moon in Taurus");
        assert_eq!(s.warnings.len(), 2);
    }

    #[test]
    fn exact_and_trend_phases_have_no_role() {
        let p = Phenomenon::Aspect {
            first: Body::Sun,
            second: Body::Moon,
            aspect: almanac_core::AspectKind::Conjunction,
            phase: AspectPhase::Exact,
        };
        assert!(roles(&p).is_empty());
    }
}
