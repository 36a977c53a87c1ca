//! Event types produced by the detectors and the duration synthesizer.
//!
//! Every detector output carries a typed [`Phenomenon`]; labels, descriptions
//! and category tags are generated from it, and the synthesizer groups events
//! by the typed [`DurationSubject`]s a phenomenon begins or ends.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use almanac_core::{AspectKind, Body, Decan, Minute, Sign};
use serde::Serialize;

/// Sun altitude classes: the horizon crossing and the three twilights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightKind {
    /// Sunrise/sunset: upper limb on the horizon (34' refraction + 16' semidiameter).
    Horizon,
    /// Sun centre 6 deg below the horizon.
    Civil,
    /// Sun centre 12 deg below the horizon.
    Nautical,
    /// Sun centre 18 deg below the horizon.
    Astronomical,
}

/// All twilight kinds, shallowest first.
pub const ALL_TWILIGHTS: [TwilightKind; 4] = [
    TwilightKind::Horizon,
    TwilightKind::Civil,
    TwilightKind::Nautical,
    TwilightKind::Astronomical,
];

impl TwilightKind {
    /// Depression angle in degrees below the geometric horizon.
    pub fn depression_deg(self) -> f64 {
        match self {
            Self::Horizon => 50.0 / 60.0,
            Self::Civil => 6.0,
            Self::Nautical => 12.0,
            Self::Astronomical => 18.0,
        }
    }

    /// Sun elevation threshold in degrees (negative).
    pub fn elevation_deg(self) -> f64 {
        -self.depression_deg()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Horizon => "Horizon",
            Self::Civil => "Civil",
            Self::Nautical => "Nautical",
            Self::Astronomical => "Astronomical",
        }
    }
}

/// Rising through the threshold is dawn, falling is dusk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightDirection {
    Dawn,
    Dusk,
}

/// Apparent motion along the ecliptic when a boundary is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Direct,
    Retrograde,
}

/// Which zodiac boundary a body crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngressBoundary {
    /// 30 deg sign cusp.
    Sign { from: Sign, to: Sign },
    /// 10 deg decan boundary (sign cusps included).
    Decan { from: Decan, to: Decan },
    /// 15 deg midpoint of a sign.
    Peak { sign: Sign },
}

impl IngressBoundary {
    fn name(self) -> &'static str {
        match self {
            Self::Sign { .. } => "Sign",
            Self::Decan { .. } => "Decan",
            Self::Peak { .. } => "Peak",
        }
    }
}

/// Station type: retrograde or direct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationType {
    /// Longitude stops increasing and starts decreasing.
    StationRetrograde,
    /// Longitude stops decreasing and starts increasing.
    StationDirect,
}

/// West of the Sun (morning sky) or east of it (evening sky).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElongationSide {
    Morning,
    Evening,
}

impl ElongationSide {
    /// Side for a signed elongation `pm180(lon - lon_sun)`.
    pub fn from_signed(elongation_deg: f64) -> Self {
        if elongation_deg < 0.0 {
            Self::Morning
        } else {
            Self::Evening
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Evening => "Evening",
        }
    }
}

/// Visibility phases of an inner planet over its synodic cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPhase {
    /// Emerges west of the Sun: first morning visibility.
    MorningRise,
    /// Sinks into the Sun's glare on the morning side.
    MorningSet,
    /// Emerges east of the Sun: first evening visibility.
    EveningRise,
    /// Sinks into the Sun's glare on the evening side.
    EveningSet,
}

impl VisibilityPhase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::MorningRise => "Morning Rise",
            Self::MorningSet => "Morning Set",
            Self::EveningRise => "Evening Rise",
            Self::EveningSet => "Evening Set",
        }
    }
}

/// Where a pairwise aspect is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPhase {
    /// Deviation drops inside the orb.
    Begins,
    /// Deviation turns from growing to shrinking inside the orb.
    Applying,
    /// Deviation reaches a minimum inside the orb; the aspect separates
    /// from here on.
    Exact,
    /// Deviation leaves the orb.
    Ends,
}

impl AspectPhase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Begins => "Begins",
            Self::Applying => "Applying",
            Self::Exact => "Exact",
            Self::Ends => "Ends",
        }
    }
}

/// Multi-body aspect configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    TSquare,
    GrandTrine,
    Yod,
    GrandCross,
    Kite,
    MysticRectangle,
    GrandQuintile,
    GrandSextile,
}

/// All patterns, by body count.
pub const ALL_PATTERNS: [PatternKind; 8] = [
    PatternKind::TSquare,
    PatternKind::GrandTrine,
    PatternKind::Yod,
    PatternKind::GrandCross,
    PatternKind::Kite,
    PatternKind::MysticRectangle,
    PatternKind::GrandQuintile,
    PatternKind::GrandSextile,
];

impl PatternKind {
    /// Arcs between consecutive bodies going round the zodiac, in degrees.
    /// Sums to 360.
    pub fn gaps_deg(self) -> &'static [f64] {
        match self {
            Self::TSquare => &[90.0, 90.0, 180.0],
            Self::GrandTrine => &[120.0, 120.0, 120.0],
            Self::Yod => &[60.0, 150.0, 150.0],
            Self::GrandCross => &[90.0, 90.0, 90.0, 90.0],
            Self::Kite => &[60.0, 60.0, 120.0, 120.0],
            Self::MysticRectangle => &[60.0, 120.0, 60.0, 120.0],
            Self::GrandQuintile => &[72.0, 72.0, 72.0, 72.0, 72.0],
            Self::GrandSextile => &[60.0, 60.0, 60.0, 60.0, 60.0, 60.0],
        }
    }

    pub fn body_count(self) -> usize {
        self.gaps_deg().len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TSquare => "T-Square",
            Self::GrandTrine => "Grand Trine",
            Self::Yod => "Yod",
            Self::GrandCross => "Grand Cross",
            Self::Kite => "Kite",
            Self::MysticRectangle => "Mystic Rectangle",
            Self::GrandQuintile => "Grand Quintile",
            Self::GrandSextile => "Grand Sextile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternPhase {
    Forms,
    Dissolves,
}

/// What an instantaneous event records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phenomenon", rename_all = "snake_case")]
pub enum Phenomenon {
    Twilight {
        kind: TwilightKind,
        direction: TwilightDirection,
    },
    Ingress {
        body: Body,
        boundary: IngressBoundary,
        motion: Motion,
    },
    Station {
        body: Body,
        station: StationType,
    },
    MaxElongation {
        body: Body,
        side: ElongationSide,
        degrees: f64,
    },
    PeakBrightness {
        body: Body,
    },
    Visibility {
        body: Body,
        phase: VisibilityPhase,
    },
    Aspect {
        first: Body,
        second: Body,
        aspect: AspectKind,
        phase: AspectPhase,
    },
    Pattern {
        pattern: PatternKind,
        /// Participants in longitude order at the event minute.
        bodies: Vec<Body>,
        phase: PatternPhase,
    },
}

impl Phenomenon {
    /// Family name used as the primary category tag.
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Twilight { .. } => "Twilight",
            Self::Ingress { .. } => "Ingress",
            Self::Station { .. } => "Station",
            Self::MaxElongation { .. } => "Elongation",
            Self::PeakBrightness { .. } => "Brightness",
            Self::Visibility { .. } => "Visibility",
            Self::Aspect { .. } => "Aspect",
            Self::Pattern { .. } => "Pattern",
        }
    }

    /// Participating bodies.
    pub fn bodies(&self) -> Vec<Body> {
        match self {
            Self::Twilight { .. } => vec![Body::Sun],
            Self::Ingress { body, .. }
            | Self::Station { body, .. }
            | Self::MaxElongation { body, .. }
            | Self::PeakBrightness { body }
            | Self::Visibility { body, .. } => vec![*body],
            Self::Aspect { first, second, .. } => vec![*first, *second],
            Self::Pattern { bodies, .. } => bodies.clone(),
        }
    }

    /// Short human-readable title.
    pub fn label(&self) -> String {
        match self {
            Self::Twilight { kind, direction } => match (kind, direction) {
                (TwilightKind::Horizon, TwilightDirection::Dawn) => "Sunrise".to_string(),
                (TwilightKind::Horizon, TwilightDirection::Dusk) => "Sunset".to_string(),
                (k, TwilightDirection::Dawn) => format!("{} Dawn", k.name()),
                (k, TwilightDirection::Dusk) => format!("{} Dusk", k.name()),
            },
            Self::Ingress {
                body,
                boundary,
                motion,
            } => {
                let what = match boundary {
                    IngressBoundary::Sign { to, .. } => format!("{body} enters {to}"),
                    IngressBoundary::Decan { to, .. } => format!("{body} enters {to}"),
                    IngressBoundary::Peak { sign } => format!("{body} at peak of {sign}"),
                };
                match motion {
                    Motion::Direct => what,
                    Motion::Retrograde => format!("{what} (retrograde)"),
                }
            }
            Self::Station { body, station } => match station {
                StationType::StationRetrograde => format!("{body} stations retrograde"),
                StationType::StationDirect => format!("{body} stations direct"),
            },
            Self::MaxElongation { body, side, .. } => {
                format!(
                    "{body} greatest {} elongation",
                    side.name().to_lowercase()
                )
            }
            Self::PeakBrightness { body } => format!("{body} peak brightness"),
            Self::Visibility { body, phase } => format!("{body} {}", phase.name()),
            Self::Aspect {
                first,
                second,
                aspect,
                phase,
            } => format!("{first} {aspect} {second} {}", phase.name()),
            Self::Pattern {
                pattern, phase, ..
            } => match phase {
                PatternPhase::Forms => format!("{} forms", pattern.name()),
                PatternPhase::Dissolves => format!("{} dissolves", pattern.name()),
            },
        }
    }

    /// One-sentence explanation.
    pub fn description(&self) -> String {
        match self {
            Self::Twilight { kind, direction } => {
                let verb = match direction {
                    TwilightDirection::Dawn => "rises above",
                    TwilightDirection::Dusk => "sinks below",
                };
                match kind {
                    TwilightKind::Horizon => {
                        format!("The Sun's upper limb {verb} the horizon.")
                    }
                    k => format!(
                        "The Sun's centre {verb} {:.0} deg elevation ({} twilight).",
                        k.elevation_deg(),
                        k.name().to_lowercase()
                    ),
                }
            }
            Self::Ingress {
                body,
                boundary,
                motion,
            } => {
                let moving = match motion {
                    Motion::Direct => "moving direct",
                    Motion::Retrograde => "moving retrograde",
                };
                match boundary {
                    IngressBoundary::Sign { from, to } => {
                        format!("{body} leaves {from} and enters {to}, {moving}.")
                    }
                    IngressBoundary::Decan { from, to } => {
                        format!("{body} leaves the {from} for the {to}, {moving}.")
                    }
                    IngressBoundary::Peak { sign } => {
                        format!("{body} crosses 15 deg {sign}, {moving}.")
                    }
                }
            }
            Self::Station { body, station } => match station {
                StationType::StationRetrograde => {
                    format!("{body} appears to stop and begins moving backwards.")
                }
                StationType::StationDirect => {
                    format!("{body} appears to stop and resumes forward motion.")
                }
            },
            Self::MaxElongation {
                body,
                side,
                degrees,
            } => {
                let dir = match side {
                    ElongationSide::Morning => "west",
                    ElongationSide::Evening => "east",
                };
                format!("{body} reaches {degrees:.1} deg {dir} of the Sun.")
            }
            Self::PeakBrightness { body } => {
                format!("{body} is at its brightest for this apparition.")
            }
            Self::Visibility { body, phase } => match phase {
                VisibilityPhase::MorningRise => {
                    format!("{body} clears the Sun's glare in the morning sky.")
                }
                VisibilityPhase::MorningSet => {
                    format!("{body} is lost in the Sun's glare in the morning sky.")
                }
                VisibilityPhase::EveningRise => {
                    format!("{body} clears the Sun's glare in the evening sky.")
                }
                VisibilityPhase::EveningSet => {
                    format!("{body} is lost in the Sun's glare in the evening sky.")
                }
            },
            Self::Aspect {
                first,
                second,
                aspect,
                phase,
            } => {
                let angle = aspect.angle_deg();
                match phase {
                    AspectPhase::Begins => format!(
                        "{first} and {second} come within orb of a {angle:.1} deg {aspect}."
                    ),
                    AspectPhase::Applying => {
                        format!("{first} and {second} start closing on an exact {aspect}.")
                    }
                    AspectPhase::Exact => {
                        format!("{first} and {second} are {angle:.1} deg apart.")
                    }
                    AspectPhase::Ends => {
                        format!("{first} and {second} leave the orb of their {aspect}.")
                    }
                }
            }
            Self::Pattern {
                pattern,
                bodies,
                phase,
            } => {
                let names = join_bodies(bodies);
                match phase {
                    PatternPhase::Forms => format!("{names} form a {}.", pattern.name()),
                    PatternPhase::Dissolves => {
                        format!("The {} of {names} dissolves.", pattern.name())
                    }
                }
            }
        }
    }

    /// Tag set: family, qualifiers and participating bodies.
    pub fn categories(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = self
            .bodies()
            .into_iter()
            .map(|b| b.name().to_string())
            .collect();
        tags.insert(self.family().to_string());
        let qualifiers: Vec<&str> = match self {
            Self::Twilight { kind, direction } => vec![
                kind.name(),
                match direction {
                    TwilightDirection::Dawn => "Dawn",
                    TwilightDirection::Dusk => "Dusk",
                },
            ],
            Self::Ingress {
                boundary, motion, ..
            } => vec![boundary.name(), motion_name(*motion)],
            Self::Station { station, .. } => vec![match station {
                StationType::StationRetrograde => "Retrograde",
                StationType::StationDirect => "Direct",
            }],
            Self::MaxElongation { side, .. } => vec![side.name()],
            Self::PeakBrightness { .. } => vec![],
            Self::Visibility { phase, .. } => vec![phase.name()],
            Self::Aspect { aspect, phase, .. } => vec![aspect.name(), phase.name()],
            Self::Pattern { pattern, phase, .. } => vec![
                pattern.name(),
                match phase {
                    PatternPhase::Forms => "Forms",
                    PatternPhase::Dissolves => "Dissolves",
                },
            ],
        };
        tags.extend(qualifiers.into_iter().map(str::to_string));
        tags
    }
}

fn motion_name(m: Motion) -> &'static str {
    match m {
        Motion::Direct => "Direct",
        Motion::Retrograde => "Retrograde",
    }
}

fn join_bodies(bodies: &[Body]) -> String {
    bodies
        .iter()
        .map(|b| b.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A point-in-time event. Its end equals its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantEvent {
    pub at: Minute,
    pub phenomenon: Phenomenon,
    pub label: String,
    pub description: String,
}

impl InstantEvent {
    pub fn new(at: Minute, phenomenon: Phenomenon) -> Self {
        Self {
            at,
            label: phenomenon.label(),
            description: phenomenon.description(),
            phenomenon,
        }
    }

    pub fn end(&self) -> Minute {
        self.at
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.phenomenon.categories()
    }
}

impl Display for InstantEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  {}", self.at, self.label)
    }
}

/// The grouping key of a duration: the thing that is "on" between a
/// beginning and an ending event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum DurationSubject {
    /// Station retrograde to station direct, per body.
    Retrograde { body: Body },
    /// Dawn to dusk of the given kind.
    Light { kind: TwilightKind },
    /// Astronomical dusk to astronomical dawn.
    Night,
    MorningStar { body: Body },
    EveningStar { body: Body },
    /// Time spent in one sign between two sign ingresses.
    SignTransit { body: Body, sign: Sign },
    /// Aspect begins to aspect ends.
    AspectOrb {
        first: Body,
        second: Body,
        aspect: AspectKind,
    },
    /// Pattern forms to pattern dissolves; bodies sorted by [`Body`] order.
    Pattern {
        pattern: PatternKind,
        bodies: Vec<Body>,
    },
}

impl DurationSubject {
    pub fn label(&self) -> String {
        match self {
            Self::Retrograde { body } => format!("{body} Retrograde"),
            Self::Light { kind } => match kind {
                TwilightKind::Horizon => "Day".to_string(),
                TwilightKind::Civil => "Daylight".to_string(),
                k => format!("{} Light", k.name()),
            },
            Self::Night => "Night".to_string(),
            Self::MorningStar { body } => format!("{body} Morning Star"),
            Self::EveningStar { body } => format!("{body} Evening Star"),
            Self::SignTransit { body, sign } => format!("{body} in {sign}"),
            Self::AspectOrb {
                first,
                second,
                aspect,
            } => format!("{first} {aspect} {second}"),
            Self::Pattern { pattern, bodies } => {
                format!("{} ({})", pattern.name(), join_bodies(bodies))
            }
        }
    }

    pub fn bodies(&self) -> Vec<Body> {
        match self {
            Self::Light { .. } | Self::Night => vec![Body::Sun],
            Self::Retrograde { body }
            | Self::MorningStar { body }
            | Self::EveningStar { body }
            | Self::SignTransit { body, .. } => vec![*body],
            Self::AspectOrb { first, second, .. } => vec![*first, *second],
            Self::Pattern { bodies, .. } => bodies.clone(),
        }
    }

    pub fn categories(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = self
            .bodies()
            .into_iter()
            .map(|b| b.name().to_string())
            .collect();
        let qualifiers: Vec<String> = match self {
            Self::Retrograde { .. } => vec!["Retrograde".into()],
            Self::Light { kind } => vec!["Light".into(), kind.name().into()],
            Self::Night => vec!["Night".into()],
            Self::MorningStar { .. } => vec!["Visibility".into(), "Morning".into()],
            Self::EveningStar { .. } => vec!["Visibility".into(), "Evening".into()],
            Self::SignTransit { sign, .. } => vec!["Sign".into(), sign.name().into()],
            Self::AspectOrb { aspect, .. } => vec!["Aspect".into(), aspect.name().into()],
            Self::Pattern { pattern, .. } => vec!["Pattern".into(), pattern.name().into()],
        };
        tags.extend(qualifiers);
        tags
    }
}

impl Display for DurationSubject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Whether an event opens or closes a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Begins,
    Ends,
}

/// An interval between a beginning and an ending event, `end > start`.
///
/// Only produced by the synthesizer; fields are read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationEvent {
    start: Minute,
    end: Minute,
    subject: DurationSubject,
    label: String,
    categories: BTreeSet<String>,
}

impl DurationEvent {
    /// `None` unless `end > start`.
    pub(crate) fn new(start: Minute, end: Minute, subject: DurationSubject) -> Option<Self> {
        (end > start).then(|| Self {
            start,
            end,
            label: subject.label(),
            categories: subject.categories(),
            subject,
        })
    }

    pub fn start(&self) -> Minute {
        self.start
    }

    pub fn end(&self) -> Minute {
        self.end
    }

    pub fn subject(&self) -> &DurationSubject {
        &self.subject
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Length in minutes.
    pub fn minutes(&self) -> i64 {
        self.end - self.start
    }
}

impl Display for DurationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}  {}", self.start, self.end, self.label)
    }
}
