//! Aspect angle classes.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// An angular relationship between two longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    SemiSextile,
    Novile,
    SemiSquare,
    Septile,
    Sextile,
    Quintile,
    Square,
    Trine,
    Sesquiquadrate,
    BiQuintile,
    Quincunx,
    Opposition,
}

/// Ptolemaic aspects.
pub const MAJOR_ASPECTS: [AspectKind; 5] = [
    AspectKind::Conjunction,
    AspectKind::Sextile,
    AspectKind::Square,
    AspectKind::Trine,
    AspectKind::Opposition,
];

/// Every aspect, ordered by angle.
pub const ALL_ASPECTS: [AspectKind; 13] = [
    AspectKind::Conjunction,
    AspectKind::SemiSextile,
    AspectKind::Novile,
    AspectKind::SemiSquare,
    AspectKind::Septile,
    AspectKind::Sextile,
    AspectKind::Quintile,
    AspectKind::Square,
    AspectKind::Trine,
    AspectKind::Sesquiquadrate,
    AspectKind::BiQuintile,
    AspectKind::Quincunx,
    AspectKind::Opposition,
];

impl AspectKind {
    /// Target separation in degrees, within [0, 180].
    pub fn angle_deg(self) -> f64 {
        match self {
            Self::Conjunction => 0.0,
            Self::SemiSextile => 30.0,
            Self::Novile => 40.0,
            Self::SemiSquare => 45.0,
            Self::Septile => 360.0 / 7.0,
            Self::Sextile => 60.0,
            Self::Quintile => 72.0,
            Self::Square => 90.0,
            Self::Trine => 120.0,
            Self::Sesquiquadrate => 135.0,
            Self::BiQuintile => 144.0,
            Self::Quincunx => 150.0,
            Self::Opposition => 180.0,
        }
    }

    /// Default orb in degrees.
    pub fn default_orb_deg(self) -> f64 {
        match self {
            Self::Conjunction | Self::Opposition => 8.0,
            Self::Square | Self::Trine => 6.0,
            Self::Sextile => 4.0,
            Self::Quincunx | Self::SemiSextile | Self::SemiSquare | Self::Sesquiquadrate => 2.0,
            Self::Quintile | Self::BiQuintile => 1.5,
            Self::Septile | Self::Novile => 1.0,
        }
    }

    pub fn is_major(self) -> bool {
        MAJOR_ASPECTS.contains(&self)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Conjunction => "Conjunction",
            Self::SemiSextile => "Semi-sextile",
            Self::Novile => "Novile",
            Self::SemiSquare => "Semi-square",
            Self::Septile => "Septile",
            Self::Sextile => "Sextile",
            Self::Quintile => "Quintile",
            Self::Square => "Square",
            Self::Trine => "Trine",
            Self::Sesquiquadrate => "Sesquiquadrate",
            Self::BiQuintile => "Bi-quintile",
            Self::Quincunx => "Quincunx",
            Self::Opposition => "Opposition",
        }
    }
}

impl Display for AspectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
