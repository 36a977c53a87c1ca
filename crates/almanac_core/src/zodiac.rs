//! Tropical zodiac signs and decans.
//!
//! The ecliptic circle is divided into 12 equal signs of 30 degrees each,
//! starting from Aries at 0 degrees. Each sign splits into three 10-degree
//! decans.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::angle::normalize_360;

/// Width of a sign in degrees.
pub const SIGN_SPAN_DEG: f64 = 30.0;
/// Width of a decan in degrees.
pub const DECAN_SPAN_DEG: f64 = 10.0;

/// The 12 signs starting from Aries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// All 12 signs in order (0 = Aries, 11 = Pisces).
pub const ALL_SIGNS: [Sign; 12] = [
    Sign::Aries,
    Sign::Taurus,
    Sign::Gemini,
    Sign::Cancer,
    Sign::Leo,
    Sign::Virgo,
    Sign::Libra,
    Sign::Scorpio,
    Sign::Sagittarius,
    Sign::Capricorn,
    Sign::Aquarius,
    Sign::Pisces,
];

impl Sign {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    /// 0-based index (Aries=0 .. Pisces=11).
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Sign for an index, wrapping modulo 12.
    pub fn from_index(index: i64) -> Self {
        ALL_SIGNS[index.rem_euclid(12) as usize]
    }

    /// Sign containing an ecliptic longitude.
    pub fn from_longitude(lon_deg: f64) -> Self {
        let idx = (normalize_360(lon_deg) / SIGN_SPAN_DEG).floor() as i64;
        Self::from_index(idx)
    }

    /// Longitude of the sign's first degree.
    pub fn start_deg(self) -> f64 {
        f64::from(self.index()) * SIGN_SPAN_DEG
    }

    pub fn next(self) -> Self {
        Self::from_index(i64::from(self.index()) + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(i64::from(self.index()) - 1)
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the 36 decans: a sign plus its third (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Decan {
    pub sign: Sign,
    /// 1-based position within the sign.
    pub number: u8,
}

impl Decan {
    /// Decan for an absolute index 0..36, wrapping.
    pub fn from_index(index: i64) -> Self {
        let idx = index.rem_euclid(36);
        Self {
            sign: Sign::from_index(idx / 3),
            number: (idx % 3) as u8 + 1,
        }
    }

    /// Decan containing an ecliptic longitude.
    pub fn from_longitude(lon_deg: f64) -> Self {
        Self::from_index((normalize_360(lon_deg) / DECAN_SPAN_DEG).floor() as i64)
    }
}

impl Display for Decan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ordinal = match self.number {
            1 => "1st",
            2 => "2nd",
            _ => "3rd",
        };
        write!(f, "{ordinal} decan of {}", self.sign)
    }
}
