//! Tracked bodies and the groups each detector family draws from.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A tracked celestial object.
///
/// Luminaries, planets, the main-belt asteroids plus Chiron, and the lunar
/// nodes. Which subset a detector looks at is decided by the group constants
/// below, not by the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Ceres,
    Pallas,
    Juno,
    Vesta,
    Chiron,
    NorthNode,
    SouthNode,
}

/// Every body, in declaration order.
pub const ALL_BODIES: [Body; 17] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
    Body::Ceres,
    Body::Pallas,
    Body::Juno,
    Body::Vesta,
    Body::Chiron,
    Body::NorthNode,
    Body::SouthNode,
];

/// Bodies inside Earth's orbit: visibility phases and greatest elongation.
pub const INNER_PLANETS: [Body; 2] = [Body::Mercury, Body::Venus];

/// Bodies that show geocentric retrograde loops.
///
/// Sun and Moon never reverse; the nodes are excluded because the mean node
/// is permanently retrograde.
pub const STATION_BODIES: [Body; 13] = [
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
    Body::Ceres,
    Body::Pallas,
    Body::Juno,
    Body::Vesta,
    Body::Chiron,
];

/// Bodies paired against each other by the aspect detector.
pub const ASPECT_BODIES: [Body; 10] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
];

/// Bodies whose apparent brightness is tracked for peaks.
pub const BRIGHTNESS_BODIES: [Body; 4] = [Body::Mercury, Body::Venus, Body::Mars, Body::Jupiter];

/// Bodies followed through sign, decan and peak boundaries.
pub const INGRESS_BODIES: [Body; 17] = ALL_BODIES;

impl Body {
    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
            Self::Ceres => "Ceres",
            Self::Pallas => "Pallas",
            Self::Juno => "Juno",
            Self::Vesta => "Vesta",
            Self::Chiron => "Chiron",
            Self::NorthNode => "North Node",
            Self::SouthNode => "South Node",
        }
    }

    /// NAIF-style numeric code. The nodes have no NAIF id and use
    /// negative sentinels.
    pub const fn code(self) -> i32 {
        match self {
            Self::Sun => 10,
            Self::Moon => 301,
            Self::Mercury => 199,
            Self::Venus => 299,
            Self::Mars => 499,
            Self::Jupiter => 599,
            Self::Saturn => 699,
            Self::Uranus => 799,
            Self::Neptune => 899,
            Self::Pluto => 999,
            Self::Ceres => 2_000_001,
            Self::Pallas => 2_000_002,
            Self::Juno => 2_000_003,
            Self::Vesta => 2_000_004,
            Self::Chiron => 2_002_060,
            Self::NorthNode => -1,
            Self::SouthNode => -2,
        }
    }

    /// Convert a numeric code back into a [`Body`].
    pub fn from_code(code: i32) -> Option<Self> {
        ALL_BODIES.iter().copied().find(|b| b.code() == code)
    }

    /// Whether this body orbits inside Earth's orbit.
    pub fn is_inner(self) -> bool {
        INNER_PLANETS.contains(&self)
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a body name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBodyError(pub String);

impl Display for ParseBodyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown body: {}", self.0)
    }
}

impl std::error::Error for ParseBodyError {}

impl FromStr for Body {
    type Err = ParseBodyError;

    /// Case-insensitive; spaces, dashes and underscores are ignored so
    /// "north node", "north_node" and "NorthNode" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ALL_BODIES
            .iter()
            .copied()
            .find(|b| {
                b.name()
                    .chars()
                    .filter(|c| *c != ' ')
                    .map(|c| c.to_ascii_lowercase())
                    .eq(key.chars())
            })
            .ok_or_else(|| ParseBodyError(s.to_string()))
    }
}
