//! The detector family.
//!
//! Each detector is a pure function of one or two [`DetectionWindow`]s and
//! returns the events for the window's minute. An incomplete window (missing
//! sample, missing field, non-finite value) yields no event; detectors never
//! fail.
//!
//! [`DetectionWindow`]: crate::window::DetectionWindow

pub mod aspect;
pub mod extremum;
pub mod ingress;
pub mod pattern;
pub mod station;
pub mod threshold;
pub mod twilight;
pub mod visibility;

pub use aspect::{aspect_deviation, classify_aspect, detect_aspects};
pub use extremum::{detect_max_elongation, detect_peak_brightness};
pub use ingress::detect_ingress;
pub use pattern::{LongitudeStep, detect_patterns, matches_pattern};
pub use station::{classify_station, detect_station};
pub use threshold::{CrossingDirection, LongitudeCrossing, longitude_crossings, scalar_crossing};
pub use twilight::detect_twilight;
pub use visibility::detect_visibility;
