//! Shared vocabulary of the almanac engine.
//!
//! This crate provides:
//! - [`Body`] identifiers and the body groups each detector family draws from
//! - [`Minute`] timestamps and inclusive [`MinuteRange`]s
//! - [`Sample`]s with independently optional fields and field-level merge
//! - Zodiac signs and decans, aspect angle classes
//! - Angle normalization and local-extremum predicates used by the detectors

pub mod angle;
pub mod aspect;
pub mod body;
pub mod extremum;
pub mod location;
pub mod sample;
pub mod time;
pub mod zodiac;

pub use angle::{normalize_360, normalize_to_pm180, separation_deg, signed_delta_deg, unwrap_near};
pub use aspect::{ALL_ASPECTS, AspectKind, MAJOR_ASPECTS};
pub use body::{
    ALL_BODIES, ASPECT_BODIES, BRIGHTNESS_BODIES, Body, INGRESS_BODIES, INNER_PLANETS,
    ParseBodyError, STATION_BODIES,
};
pub use extremum::{is_local_max, is_local_min};
pub use location::GeoLocation;
pub use sample::{ALL_FIELDS, FieldSet, Sample, SampleField};
pub use time::{Minute, MinuteRange};
pub use zodiac::{ALL_SIGNS, DECAN_SPAN_DEG, Decan, SIGN_SPAN_DEG, Sign};
