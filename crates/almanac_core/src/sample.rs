//! Positional samples with independently optional fields.
//!
//! A sample may be assembled from several fetches (longitude from one call,
//! illumination from another), so every field is optional and [`Sample::merge`]
//! upserts field by field.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// One field of a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleField {
    Longitude,
    Latitude,
    Azimuth,
    Elevation,
    Illumination,
    AngularDiameter,
    Distance,
}

/// All fields in declaration order.
pub const ALL_FIELDS: [SampleField; 7] = [
    SampleField::Longitude,
    SampleField::Latitude,
    SampleField::Azimuth,
    SampleField::Elevation,
    SampleField::Illumination,
    SampleField::AngularDiameter,
    SampleField::Distance,
];

impl SampleField {
    const fn bit(self) -> u8 {
        match self {
            Self::Longitude => 1 << 0,
            Self::Latitude => 1 << 1,
            Self::Azimuth => 1 << 2,
            Self::Elevation => 1 << 3,
            Self::Illumination => 1 << 4,
            Self::AngularDiameter => 1 << 5,
            Self::Distance => 1 << 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Longitude => "longitude",
            Self::Latitude => "latitude",
            Self::Azimuth => "azimuth",
            Self::Elevation => "elevation",
            Self::Illumination => "illumination",
            Self::AngularDiameter => "angular_diameter",
            Self::Distance => "distance",
        }
    }
}

/// Compact set of [`SampleField`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const EMPTY: FieldSet = FieldSet(0);

    pub const fn of(fields: &[SampleField]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < fields.len() {
            bits |= fields[i].bit();
            i += 1;
        }
        FieldSet(bits)
    }

    pub const fn with(self, field: SampleField) -> Self {
        FieldSet(self.0 | field.bit())
    }

    pub const fn union(self, other: FieldSet) -> Self {
        FieldSet(self.0 | other.0)
    }

    pub const fn contains(self, field: SampleField) -> bool {
        self.0 & field.bit() != 0
    }

    /// Whether every field of `other` is in `self`.
    pub const fn is_superset(self, other: FieldSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SampleField> {
        ALL_FIELDS.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<SampleField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = SampleField>>(iter: I) -> Self {
        iter.into_iter().fold(FieldSet::EMPTY, FieldSet::with)
    }
}

impl Display for FieldSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(SampleField::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Positional and physical data for one body at one minute.
///
/// Angles are in degrees; distance in astronomical units; illumination is
/// the illuminated fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illumination: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Sample {
    /// Sample carrying only an ecliptic longitude.
    pub fn with_longitude(longitude: f64) -> Self {
        Self {
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    /// Sample carrying only an elevation above the horizon.
    pub fn with_elevation(elevation: f64) -> Self {
        Self {
            elevation: Some(elevation),
            ..Self::default()
        }
    }

    pub fn get(&self, field: SampleField) -> Option<f64> {
        match field {
            SampleField::Longitude => self.longitude,
            SampleField::Latitude => self.latitude,
            SampleField::Azimuth => self.azimuth,
            SampleField::Elevation => self.elevation,
            SampleField::Illumination => self.illumination,
            SampleField::AngularDiameter => self.angular_diameter,
            SampleField::Distance => self.distance,
        }
    }

    pub fn set(&mut self, field: SampleField, value: Option<f64>) {
        let slot = match field {
            SampleField::Longitude => &mut self.longitude,
            SampleField::Latitude => &mut self.latitude,
            SampleField::Azimuth => &mut self.azimuth,
            SampleField::Elevation => &mut self.elevation,
            SampleField::Illumination => &mut self.illumination,
            SampleField::AngularDiameter => &mut self.angular_diameter,
            SampleField::Distance => &mut self.distance,
        };
        *slot = value;
    }

    /// Fields holding a finite value.
    pub fn fields(&self) -> FieldSet {
        ALL_FIELDS
            .into_iter()
            .filter(|f| self.get(*f).is_some_and(f64::is_finite))
            .collect()
    }

    /// Whether every field in `required` holds a finite value.
    pub fn has_all(&self, required: FieldSet) -> bool {
        self.fields().is_superset(required)
    }

    /// Field-level upsert: finite fields in `incoming` replace the cached
    /// value; absent or non-finite fields leave the cached value untouched.
    ///
    /// Returns `true` if any field changed. Merging the same sample twice is
    /// a no-op the second time.
    pub fn merge(&mut self, incoming: &Sample) -> bool {
        let mut changed = false;
        for field in ALL_FIELDS {
            if let Some(v) = incoming.get(field).filter(|v| v.is_finite())
                && self.get(field).map(f64::to_bits) != Some(v.to_bits())
            {
                self.set(field, Some(v));
                changed = true;
            }
        }
        changed
    }

    /// Copy holding only the fields in `fields`.
    pub fn project(&self, fields: FieldSet) -> Sample {
        let mut out = Sample::default();
        for field in fields.iter() {
            out.set(field, self.get(field));
        }
        out
    }

    /// Brightness proxy `illumination / distance²`.
    pub fn brightness(&self) -> Option<f64> {
        let illum = self.illumination?;
        let dist = self.distance?;
        if dist <= 0.0 {
            return None;
        }
        let b = illum / (dist * dist);
        b.is_finite().then_some(b)
    }
}
