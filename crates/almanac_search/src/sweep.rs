//! Minute-by-minute sweep over a closed range.
//!
//! The sweep only schedules: it walks the range one day at a time, copies
//! each tracked body's cached samples for that day (plus the margin) into a
//! dense [`BodyTrack`], then hands per-minute windows to the enabled
//! detectors. It reads the store and never writes to it.

use std::collections::{BTreeMap, HashMap};

use almanac_config::AlmanacConfig;
use almanac_core::{Body, FieldSet, Minute, MinuteRange, SampleField};
use almanac_ephem::{EphemerisStore, FetchRequest, PositionSource};
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::detect;
use crate::error::SearchError;
use crate::event::InstantEvent;
use crate::window::{BodyTrack, DetectionWindow};

const LONGITUDE: FieldSet = FieldSet::of(&[SampleField::Longitude]);
const ELEVATION: FieldSet = FieldSet::of(&[SampleField::Elevation]);
const BRIGHTNESS: FieldSet = FieldSet::of(&[SampleField::Illumination, SampleField::Distance]);

/// Minutes between progress log lines.
const PROGRESS_EVERY_MINUTES: i64 = 1440;
/// Minutes covered by one set of dense tracks.
const CHUNK_MINUTES: usize = 1440;

/// A configured sweep. Cheap to construct; holds no samples.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: AlmanacConfig,
}

impl Sweep {
    /// Validate `config` and prepare a sweep. Duplicate bodies in the
    /// per-family lists are dropped, keeping the first occurrence.
    pub fn new(config: &AlmanacConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let mut config = config.clone();
        let b = &mut config.bodies;
        for list in [
            &mut b.ingress,
            &mut b.stations,
            &mut b.aspects,
            &mut b.patterns,
            &mut b.brightness,
            &mut b.visibility,
        ] {
            *list = list.iter().copied().unique().collect();
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlmanacConfig {
        &self.config
    }

    /// Samples needed each side of the current minute. Station and
    /// extremum detectors use the configured margin; everything else needs
    /// one neighbour.
    pub fn margin(&self) -> usize {
        self.config.sweep.margin_minutes.max(1)
    }

    /// Fields each tracked body needs for the enabled detectors.
    pub fn required_fields(&self) -> BTreeMap<Body, FieldSet> {
        let d = &self.config.detectors;
        let b = &self.config.bodies;
        let mut need: BTreeMap<Body, FieldSet> = BTreeMap::new();
        let mut add = |body: Body, fields: FieldSet| {
            let e = need.entry(body).or_default();
            *e = e.union(fields);
        };

        if d.twilight {
            add(Body::Sun, ELEVATION);
        }
        if d.ingress {
            b.ingress.iter().for_each(|&x| add(x, LONGITUDE));
        }
        if d.stations {
            b.stations.iter().for_each(|&x| add(x, LONGITUDE));
        }
        if (d.elongation || d.visibility) && !b.visibility.is_empty() {
            b.visibility.iter().for_each(|&x| add(x, LONGITUDE));
            add(Body::Sun, LONGITUDE);
        }
        if d.brightness {
            b.brightness.iter().for_each(|&x| add(x, BRIGHTNESS));
        }
        if d.aspects {
            b.aspects.iter().for_each(|&x| add(x, LONGITUDE));
        }
        if d.patterns {
            b.patterns.iter().for_each(|&x| add(x, LONGITUDE));
        }
        need
    }

    /// Fetch requests covering `[start - margin, end + margin]` for every
    /// tracked body.
    pub fn plan(&self, range: MinuteRange) -> Result<Vec<FetchRequest>, SearchError> {
        check_range(range)?;
        let span = range.expand(self.margin() as i64);
        Ok(self
            .required_fields()
            .into_iter()
            .map(|(body, fields)| FetchRequest::new(body, span, fields))
            .collect())
    }

    /// Run every enabled detector over each minute of `range`, in order.
    ///
    /// The store should already hold the planned samples; anything missing
    /// just makes the affected windows incomplete. Cancellation is checked
    /// before each minute. Tracks are rebuilt per day, so memory stays
    /// bounded however long the range is.
    pub fn run<S: PositionSource>(
        &self,
        store: &EphemerisStore<S>,
        range: MinuteRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<InstantEvent>, SearchError> {
        self.run_chunked(store, range, cancel, CHUNK_MINUTES)
    }

    fn run_chunked<S: PositionSource>(
        &self,
        store: &EphemerisStore<S>,
        range: MinuteRange,
        cancel: &CancellationToken,
        chunk_minutes: usize,
    ) -> Result<Vec<InstantEvent>, SearchError> {
        check_range(range)?;
        let bodies: Vec<Body> = self.required_fields().into_keys().collect();
        let margin = self.margin() as i64;
        info!(
            start = %range.start,
            end = %range.end,
            minutes = range.len(),
            bodies = bodies.len(),
            "sweep started"
        );

        let mut events = Vec::new();
        for chunk in range.chunks(chunk_minutes) {
            let span = chunk.expand(margin);
            let tracks: HashMap<Body, BodyTrack> = bodies
                .iter()
                .map(|&body| (body, BodyTrack::from_series(body, store.series(body), span)))
                .collect();
            for at in chunk.iter() {
                if cancel.is_cancelled() {
                    info!(at = %at, "sweep cancelled");
                    return Err(SearchError::Cancelled { at });
                }
                self.detect_minute(&tracks, at, &mut events);
                if (at - range.start) % PROGRESS_EVERY_MINUTES == 0 {
                    debug!(at = %at, events = events.len(), "sweep progress");
                }
            }
        }

        info!(events = events.len(), "sweep finished");
        Ok(events)
    }

    /// Every detector for one minute, appended in detector order.
    fn detect_minute(
        &self,
        tracks: &HashMap<Body, BodyTrack>,
        at: Minute,
        out: &mut Vec<InstantEvent>,
    ) {
        let d = &self.config.detectors;
        let b = &self.config.bodies;
        let margin = self.config.sweep.margin_minutes;
        let width = self.margin();
        let window = |body: Body| tracks.get(&body).and_then(|t| t.window(at, width));
        let sun = window(Body::Sun);

        if d.twilight
            && let Some(sun) = &sun
        {
            out.extend(detect::detect_twilight(sun));
        }
        if d.ingress {
            for w in b.ingress.iter().filter_map(|&x| window(x)) {
                out.extend(detect::detect_ingress(&w));
            }
        }
        if d.stations {
            for w in b.stations.iter().filter_map(|&x| window(x)) {
                out.extend(detect::detect_station(&w, margin));
            }
        }
        if d.elongation
            && let Some(sun) = &sun
        {
            for w in b.visibility.iter().filter_map(|&x| window(x)) {
                out.extend(detect::detect_max_elongation(&w, sun, margin));
            }
        }
        if d.brightness {
            for w in b.brightness.iter().filter_map(|&x| window(x)) {
                out.extend(detect::detect_peak_brightness(&w, margin));
            }
        }
        if d.visibility
            && let Some(sun) = &sun
        {
            for w in b.visibility.iter().filter_map(|&x| window(x)) {
                let threshold = self.config.visibility.threshold_for(w.body());
                out.extend(detect::detect_visibility(&w, sun, threshold));
            }
        }
        if d.aspects {
            let windows: Vec<DetectionWindow<'_>> =
                b.aspects.iter().filter_map(|&x| window(x)).collect();
            for (first, second) in windows.iter().tuple_combinations() {
                out.extend(detect::detect_aspects(first, second, &self.config.aspects));
            }
        }
        if d.patterns {
            let steps: Vec<detect::LongitudeStep> = b
                .patterns
                .iter()
                .filter_map(|&x| {
                    let (prev, cur) = window(x)?.step(|s| s.longitude)?;
                    Some(detect::LongitudeStep { body: x, prev, cur })
                })
                .collect();
            out.extend(detect::detect_patterns(
                at,
                &steps,
                self.config.aspects.pattern_orb_deg,
            ));
        }
    }
}

fn check_range(range: MinuteRange) -> Result<(), SearchError> {
    if range.end < range.start {
        return Err(SearchError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}
