//! Per-body ordered mapping from minute to sample.

use std::collections::BTreeMap;

use almanac_core::{Body, FieldSet, Minute, MinuteRange, Sample};

/// Time-ordered samples for one body.
///
/// Grows monotonically during a run: minutes are added and fields merged,
/// nothing is ever removed.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSeries {
    body: Body,
    samples: BTreeMap<Minute, Sample>,
}

impl EphemerisSeries {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            samples: BTreeMap::new(),
        }
    }

    pub fn body(&self) -> Body {
        self.body
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, at: Minute) -> Option<&Sample> {
        self.samples.get(&at)
    }

    /// Field-level upsert at `at`. Returns `true` if anything changed.
    pub fn merge(&mut self, at: Minute, incoming: &Sample) -> bool {
        match self.samples.get_mut(&at) {
            Some(cached) => cached.merge(incoming),
            None => {
                let mut fresh = Sample::default();
                let changed = fresh.merge(incoming);
                if changed {
                    self.samples.insert(at, fresh);
                }
                changed
            }
        }
    }

    /// Samples within `range`, in time order.
    pub fn range(&self, range: MinuteRange) -> impl Iterator<Item = (Minute, &Sample)> {
        self.samples.range(range.start..=range.end).map(|(m, s)| (*m, s))
    }

    /// Whether every minute of `range` carries every field in `fields`.
    pub fn covers(&self, range: MinuteRange, fields: FieldSet) -> bool {
        self.missing_ranges(range, fields).is_empty()
    }

    /// Maximal contiguous sub-ranges of `range` whose minutes are absent or
    /// lack one of `fields`.
    pub fn missing_ranges(&self, range: MinuteRange, fields: FieldSet) -> Vec<MinuteRange> {
        let mut missing = Vec::new();
        let mut open: Option<Minute> = None;
        let mut cursor = range.start;

        let mut close = |open: &mut Option<Minute>, end: Minute| {
            if let Some(start) = open.take() {
                missing.push(MinuteRange { start, end });
            }
        };

        for (at, sample) in self.samples.range(range.start..=range.end) {
            if *at > cursor {
                // gap of absent minutes before this sample
                open.get_or_insert(cursor);
            }
            if sample.has_all(fields) {
                close(&mut open, *at - 1);
            } else {
                open.get_or_insert(*at);
            }
            cursor = *at + 1;
        }
        if cursor <= range.end {
            open.get_or_insert(cursor);
        }
        close(&mut open, range.end);
        missing
    }
}
