//! Per-body sample arenas and the detection windows sliced from them.
//!
//! A [`BodyTrack`] holds one `Option<Sample>` slot per minute over the span
//! the sweep needs, so a window is a plain slice and costs no lookups.
//! Completeness is decided by typed extraction: [`DetectionWindow::scalar`]
//! yields a [`ScalarWindow`] only when every slot in the requested span is
//! present and the extractor returns a finite value.

use almanac_core::{Body, Minute, MinuteRange, Sample};
use almanac_ephem::EphemerisSeries;

/// Dense per-minute samples for one body.
#[derive(Debug, Clone)]
pub struct BodyTrack {
    body: Body,
    origin: Minute,
    slots: Vec<Option<Sample>>,
}

impl BodyTrack {
    /// Copy the cached samples of `span` out of `series`.
    pub fn from_series(body: Body, series: Option<&EphemerisSeries>, span: MinuteRange) -> Self {
        let mut slots = vec![None; span.len()];
        if let Some(series) = series {
            for (at, sample) in series.range(span) {
                slots[(at - span.start) as usize] = Some(*sample);
            }
        }
        Self {
            body,
            origin: span.start,
            slots,
        }
    }

    /// Build from explicit `(minute, sample)` pairs; minutes outside `span`
    /// are ignored.
    pub fn from_samples(
        body: Body,
        span: MinuteRange,
        samples: impl IntoIterator<Item = (Minute, Sample)>,
    ) -> Self {
        let mut slots = vec![None; span.len()];
        for (at, sample) in samples {
            if span.contains(at) {
                slots[(at - span.start) as usize] = Some(sample);
            }
        }
        Self {
            body,
            origin: span.start,
            slots,
        }
    }

    pub fn body(&self) -> Body {
        self.body
    }

    pub fn sample(&self, at: Minute) -> Option<&Sample> {
        self.index(at).and_then(|i| self.slots[i].as_ref())
    }

    /// Window of `margin` slots each side of `at`.
    ///
    /// `None` only when the window would run past the arena; missing samples
    /// inside the arena show up at extraction time.
    pub fn window(&self, at: Minute, margin: usize) -> Option<DetectionWindow<'_>> {
        let centre = self.index(at)?;
        let lo = centre.checked_sub(margin)?;
        let hi = centre + margin;
        (hi < self.slots.len()).then(|| DetectionWindow {
            body: self.body,
            at,
            margin,
            slots: &self.slots[lo..=hi],
        })
    }

    fn index(&self, at: Minute) -> Option<usize> {
        let offset = at - self.origin;
        (offset >= 0 && (offset as usize) < self.slots.len()).then_some(offset as usize)
    }
}

/// Borrowed slice of a [`BodyTrack`] centred on the current minute.
#[derive(Debug, Clone, Copy)]
pub struct DetectionWindow<'a> {
    body: Body,
    at: Minute,
    margin: usize,
    slots: &'a [Option<Sample>],
}

impl<'a> DetectionWindow<'a> {
    pub fn body(&self) -> Body {
        self.body
    }

    /// The current minute.
    pub fn at(&self) -> Minute {
        self.at
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn current(&self) -> Option<&'a Sample> {
        self.slots[self.margin].as_ref()
    }

    /// Slot at `offset` minutes from the current one.
    fn slot(&self, offset: isize) -> Option<&'a Sample> {
        let idx = self.margin as isize + offset;
        if idx < 0 {
            return None;
        }
        self.slots.get(idx as usize).and_then(Option::as_ref)
    }

    /// `before` samples back and `after` samples ahead, mapped through `f`.
    pub fn scalar_span(
        &self,
        before: usize,
        after: usize,
        f: impl Fn(&Sample) -> Option<f64>,
    ) -> Option<ScalarWindow> {
        if before > self.margin || after > self.margin {
            return None;
        }
        let mut values = Vec::with_capacity(before + after + 1);
        for offset in -(before as isize)..=(after as isize) {
            let v = f(self.slot(offset)?)?;
            if !v.is_finite() {
                return None;
            }
            values.push(v);
        }
        Some(ScalarWindow { values, before })
    }

    /// Symmetric `margin` window mapped through `f`.
    pub fn scalar(&self, margin: usize, f: impl Fn(&Sample) -> Option<f64>) -> Option<ScalarWindow> {
        self.scalar_span(margin, margin, f)
    }

    /// Previous and current value only.
    pub fn step(&self, f: impl Fn(&Sample) -> Option<f64>) -> Option<(f64, f64)> {
        let w = self.scalar_span(1, 0, f)?;
        Some((w.before()[0], w.current()))
    }

    /// Symmetric window of a quantity that depends on two bodies, e.g. a
    /// planet and the Sun. Both windows must be at the same minute.
    pub fn scalar_with(
        &self,
        other: &DetectionWindow<'_>,
        margin: usize,
        f: impl Fn(&Sample, &Sample) -> Option<f64>,
    ) -> Option<ScalarWindow> {
        self.paired_span(other, margin, margin, f)
    }

    /// Previous and current value of a two-body quantity.
    pub fn step_with(
        &self,
        other: &DetectionWindow<'_>,
        f: impl Fn(&Sample, &Sample) -> Option<f64>,
    ) -> Option<(f64, f64)> {
        let w = self.paired_span(other, 1, 0, f)?;
        Some((w.before()[0], w.current()))
    }

    fn paired_span(
        &self,
        other: &DetectionWindow<'_>,
        before: usize,
        after: usize,
        f: impl Fn(&Sample, &Sample) -> Option<f64>,
    ) -> Option<ScalarWindow> {
        if self.at != other.at || before > self.margin.min(other.margin) {
            return None;
        }
        if after > self.margin.min(other.margin) {
            return None;
        }
        let mut values = Vec::with_capacity(before + after + 1);
        for offset in -(before as isize)..=(after as isize) {
            let v = f(self.slot(offset)?, other.slot(offset)?)?;
            if !v.is_finite() {
                return None;
            }
            values.push(v);
        }
        Some(ScalarWindow { values, before })
    }
}

/// Complete, finite scalar values around the current minute.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarWindow {
    values: Vec<f64>,
    before: usize,
}

impl ScalarWindow {
    /// Build directly from values; used by tests and benches.
    pub fn new(before: Vec<f64>, current: f64, after: Vec<f64>) -> Self {
        let n = before.len();
        let mut values = before;
        values.push(current);
        values.extend(after);
        Self { values, before: n }
    }

    pub fn before(&self) -> &[f64] {
        &self.values[..self.before]
    }

    pub fn current(&self) -> f64 {
        self.values[self.before]
    }

    pub fn after(&self) -> &[f64] {
        &self.values[self.before + 1..]
    }
}
