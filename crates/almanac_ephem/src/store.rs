//! Ephemeris store: per-(body, minute) sample cache fed by a positional source.

use std::collections::HashMap;

use almanac_config::RetryPolicy;
use almanac_core::{Body, FieldSet, Minute, MinuteRange, Sample};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::EphemError;
use crate::retry::{FetchOutcome, fetch_with_retry};
use crate::series::EphemerisSeries;
use crate::source::{FetchRequest, PositionSource};

/// Default number of fetches in flight at once during [`EphemerisStore::prefetch`].
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Telemetry from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Fetches issued to the source (one per contiguous missing range).
    pub fetches: u32,
    /// Attempts across all fetches, first tries included.
    pub attempts: u32,
    /// Attempts beyond the first.
    pub retries: u32,
    /// Requests answered entirely from cache.
    pub cache_hits: u32,
    /// Minutes whose sample changed through a merge.
    pub samples_merged: u64,
}

/// Cache of positional samples, owned by the caller and passed to the sweep.
///
/// Samples become visible only once a fetch has completed and been merged;
/// merging needs `&mut self`, so a running sweep (which holds `&self`) never
/// observes a half-merged sample.
pub struct EphemerisStore<S> {
    source: S,
    policy: RetryPolicy,
    max_concurrent: usize,
    series: HashMap<Body, EphemerisSeries>,
    stats: StoreStats,
}

impl<S: std::fmt::Debug> std::fmt::Debug for EphemerisStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached: usize = self.series.values().map(EphemerisSeries::len).sum();
        f.debug_struct("EphemerisStore")
            .field("source", &self.source)
            .field("policy", &self.policy)
            .field("bodies", &self.series.len())
            .field("cached_samples", &cached)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<S: PositionSource> EphemerisStore<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
            series: HashMap::new(),
            stats: StoreStats::default(),
        }
    }

    /// Limit the number of fetches in flight during prefetch.
    pub fn with_max_concurrent_fetches(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Cached series for `body`, if any sample has been stored.
    pub fn series(&self, body: Body) -> Option<&EphemerisSeries> {
        self.series.get(&body)
    }

    /// Cached sample for `body` at `at`.
    pub fn sample(&self, body: Body, at: Minute) -> Option<&Sample> {
        self.series.get(&body).and_then(|s| s.get(at))
    }

    /// Field-level upsert of one sample. Returns `true` if anything changed.
    pub fn merge(&mut self, body: Body, at: Minute, sample: &Sample) -> bool {
        let changed = self
            .series
            .entry(body)
            .or_insert_with(|| EphemerisSeries::new(body))
            .merge(at, sample);
        if changed {
            self.stats.samples_merged += 1;
        }
        changed
    }

    /// Ensure `range` of `body` carries `fields`, fetching what is missing,
    /// and return the series.
    pub async fn get(
        &mut self,
        body: Body,
        range: MinuteRange,
        fields: FieldSet,
        cancel: &CancellationToken,
    ) -> Result<&EphemerisSeries, EphemError> {
        self.prefetch(&[FetchRequest::new(body, range, fields)], cancel)
            .await?;
        Ok(self
            .series
            .entry(body)
            .or_insert_with(|| EphemerisSeries::new(body)))
    }

    /// Contiguous missing ranges for each request, one fetch each.
    pub fn plan(&self, requests: &[FetchRequest]) -> Vec<FetchRequest> {
        let mut planned = Vec::new();
        for req in requests {
            let missing = match self.series.get(&req.body) {
                Some(series) => series.missing_ranges(req.range, req.fields),
                None => vec![req.range],
            };
            planned.extend(
                missing
                    .into_iter()
                    .map(|range| FetchRequest::new(req.body, range, req.fields)),
            );
        }
        planned
    }

    /// Fill every request from the source.
    ///
    /// Missing ranges are fetched concurrently (bounded by the store's
    /// concurrency limit) and merged only after all fetches have finished.
    /// Successful fetches are kept even when another one fails; the first
    /// failure in request order is returned.
    pub async fn prefetch(
        &mut self,
        requests: &[FetchRequest],
        cancel: &CancellationToken,
    ) -> Result<(), EphemError> {
        if cancel.is_cancelled() {
            return Err(EphemError::Cancelled);
        }

        let planned = self.plan(requests);
        let hits = requests
            .iter()
            .filter(|r| !planned.iter().any(|p| p.body == r.body && overlaps(p.range, r.range)))
            .count();
        self.stats.cache_hits += hits as u32;

        if planned.is_empty() {
            debug!(requests = requests.len(), "prefetch served from cache");
            return Ok(());
        }
        info!(
            requests = requests.len(),
            fetches = planned.len(),
            "prefetching ephemeris"
        );

        let source = &self.source;
        let policy = &self.policy;
        let results: Vec<Result<FetchOutcome, EphemError>> = stream::iter(planned.iter())
            .map(|req| fetch_with_retry(source, req, policy, cancel))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut first_error = None;
        for (req, result) in planned.iter().zip(results) {
            self.stats.fetches += 1;
            match result {
                Ok(outcome) => {
                    self.stats.attempts += outcome.attempts;
                    self.stats.retries += outcome.attempts.saturating_sub(1);
                    let mut merged = 0usize;
                    for (at, sample) in &outcome.samples {
                        if self.merge(req.body, *at, sample) {
                            merged += 1;
                        }
                    }
                    debug!(
                        body = %req.body,
                        range = %req.range,
                        received = outcome.samples.len(),
                        merged,
                        "merged fetch"
                    );
                }
                Err(e) => {
                    if let EphemError::FetchExhausted { attempts, .. } = &e {
                        self.stats.attempts += attempts;
                        self.stats.retries += attempts.saturating_sub(1);
                    }
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn overlaps(a: MinuteRange, b: MinuteRange) -> bool {
    a.start <= b.end && b.start <= a.end
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use almanac_core::SampleField;
    use async_trait::async_trait;

    use super::*;
    use crate::error::SourceError;

    /// Answers every minute with `longitude = minute`, and records requests.
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<FetchRequest>>,
    }

    #[async_trait]
    impl PositionSource for Recording {
        async fn fetch(
            &self,
            request: &FetchRequest,
        ) -> Result<Vec<(Minute, Sample)>, SourceError> {
            self.requests.lock().unwrap().push(*request);
            Ok(request
                .range
                .iter()
                .map(|m| (m, Sample::with_longitude(m.0 as f64)))
                .collect())
        }
    }

    fn lon() -> FieldSet {
        FieldSet::of(&[SampleField::Longitude])
    }

    fn r(a: i64, b: i64) -> MinuteRange {
        MinuteRange::new(Minute(a), Minute(b)).unwrap()
    }

    #[tokio::test]
    async fn get_fetches_then_hits_cache() {
        let mut store = EphemerisStore::new(Recording::default(), RetryPolicy::no_retry());
        let cancel = CancellationToken::new();
        let series = store.get(Body::Mars, r(0, 9), lon(), &cancel).await.unwrap();
        assert_eq!(series.len(), 10);
        store.get(Body::Mars, r(2, 8), lon(), &cancel).await.unwrap();
        assert_eq!(store.source().requests.lock().unwrap().len(), 1);
        let stats = store.stats();
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.samples_merged, 10);
    }

    #[tokio::test]
    async fn only_missing_ranges_are_fetched() {
        let mut store = EphemerisStore::new(Recording::default(), RetryPolicy::no_retry());
        for m in 3..6 {
            store.merge(Body::Venus, Minute(m), &Sample::with_longitude(0.0));
        }
        store
            .get(Body::Venus, r(0, 9), lon(), &CancellationToken::new())
            .await
            .unwrap();
        let reqs = store.source().requests.lock().unwrap().clone();
        let ranges: Vec<MinuteRange> = reqs.iter().map(|q| q.range).collect();
        assert_eq!(ranges, vec![r(0, 2), r(6, 9)]);
    }

    #[tokio::test]
    async fn merge_preserves_complementary_fields() {
        let mut store = EphemerisStore::new(Recording::default(), RetryPolicy::no_retry());
        store.merge(Body::Sun, Minute(0), &Sample::with_elevation(-6.1));
        store
            .get(Body::Sun, r(0, 0), lon(), &CancellationToken::new())
            .await
            .unwrap();
        let s = store.sample(Body::Sun, Minute(0)).unwrap();
        assert_eq!(s.elevation, Some(-6.1));
        assert_eq!(s.longitude, Some(0.0));
    }

    #[tokio::test]
    async fn prefetch_many_bodies() {
        let mut store = EphemerisStore::new(Recording::default(), RetryPolicy::no_retry())
            .with_max_concurrent_fetches(2);
        let reqs = [
            FetchRequest::new(Body::Sun, r(0, 4), lon()),
            FetchRequest::new(Body::Moon, r(0, 4), lon()),
            FetchRequest::new(Body::Mars, r(0, 4), lon()),
        ];
        store.prefetch(&reqs, &CancellationToken::new()).await.unwrap();
        for body in [Body::Sun, Body::Moon, Body::Mars] {
            assert!(store.series(body).unwrap().covers(r(0, 4), lon()));
        }
        assert_eq!(store.stats().fetches, 3);
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let mut store = EphemerisStore::new(Recording::default(), RetryPolicy::no_retry());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = store
            .prefetch(&[FetchRequest::new(Body::Sun, r(0, 4), lon())], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EphemError::Cancelled));
        assert!(store.source().requests.lock().unwrap().is_empty());
    }
}
