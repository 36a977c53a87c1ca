//! Store behaviour against sources that fail, stall and return partial fields.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use almanac_config::RetryPolicy;
use almanac_core::{Body, FieldSet, Minute, MinuteRange, Sample, SampleField};
use almanac_ephem::{EphemError, EphemerisStore, FetchRequest, PositionSource, SourceError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Each body fails a configured number of times, then answers after a fixed
/// latency with longitude and illumination for every requested minute.
struct Scripted {
    failures: Mutex<HashMap<Body, u32>>,
    latency: Duration,
}

impl Scripted {
    fn new(failures: &[(Body, u32)], latency: Duration) -> Self {
        Self {
            failures: Mutex::new(failures.iter().copied().collect()),
            latency,
        }
    }
}

#[async_trait]
impl PositionSource for Scripted {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<(Minute, Sample)>, SourceError> {
        tokio::time::sleep(self.latency).await;
        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(&request.body)
                && *left > 0
            {
                *left -= 1;
                return Err(SourceError::transient("503 service unavailable"));
            }
        }
        Ok(request
            .range
            .iter()
            .map(|m| {
                let full = Sample {
                    longitude: Some(m.0 as f64 * 0.01),
                    illumination: Some(0.5),
                    ..Sample::default()
                };
                (m, full.project(request.fields))
            })
            .collect())
    }
}

fn range(a: i64, b: i64) -> MinuteRange {
    MinuteRange::new(Minute(a), Minute(b)).unwrap()
}

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        jitter: false,
        ..RetryPolicy::default()
    }
}

#[tokio::test(start_paused = true)]
async fn prefetch_runs_fetches_concurrently() {
    let source = Scripted::new(&[], Duration::from_secs(1));
    let mut store = EphemerisStore::new(source, policy(3));
    let lon = FieldSet::of(&[SampleField::Longitude]);
    let requests: Vec<FetchRequest> = [Body::Sun, Body::Moon, Body::Mars, Body::Venus]
        .into_iter()
        .map(|b| FetchRequest::new(b, range(0, 59), lon))
        .collect();

    let start = tokio::time::Instant::now();
    store
        .prefetch(&requests, &CancellationToken::new())
        .await
        .unwrap();
    // four one-second fetches in parallel
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(store.stats().fetches, 4);
    assert_eq!(store.stats().samples_merged, 240);
}

#[tokio::test(start_paused = true)]
async fn retries_are_counted_and_results_merged() {
    let source = Scripted::new(&[(Body::Mars, 2)], Duration::ZERO);
    let mut store = EphemerisStore::new(source, policy(5));
    let lon = FieldSet::of(&[SampleField::Longitude]);
    let series = store
        .get(Body::Mars, range(0, 9), lon, &CancellationToken::new())
        .await
        .unwrap();
    assert!(series.covers(range(0, 9), lon));
    let stats = store.stats();
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.retries, 2);
}

#[tokio::test(start_paused = true)]
async fn exhaustion_keeps_other_bodies() {
    let source = Scripted::new(&[(Body::Jupiter, u32::MAX)], Duration::ZERO);
    let mut store = EphemerisStore::new(source, policy(2));
    let lon = FieldSet::of(&[SampleField::Longitude]);
    let requests = [
        FetchRequest::new(Body::Saturn, range(0, 4), lon),
        FetchRequest::new(Body::Jupiter, range(0, 4), lon),
    ];
    let err = store
        .prefetch(&requests, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        EphemError::FetchExhausted {
            body,
            range: r,
            attempts,
            ..
        } => {
            assert_eq!(body, Body::Jupiter);
            assert_eq!(r, range(0, 4));
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.series(Body::Saturn).unwrap().covers(range(0, 4), lon));
    assert!(store.series(Body::Jupiter).is_none());
}

#[tokio::test(start_paused = true)]
async fn partial_fields_assemble_across_fetches() {
    let source = Scripted::new(&[], Duration::ZERO);
    let mut store = EphemerisStore::new(source, policy(1));
    let cancel = CancellationToken::new();
    let lon = FieldSet::of(&[SampleField::Longitude]);
    let illum = FieldSet::of(&[SampleField::Illumination]);

    store.get(Body::Venus, range(0, 4), lon, &cancel).await.unwrap();
    store.get(Body::Venus, range(0, 4), illum, &cancel).await.unwrap();
    let both = lon.union(illum);
    assert!(store.series(Body::Venus).unwrap().covers(range(0, 4), both));

    // already complete: the third request is a cache hit and merges nothing
    let before = store.stats();
    store.get(Body::Venus, range(0, 4), both, &cancel).await.unwrap();
    let after = store.stats();
    assert_eq!(after.fetches, before.fetches);
    assert_eq!(after.samples_merged, before.samples_merged);
    assert_eq!(after.cache_hits, before.cache_hits + 1);
}

#[tokio::test]
async fn merging_same_sample_twice_is_idempotent() {
    let mut store = EphemerisStore::new(Scripted::new(&[], Duration::ZERO), policy(1));
    let sample = Sample {
        longitude: Some(123.25),
        distance: Some(0.72),
        ..Sample::default()
    };
    assert!(store.merge(Body::Venus, Minute(7), &sample));
    let once = *store.sample(Body::Venus, Minute(7)).unwrap();
    assert!(!store.merge(Body::Venus, Minute(7), &sample));
    assert_eq!(*store.sample(Body::Venus, Minute(7)).unwrap(), once);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_prefetch() {
    let source = Scripted::new(&[(Body::Moon, u32::MAX)], Duration::ZERO);
    let mut store = EphemerisStore::new(source, policy(5));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });
    let err = store
        .prefetch(
            &[FetchRequest::new(
                Body::Moon,
                range(0, 4),
                FieldSet::of(&[SampleField::Longitude]),
            )],
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EphemError::Cancelled));
}
