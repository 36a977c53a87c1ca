//! End-to-end runs over tabulated samples: plan, prefetch, sweep, pairing.

use std::sync::atomic::{AtomicU32, Ordering};

use almanac_config::{AlmanacConfig, DetectorToggles, RetryPolicy};
use almanac_core::{AspectKind, Body, Minute, MinuteRange, Sample};
use almanac_ephem::{
    EphemError, EphemerisStore, FetchRequest, PositionSource, SourceError, TableSource,
};
use almanac_search::{
    AspectPhase, DurationSubject, PatternKind, PatternPhase, Phenomenon, SearchError,
    StationType, TwilightDirection, TwilightKind, compute_almanac,
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

fn range(a: i64, b: i64) -> MinuteRange {
    MinuteRange::new(Minute(a), Minute(b)).unwrap()
}

/// Every detector off; tests switch on what they exercise.
fn quiet() -> AlmanacConfig {
    AlmanacConfig {
        detectors: DetectorToggles {
            twilight: false,
            ingress: false,
            stations: false,
            elongation: false,
            brightness: false,
            visibility: false,
            aspects: false,
            patterns: false,
        },
        retry: RetryPolicy::no_retry(),
        ..AlmanacConfig::default()
    }
}

fn table(
    body: Body,
    minutes: std::ops::RangeInclusive<i64>,
    f: impl Fn(i64) -> Sample,
) -> TableSource {
    let mut t = TableSource::new();
    for m in minutes {
        t.insert(body, Minute(m), f(m));
    }
    t
}

fn longitudes(t: &mut TableSource, body: Body, f: impl Fn(i64) -> f64) {
    for m in 0..=40 {
        t.insert(body, Minute(m), Sample::with_longitude(f(m)));
    }
}

/// Sun rising 0.2 deg/min from -8.1 to -4.1, then sinking back.
fn sun_elevation(m: i64) -> f64 {
    if m <= 20 {
        -8.1 + 0.2 * m as f64
    } else {
        -4.1 - 0.2 * (m - 20) as f64
    }
}

#[tokio::test]
async fn civil_dawn_and_dusk_make_daylight() {
    let mut config = quiet();
    config.detectors.twilight = true;
    let source = table(Body::Sun, 0..=40, |m| Sample::with_elevation(sun_elevation(m)));
    let mut store = EphemerisStore::new(source, config.retry);

    let almanac = compute_almanac(&mut store, &config, range(3, 37), &CancellationToken::new())
        .await
        .unwrap();

    let got: Vec<(Minute, &Phenomenon)> =
        almanac.instants.iter().map(|e| (e.at, &e.phenomenon)).collect();
    assert_eq!(
        got,
        vec![
            (
                Minute(11),
                &Phenomenon::Twilight {
                    kind: TwilightKind::Civil,
                    direction: TwilightDirection::Dawn,
                }
            ),
            (
                Minute(30),
                &Phenomenon::Twilight {
                    kind: TwilightKind::Civil,
                    direction: TwilightDirection::Dusk,
                }
            ),
        ]
    );
    assert_eq!(almanac.instants[0].label, "Civil Dawn");

    assert_eq!(almanac.durations.len(), 1);
    let day = &almanac.durations[0];
    assert_eq!((day.start(), day.end()), (Minute(11), Minute(30)));
    assert_eq!(day.label(), "Daylight");
    assert!(almanac.pairing_warnings.is_empty());
}

#[tokio::test]
async fn retrograde_loop() {
    let mut config = quiet();
    config.detectors.stations = true;
    config.bodies.stations = vec![Body::Mars];
    let mut source = TableSource::new();
    longitudes(&mut source, Body::Mars, |m| match m {
        0..=10 => 100.0 + 0.1 * m as f64,
        11..=20 => 101.0 - 0.1 * (m - 10) as f64,
        _ => 100.0 + 0.1 * (m - 20) as f64,
    });
    let mut store = EphemerisStore::new(source, config.retry);

    let almanac = compute_almanac(&mut store, &config, range(3, 37), &CancellationToken::new())
        .await
        .unwrap();

    let stations: Vec<(Minute, StationType)> = almanac
        .instants
        .iter()
        .filter_map(|e| match e.phenomenon {
            Phenomenon::Station { station, .. } => Some((e.at, station)),
            _ => None,
        })
        .collect();
    assert_eq!(
        stations,
        vec![
            (Minute(10), StationType::StationRetrograde),
            (Minute(20), StationType::StationDirect),
        ]
    );
    assert_eq!(almanac.durations.len(), 1);
    assert_eq!(
        almanac.durations[0].subject(),
        &DurationSubject::Retrograde { body: Body::Mars }
    );
    assert_eq!(almanac.durations[0].minutes(), 10);
}

#[tokio::test]
async fn square_begins_perfects_and_ends() {
    let mut config = quiet();
    config.detectors.aspects = true;
    config.bodies.aspects = vec![Body::Sun, Body::Mars];
    config.aspects.kinds = vec![AspectKind::Square];
    config.aspects.orbs.insert(AspectKind::Square, 5.0);

    let mut source = TableSource::new();
    longitudes(&mut source, Body::Sun, |_| 0.0);
    longitudes(&mut source, Body::Mars, |m| 80.0 + 0.5 * m as f64);
    let mut store = EphemerisStore::new(source, config.retry);

    let almanac = compute_almanac(&mut store, &config, range(3, 37), &CancellationToken::new())
        .await
        .unwrap();

    let phases: Vec<(Minute, AspectPhase)> = almanac
        .instants
        .iter()
        .filter_map(|e| match e.phenomenon {
            Phenomenon::Aspect { phase, .. } => Some((e.at, phase)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (Minute(10), AspectPhase::Begins),
            (Minute(20), AspectPhase::Exact),
            (Minute(31), AspectPhase::Ends),
        ]
    );
    let orb = &almanac.durations[0];
    assert_eq!(orb.label(), "Sun Square Mars");
    assert_eq!((orb.start(), orb.end()), (Minute(10), Minute(31)));
}

#[tokio::test]
async fn grand_trine_forms_and_dissolves() {
    let mut config = quiet();
    config.detectors.patterns = true;
    config.bodies.patterns = vec![Body::Mars, Body::Moon, Body::Sun];

    let mut source = TableSource::new();
    longitudes(&mut source, Body::Sun, |_| 0.0);
    longitudes(&mut source, Body::Moon, |_| 120.0);
    longitudes(&mut source, Body::Mars, |m| 230.0 + 0.5 * m as f64);
    let mut store = EphemerisStore::new(source, config.retry);

    let almanac = compute_almanac(&mut store, &config, range(3, 37), &CancellationToken::new())
        .await
        .unwrap();

    let events: Vec<(Minute, PatternKind, PatternPhase)> = almanac
        .instants
        .iter()
        .filter_map(|e| match &e.phenomenon {
            Phenomenon::Pattern { pattern, phase, .. } => Some((e.at, *pattern, *phase)),
            _ => None,
        })
        .collect();
    assert_eq!(
        events,
        vec![
            (Minute(14), PatternKind::GrandTrine, PatternPhase::Forms),
            (Minute(27), PatternKind::GrandTrine, PatternPhase::Dissolves),
        ]
    );
    assert_eq!(almanac.durations.len(), 1);
    assert_eq!(
        almanac.durations[0].subject(),
        &DurationSubject::Pattern {
            pattern: PatternKind::GrandTrine,
            bodies: vec![Body::Sun, Body::Moon, Body::Mars],
        }
    );
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let mut config = quiet();
    config.detectors.twilight = true;
    let source = table(Body::Sun, 0..=40, |m| Sample::with_elevation(sun_elevation(m)));
    let mut store = EphemerisStore::new(source, config.retry);
    let cancel = CancellationToken::new();

    let first = compute_almanac(&mut store, &config, range(3, 37), &cancel)
        .await
        .unwrap();
    let fetches = store.stats().fetches;
    let second = compute_almanac(&mut store, &config, range(5, 35), &cancel)
        .await
        .unwrap();

    assert_eq!(store.stats().fetches, fetches);
    assert_eq!(first.durations, second.durations);
}

#[tokio::test]
async fn missing_samples_produce_no_events() {
    let mut config = quiet();
    config.detectors.twilight = true;
    // neither minute next to the crossing has a neighbour
    let mut sparse = TableSource::new();
    sparse.insert(Body::Sun, Minute(10), Sample::with_elevation(-6.1));
    sparse.insert(Body::Sun, Minute(12), Sample::with_elevation(-5.7));
    let mut store = EphemerisStore::new(sparse, config.retry);

    let almanac = compute_almanac(&mut store, &config, range(3, 37), &CancellationToken::new())
        .await
        .unwrap();
    assert!(almanac.instants.is_empty());
    assert!(almanac.durations.is_empty());
}

/// Fails every attempt with a transient error.
#[derive(Default)]
struct Down {
    calls: AtomicU32,
}

#[async_trait]
impl PositionSource for Down {
    async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<(Minute, Sample)>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::transient("connection reset"))
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_fetch_fails_the_run() {
    let mut config = quiet();
    config.detectors.twilight = true;
    config.retry = RetryPolicy {
        max_attempts: 3,
        initial_delay_ms: 10,
        max_delay_ms: 100,
        multiplier: 2.0,
        attempt_timeout_ms: 1_000,
        jitter: false,
    };
    let mut store = EphemerisStore::new(Down::default(), config.retry);

    let err = compute_almanac(&mut store, &config, range(0, 60), &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        SearchError::Ephem(EphemError::FetchExhausted {
            body, attempts, ..
        }) => {
            assert_eq!(body, Body::Sun);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.source().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancelled_before_start() {
    let mut config = quiet();
    config.detectors.twilight = true;
    let mut store = EphemerisStore::new(Down::default(), config.retry);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = compute_almanac(&mut store, &config, range(0, 60), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Ephem(EphemError::Cancelled)));
    assert_eq!(store.source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let config = quiet();
    let mut store = EphemerisStore::new(TableSource::new(), config.retry);
    let bad = MinuteRange {
        start: Minute(10),
        end: Minute(0),
    };
    let err = compute_almanac(&mut store, &config, bad, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidRange { .. }));
}
