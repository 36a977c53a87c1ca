//! Almanac event search.
//!
//! A run has three stages:
//!
//! 1. **Plan and prefetch.** [`Sweep::plan`] lists the samples every enabled
//!    detector needs, widened by the detection margin, and the
//!    [`EphemerisStore`] fetches whatever it does not already hold.
//! 2. **Sweep.** [`Sweep::run`] walks the range minute by minute and hands
//!    each detector its window. Detectors are pure functions in [`detect`].
//! 3. **Synthesize.** [`synthesize`] pairs beginning and ending events per
//!    subject into [`DurationEvent`]s.
//!
//! [`compute_almanac`] chains the three.
//!
//! ```no_run
//! # async fn demo() -> Result<(), almanac_search::SearchError> {
//! use almanac_config::AlmanacConfig;
//! use almanac_core::{Minute, MinuteRange};
//! use almanac_ephem::{EphemerisStore, TableSource};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = AlmanacConfig::default();
//! let source = TableSource::from_json_path("samples.json".as_ref())?;
//! let mut store = EphemerisStore::new(source, config.retry);
//! let range = MinuteRange {
//!     start: Minute(0),
//!     end: Minute(1439),
//! };
//! let almanac =
//!     almanac_search::compute_almanac(&mut store, &config, range, &CancellationToken::new())
//!         .await?;
//! for event in &almanac.instants {
//!     println!("{event}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod detect;
pub mod duration;
pub mod error;
pub mod event;
pub mod sweep;
pub mod window;

use std::time::Instant;

use almanac_config::AlmanacConfig;
use almanac_core::MinuteRange;
use almanac_ephem::{EphemerisStore, PositionSource};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use duration::{Pairing, PairingWarning, Synthesis, pair, roles, synthesize};
pub use error::SearchError;
pub use event::{
    ALL_PATTERNS, ALL_TWILIGHTS, AspectPhase, DurationEvent, DurationSubject, ElongationSide,
    IngressBoundary, InstantEvent, Motion, PatternKind, PatternPhase, Phenomenon, Role,
    StationType, TwilightDirection, TwilightKind, VisibilityPhase,
};
pub use sweep::Sweep;
pub use window::{BodyTrack, DetectionWindow, ScalarWindow};

/// Everything found in one range.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Almanac {
    /// Instant events in sweep order: by minute, then detector order.
    pub instants: Vec<InstantEvent>,
    /// Durations sorted by start.
    pub durations: Vec<DurationEvent>,
    pub pairing_warnings: Vec<PairingWarning>,
}

/// Plan, prefetch, sweep and synthesize `range`.
///
/// Acquisition failure and cancellation are fatal; no partial almanac is
/// returned. Samples already cached in `store` are reused.
pub async fn compute_almanac<S: PositionSource>(
    store: &mut EphemerisStore<S>,
    config: &AlmanacConfig,
    range: MinuteRange,
    cancel: &CancellationToken,
) -> Result<Almanac, SearchError> {
    let started = Instant::now();
    let sweep = Sweep::new(config)?;
    info!(
        range = %range,
        latitude = config.observer.latitude_deg,
        longitude = config.observer.longitude_deg,
        altitude_m = config.observer.altitude_m,
        "computing almanac"
    );

    let plan = sweep.plan(range)?;
    store.prefetch(&plan, cancel).await?;
    let instants = sweep.run(store, range, cancel)?;
    let Synthesis {
        durations,
        warnings,
    } = synthesize(&instants);

    info!(
        instants = instants.len(),
        durations = durations.len(),
        warnings = warnings.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "almanac computed"
    );
    Ok(Almanac {
        instants,
        durations,
        pairing_warnings: warnings,
    })
}
