//! Error types for the sweep.

use almanac_config::ConfigError;
use almanac_core::Minute;
use almanac_ephem::EphemError;

/// Errors from planning, running or completing a sweep.
///
/// Incomplete windows and pairing anomalies are not errors: detectors skip
/// the minute and the synthesizer records a warning.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SearchError {
    /// Ephemeris acquisition failed; fatal for the run.
    #[error(transparent)]
    Ephem(#[from] EphemError),
    /// The configuration failed validation.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// `end` is before `start`.
    #[error("invalid range: end {end} is before start {start}")]
    InvalidRange { start: Minute, end: Minute },
    /// The cancellation token fired between minutes.
    #[error("sweep cancelled at {at}")]
    Cancelled { at: Minute },
}
