//! Ephemeris acquisition for the almanac sweep.
//!
//! The [`EphemerisStore`] caches positional samples per body and minute and
//! fills gaps from a [`PositionSource`]. Failed fetches are retried with
//! exponential backoff and jitter under a [`RetryPolicy`]; every attempt has
//! its own timeout and every backoff sleep can be cut short by a
//! [`CancellationToken`]. Results from several fetches are merged field by
//! field, so a sample can be assembled from more than one call.
//!
//! The store is an ordinary owned value: construct one per run and pass it
//! to the sweep.
//!
//! [`RetryPolicy`]: almanac_config::RetryPolicy
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod error;
pub mod retry;
pub mod series;
pub mod source;
pub mod store;
pub mod table;

pub use error::{EphemError, SourceError};
pub use retry::backoff_delay;
pub use series::EphemerisSeries;
pub use source::{FetchRequest, PositionSource};
pub use store::{DEFAULT_MAX_CONCURRENT_FETCHES, EphemerisStore, StoreStats};
pub use table::{SampleRecord, TableSource};
