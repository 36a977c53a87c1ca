//! Error types for ephemeris acquisition.

use almanac_core::{Body, MinuteRange};

/// Failure reported by a [`PositionSource`](crate::PositionSource).
///
/// Sources decide whether a failure is worth retrying; network and
/// rate-limit failures are transient, malformed requests are not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
    pub retryable: bool,
}

impl SourceError {
    /// A failure the store should retry.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// A failure retrying cannot fix.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// Errors from the ephemeris store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EphemError {
    /// Every allowed attempt failed, or the source reported a permanent error.
    /// Fatal for the run.
    #[error("fetch exhausted for {body} over {range} after {attempts} attempt(s): {last_error}")]
    FetchExhausted {
        body: Body,
        range: MinuteRange,
        attempts: u32,
        last_error: String,
    },
    /// The cancellation token fired before the fetch finished.
    #[error("ephemeris fetch cancelled")]
    Cancelled,
    /// Sample table could not be read.
    #[error("sample table I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Sample table is not valid JSON of the expected shape.
    #[error("sample table parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
