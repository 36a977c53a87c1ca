//! Positional-data source seam.

use std::sync::Arc;

use almanac_core::{Body, FieldSet, Minute, MinuteRange, Sample};
use async_trait::async_trait;

use crate::error::SourceError;

/// One contiguous request for a single body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub body: Body,
    pub range: MinuteRange,
    /// Fields the caller needs. Sources may return more.
    pub fields: FieldSet,
}

impl FetchRequest {
    pub fn new(body: Body, range: MinuteRange, fields: FieldSet) -> Self {
        Self {
            body,
            range,
            fields,
        }
    }
}

/// Upstream provider of positional samples.
///
/// Implementations are typically network clients. Any error is treated as a
/// failed attempt; [`SourceError::retryable`] decides whether the store tries
/// again.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`: the store issues requests for
/// different bodies concurrently.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Samples for `request.body` at minutes within `request.range`.
    ///
    /// Minutes the source has no data for are simply omitted.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<(Minute, Sample)>, SourceError>;
}

#[async_trait]
impl<S: PositionSource + ?Sized> PositionSource for Arc<S> {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<(Minute, Sample)>, SourceError> {
        (**self).fetch(request).await
    }
}
