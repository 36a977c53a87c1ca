//! In-memory positional source over pre-tabulated samples.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use almanac_core::{Body, Minute, Sample};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EphemError, SourceError};
use crate::source::{FetchRequest, PositionSource};

/// One row of a sample table.
///
/// In JSON the sample fields sit next to `body` and `at`:
/// `{"body": "Mars", "at": "2024-03-20T03:06:00Z", "longitude": 12.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub body: Body,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub sample: Sample,
}

/// A [`PositionSource`] answering from a table loaded up front.
///
/// Useful for offline runs and tests. Rows for the same (body, minute) are
/// merged field by field.
#[derive(Debug, Clone, Default)]
pub struct TableSource {
    rows: HashMap<Body, BTreeMap<Minute, Sample>>,
}

impl TableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = SampleRecord>) -> Self {
        let mut table = Self::new();
        for r in records {
            table.insert(r.body, Minute::from_datetime(r.at), r.sample);
        }
        table
    }

    /// Read a JSON array of [`SampleRecord`]s.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, EphemError> {
        let records: Vec<SampleRecord> = serde_json::from_reader(reader)?;
        debug!(records = records.len(), "loaded sample table");
        Ok(Self::from_records(records))
    }

    pub fn from_json_path(path: &Path) -> Result<Self, EphemError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, body: Body, at: Minute, sample: Sample) {
        self.rows
            .entry(body)
            .or_default()
            .entry(at)
            .or_default()
            .merge(&sample);
    }

    /// Total number of (body, minute) rows.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bodies with at least one row.
    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.rows.keys().copied()
    }
}

#[async_trait]
impl PositionSource for TableSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<(Minute, Sample)>, SourceError> {
        let Some(rows) = self.rows.get(&request.body) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .range(request.range.start..=request.range.end)
            .map(|(at, s)| (*at, s.project(request.fields)))
            .filter(|(_, s)| *s != Sample::default())
            .collect())
    }
}
