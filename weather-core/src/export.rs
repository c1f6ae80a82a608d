use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::{WeatherError, WeatherResult},
    model::RawPayloads,
};

pub const SNAPSHOT_PREFIX: &str = "weather_data_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Raw payloads of the last fetch plus the moment they were exported.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord<'a> {
    pub current: &'a Value,
    pub forecast: &'a Value,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    current: &'a Value,
    forecast: &'a Value,
}

impl<'a> SnapshotRecord<'a> {
    pub fn new(payloads: &'a RawPayloads, created_at: NaiveDateTime) -> Self {
        Self { current: &payloads.current, forecast: &payloads.forecast, created_at }
    }

    /// `weather_data_YYYYMMDD_HHMMSS.json`; second resolution, so two
    /// exports in the same second share a name.
    pub fn file_name(&self) -> String {
        format!("{SNAPSHOT_PREFIX}{}.json", self.created_at.format(TIMESTAMP_FORMAT))
    }

    /// Pretty JSON with 4-space indentation and exactly two keys.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let doc = SnapshotDocument { current: self.current, forecast: self.forecast };

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)?;

        // serde_json only ever emits valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Write the payloads of the last successful fetch into `dir`.
pub fn export_snapshot(
    dir: &Path,
    payloads: Option<&RawPayloads>,
    now: NaiveDateTime,
) -> WeatherResult<PathBuf> {
    let payloads = payloads.ok_or(WeatherError::NoDataAvailable)?;
    let record = SnapshotRecord::new(payloads, now);
    let path = dir.join(record.file_name());

    let json = record.to_json().map_err(|e| {
        WeatherError::UnexpectedFailure(format!("failed to serialize snapshot: {e}"))
    })?;

    fs::write(&path, json)
        .map_err(|source| WeatherError::SnapshotWrite { path: path.clone(), source })?;

    tracing::info!(path = %path.display(), "saved weather snapshot");
    Ok(path)
}
