//! In-memory [`MetricsStore`] hydrated from exported activity tables.
//!
//! Two export shapes are understood: a single JSON document holding the raw
//! gateway responses for each table, and a directory of CSV files named after
//! the tables. Both decode through the same row types, so numeric columns are
//! normalized the same way regardless of source.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::domain::{DailyEntry, EntryId, Producer, ProducerId, QuotedHousehold};
use super::store::{MetricsStore, StoreError};
use crate::calendar::DateRange;

pub const DAILY_ENTRIES_TABLE: &str = "daily_entries";
pub const QUOTED_HOUSEHOLDS_TABLE: &str = "quoted_households";
pub const PRODUCERS_TABLE: &str = "producers";

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entries: Vec<DailyEntry>,
    households: Vec<QuotedHousehold>,
    producers: Vec<Producer>,
}

/// Raw gateway dump; each table stays untyped until it is decoded on its own
/// so a failure can name the offending table and row.
#[derive(Debug, Deserialize)]
struct GatewayDump {
    #[serde(default)]
    daily_entries: Value,
    #[serde(default)]
    quoted_households: Value,
    #[serde(default)]
    producers: Value,
}

impl SnapshotStore {
    pub fn new(
        entries: Vec<DailyEntry>,
        households: Vec<QuotedHousehold>,
        producers: Vec<Producer>,
    ) -> Self {
        Self {
            entries,
            households,
            producers,
        }
    }

    /// Loads a `.json` gateway dump, or a directory of CSV exports.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let store = if path.is_dir() {
            Self::from_csv_dir(path)?
        } else {
            let file = File::open(path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_gateway_json(file)?
        };

        info!(
            path = %path.display(),
            entries = store.entries.len(),
            households = store.households.len(),
            producers = store.producers.len(),
            "activity snapshot loaded"
        );
        Ok(store)
    }

    pub fn from_gateway_json<R: Read>(reader: R) -> Result<Self, StoreError> {
        let dump: GatewayDump = serde_json::from_reader(reader)
            .map_err(|err| StoreError::decode("gateway dump", err))?;

        Ok(Self {
            entries: decode_table(DAILY_ENTRIES_TABLE, dump.daily_entries)?,
            households: decode_table(QUOTED_HOUSEHOLDS_TABLE, dump.quoted_households)?,
            producers: decode_table(PRODUCERS_TABLE, dump.producers)?,
        })
    }

    /// Reads `daily_entries.csv`, `quoted_households.csv`, and `producers.csv`.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            entries: read_csv_table(dir, DAILY_ENTRIES_TABLE)?,
            households: read_csv_table(dir, QUOTED_HOUSEHOLDS_TABLE)?,
            producers: read_csv_table(dir, PRODUCERS_TABLE)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodes one table of a gateway response. A missing table is empty; any
/// other non-array payload is rejected.
pub fn decode_table<T: DeserializeOwned>(
    table: &'static str,
    payload: Value,
) -> Result<Vec<T>, StoreError> {
    let rows = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => rows,
        other => {
            return Err(StoreError::decode(
                table,
                format!("expected an array of rows, got {}", value_kind(&other)),
            ))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row)
                .map_err(|err| StoreError::decode(table, format!("row {index}: {err}")))
        })
        .collect()
}

/// Parses CSV rows from any reader, e.g. an uploaded export.
pub fn parse_csv_rows<T: DeserializeOwned, R: Read>(
    table: &'static str,
    reader: R,
) -> Result<Vec<T>, StoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|err| StoreError::decode(table, format!("row {index}: {err}")))?;
        rows.push(row);
    }

    Ok(rows)
}

fn read_csv_table<T: DeserializeOwned>(
    dir: &Path,
    table: &'static str,
) -> Result<Vec<T>, StoreError> {
    let path = dir.join(format!("{table}.csv"));
    let file = File::open(&path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_csv_rows(table, file)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl MetricsStore for SnapshotStore {
    fn daily_entries(&self, range: &DateRange) -> Result<Vec<DailyEntry>, StoreError> {
        let rows: Vec<DailyEntry> = self
            .entries
            .iter()
            .filter(|entry| range.contains(entry.entry_date))
            .cloned()
            .collect();
        debug!(from = %range.from, to = %range.to, rows = rows.len(), "daily entries");
        Ok(rows)
    }

    fn quoted_households(
        &self,
        entry_ids: &[EntryId],
    ) -> Result<Vec<QuotedHousehold>, StoreError> {
        let wanted: HashSet<&EntryId> = entry_ids.iter().collect();
        Ok(self
            .households
            .iter()
            .filter(|household| wanted.contains(&household.daily_entry_id))
            .cloned()
            .collect())
    }

    fn producers(&self, producer_ids: &[ProducerId]) -> Result<Vec<Producer>, StoreError> {
        let wanted: HashSet<&ProducerId> = producer_ids.iter().collect();
        Ok(self
            .producers
            .iter()
            .filter(|producer| wanted.contains(&producer.id))
            .cloned()
            .collect())
    }
}
