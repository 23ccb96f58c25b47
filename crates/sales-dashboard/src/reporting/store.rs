use super::domain::{DailyEntry, EntryId, Producer, ProducerId, QuotedHousehold};
use crate::calendar::DateRange;

/// Read-only view over the activity tables the reporting layer rolls up.
///
/// Implementations return rows already decoded into typed records; a payload
/// that cannot be decoded is reported as [`StoreError::Decode`] rather than
/// silently coerced.
pub trait MetricsStore: Send + Sync {
    /// Daily entries whose `entry_date` falls inside `range` (inclusive).
    fn daily_entries(&self, range: &DateRange) -> Result<Vec<DailyEntry>, StoreError>;

    /// Quoted households belonging to any of `entry_ids`.
    fn quoted_households(&self, entry_ids: &[EntryId])
        -> Result<Vec<QuotedHousehold>, StoreError>;

    /// Producers whose id is in `producer_ids`.
    fn producers(&self, producer_ids: &[ProducerId]) -> Result<Vec<Producer>, StoreError>;
}

impl<S: MetricsStore + ?Sized> MetricsStore for std::sync::Arc<S> {
    fn daily_entries(&self, range: &DateRange) -> Result<Vec<DailyEntry>, StoreError> {
        (**self).daily_entries(range)
    }

    fn quoted_households(
        &self,
        entry_ids: &[EntryId],
    ) -> Result<Vec<QuotedHousehold>, StoreError> {
        (**self).quoted_households(entry_ids)
    }

    fn producers(&self, producer_ids: &[ProducerId]) -> Result<Vec<Producer>, StoreError> {
        (**self).producers(producer_ids)
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("metrics store unavailable: {0}")]
    Unavailable(String),
    #[error("could not decode {table} payload: {reason}")]
    Decode { table: &'static str, reason: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn decode(table: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            table,
            reason: reason.to_string(),
        }
    }
}
