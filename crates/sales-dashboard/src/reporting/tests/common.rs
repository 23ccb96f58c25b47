use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{AgencyCalendar, DateRange, FixedClock};
use crate::reporting::domain::{
    DailyEntry, EntryId, LeadId, Producer, ProducerId, QuotedHousehold,
};
use crate::reporting::snapshot::SnapshotStore;
use crate::reporting::store::{MetricsStore, StoreError};
use crate::reporting::{LeaderboardService, ReportingState};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn week() -> DateRange {
    DateRange::new(date(2025, 10, 13), date(2025, 10, 19)).expect("valid week")
}

pub(super) fn entry(id: &str, producer: &str, day: NaiveDate) -> DailyEntry {
    DailyEntry {
        id: EntryId::from(id),
        producer_id: ProducerId::from(producer),
        entry_date: day,
    }
}

pub(super) fn household(
    entry_id: &str,
    lead: &str,
    lines: u32,
    items: u32,
    premium: f64,
) -> QuotedHousehold {
    QuotedHousehold {
        id: None,
        daily_entry_id: EntryId::from(entry_id),
        lead_id: LeadId::from(lead),
        lines_quoted: Some(lines),
        items_sold: Some(items),
        quoted_premium: Some(premium),
        zip_code: None,
    }
}

pub(super) fn zipped(mut household: QuotedHousehold, zip: &str) -> QuotedHousehold {
    household.zip_code = Some(zip.to_string());
    household
}

pub(super) fn producer(id: &str, name: &str) -> Producer {
    Producer {
        id: ProducerId::from(id),
        display_name: Some(name.to_string()),
        active: true,
    }
}

/// Thursday 2025-10-16, 10:00 in Chicago.
pub(super) fn calendar() -> Arc<AgencyCalendar<FixedClock>> {
    let instant: DateTime<Utc> = DateTime::parse_from_rfc3339("2025-10-16T15:00:00Z")
        .expect("valid instant")
        .with_timezone(&Utc);
    Arc::new(AgencyCalendar::new(FixedClock(instant)))
}

/// Wraps a snapshot and records how many times each query ran.
#[derive(Default)]
pub(super) struct CountingStore {
    pub(super) inner: SnapshotStore,
    pub(super) entry_calls: AtomicUsize,
    pub(super) household_calls: AtomicUsize,
    pub(super) producer_calls: AtomicUsize,
}

impl CountingStore {
    pub(super) fn new(inner: SnapshotStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> (usize, usize, usize) {
        (
            self.entry_calls.load(Ordering::SeqCst),
            self.household_calls.load(Ordering::SeqCst),
            self.producer_calls.load(Ordering::SeqCst),
        )
    }
}

impl MetricsStore for CountingStore {
    fn daily_entries(&self, range: &DateRange) -> Result<Vec<DailyEntry>, StoreError> {
        self.entry_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.daily_entries(range)
    }

    fn quoted_households(
        &self,
        entry_ids: &[EntryId],
    ) -> Result<Vec<QuotedHousehold>, StoreError> {
        self.household_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.quoted_households(entry_ids)
    }

    fn producers(&self, producer_ids: &[ProducerId]) -> Result<Vec<Producer>, StoreError> {
        self.producer_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.producers(producer_ids)
    }
}

/// Which query a [`FailingStore`] rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailAt {
    Entries,
    Households,
    Producers,
}

/// Serves the snapshot but fails one query as unavailable.
pub(super) struct FailingStore {
    pub(super) inner: SnapshotStore,
    pub(super) fail_at: FailAt,
}

impl FailingStore {
    fn check(&self, stage: FailAt) -> Result<(), StoreError> {
        if self.fail_at == stage {
            Err(StoreError::Unavailable(format!("{stage:?} query timed out")))
        } else {
            Ok(())
        }
    }
}

impl MetricsStore for FailingStore {
    fn daily_entries(&self, range: &DateRange) -> Result<Vec<DailyEntry>, StoreError> {
        self.check(FailAt::Entries)?;
        self.inner.daily_entries(range)
    }

    fn quoted_households(
        &self,
        entry_ids: &[EntryId],
    ) -> Result<Vec<QuotedHousehold>, StoreError> {
        self.check(FailAt::Households)?;
        self.inner.quoted_households(entry_ids)
    }

    fn producers(&self, producer_ids: &[ProducerId]) -> Result<Vec<Producer>, StoreError> {
        self.check(FailAt::Producers)?;
        self.inner.producers(producer_ids)
    }
}

/// Three producers across the week with mixed activity.
pub(super) fn sample_snapshot() -> SnapshotStore {
    SnapshotStore::new(
        vec![
            entry("e1", "p1", date(2025, 10, 13)),
            entry("e2", "p2", date(2025, 10, 13)),
            entry("e3", "p1", date(2025, 10, 14)),
            entry("e4", "p3", date(2025, 10, 15)),
            entry("e-old", "p4", date(2025, 10, 6)),
        ],
        vec![
            zipped(household("e1", "L1", 2, 1, 500.0), "50309"),
            zipped(household("e1", "L2", 1, 0, 300.0), "50309"),
            zipped(household("e3", "L3", 3, 2, 1200.0), "50310"),
            zipped(household("e3", "L4", 1, 0, 0.0), "50309"),
            zipped(household("e2", "L5", 2, 1, 650.0), "50311"),
            zipped(household("e-old", "L9", 4, 4, 9000.0), "50309"),
        ],
        vec![
            producer("p1", "Alex"),
            producer("p2", "Blake"),
            producer("p3", "Casey"),
            producer("p4", "Devon"),
        ],
    )
}

pub(super) fn state_for<S: MetricsStore + 'static>(
    store: Arc<S>,
) -> ReportingState<S, FixedClock> {
    ReportingState {
        service: LeaderboardService::new(store),
        calendar: calendar(),
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
