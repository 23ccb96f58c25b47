//! Producer leaderboard and zip-code health reporting.

pub mod coerce;
pub mod domain;
pub mod leaderboard;
pub mod router;
pub mod snapshot;
pub mod store;
pub mod zip_health;

#[cfg(test)]
mod tests;

pub use domain::{
    DailyEntry, EntryId, LeadId, Producer, ProducerId, ProducerMetrics, QuotedHousehold,
    ZipHealth, ZipMetrics, UNKNOWN_PRODUCER,
};
pub use leaderboard::LeaderboardService;
pub use router::{reporting_router, ReportingState};
pub use snapshot::SnapshotStore;
pub use store::{MetricsStore, StoreError};
pub use zip_health::{classify, zip_rollup};
