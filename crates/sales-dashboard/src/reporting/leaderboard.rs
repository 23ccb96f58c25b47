use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    rate_percent, EntryId, LeadId, ProducerId, ProducerMetrics, ZipMetrics, UNKNOWN_PRODUCER,
};
use super::store::{MetricsStore, StoreError};
use super::zip_health::zip_rollup;
use crate::calendar::DateRange;

/// Rolls raw activity rows up into leaderboard and zip-health views.
///
/// Every call reads fresh rows from the store; nothing is cached between
/// requests.
pub struct LeaderboardService<S> {
    store: Arc<S>,
}

impl<S> Clone for LeaderboardService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Running totals for one producer while households are folded in.
struct ProducerTally<'a> {
    producer_id: &'a ProducerId,
    leads: HashSet<&'a LeadId>,
    sold: HashSet<&'a LeadId>,
    quotes: u32,
    items: u32,
    premium: f64,
}

impl<'a> ProducerTally<'a> {
    fn new(producer_id: &'a ProducerId) -> Self {
        Self {
            producer_id,
            leads: HashSet::new(),
            sold: HashSet::new(),
            quotes: 0,
            items: 0,
            premium: 0.0,
        }
    }

    fn into_metrics(self, names: &HashMap<&ProducerId, &str>) -> ProducerMetrics {
        let qhh = self.leads.len();
        let sales = self.sold.len();
        ProducerMetrics {
            producer_id: self.producer_id.clone(),
            producer_name: names
                .get(self.producer_id)
                .copied()
                .unwrap_or(UNKNOWN_PRODUCER)
                .to_string(),
            qhh: count(qhh),
            quotes: self.quotes,
            sales: count(sales),
            items: self.items,
            premium: self.premium,
            close_rate: rate_percent(sales, qhh),
        }
    }
}

impl<S> LeaderboardService<S>
where
    S: MetricsStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Producer leaderboard for `range`, best close rate first.
    ///
    /// Every producer with a daily entry in range gets a row, even with no
    /// quoting activity. Producers with equal close rates keep the order they
    /// first appear in the entry list.
    pub fn producer_metrics(&self, range: &DateRange) -> Result<Vec<ProducerMetrics>, StoreError> {
        let entries = self.store.daily_entries(range)?;
        if entries.is_empty() {
            debug!(from = %range.from, to = %range.to, "no daily entries in range");
            return Ok(Vec::new());
        }

        let mut entry_producer: HashMap<&EntryId, &ProducerId> = HashMap::new();
        let mut producer_ids: Vec<&ProducerId> = Vec::new();
        let mut seen: HashSet<&ProducerId> = HashSet::new();
        for entry in &entries {
            entry_producer.insert(&entry.id, &entry.producer_id);
            if seen.insert(&entry.producer_id) {
                producer_ids.push(&entry.producer_id);
            }
        }

        let entry_ids: Vec<EntryId> = entries.iter().map(|entry| entry.id.clone()).collect();
        let households = self.store.quoted_households(&entry_ids)?;

        let owned_producer_ids: Vec<ProducerId> =
            producer_ids.iter().map(|id| (*id).clone()).collect();
        let producers = self.store.producers(&owned_producer_ids)?;
        let names: HashMap<&ProducerId, &str> = producers
            .iter()
            .filter_map(|producer| {
                producer
                    .display_name
                    .as_deref()
                    .map(|name| (&producer.id, name))
            })
            .collect();

        let mut slots: HashMap<&ProducerId, usize> = HashMap::with_capacity(producer_ids.len());
        let mut tallies: Vec<ProducerTally<'_>> = Vec::with_capacity(producer_ids.len());
        for &producer_id in &producer_ids {
            slots.insert(producer_id, tallies.len());
            tallies.push(ProducerTally::new(producer_id));
        }

        let mut skipped = 0usize;
        for household in &households {
            let slot = entry_producer
                .get(&household.daily_entry_id)
                .and_then(|producer_id| slots.get(producer_id));
            let Some(&slot) = slot else {
                skipped += 1;
                debug!(
                    entry_id = %household.daily_entry_id,
                    lead_id = %household.lead_id,
                    "quoted household references an unknown entry"
                );
                continue;
            };

            let tally = &mut tallies[slot];
            tally.leads.insert(&household.lead_id);
            tally.quotes = tally.quotes.saturating_add(household.lines());
            if household.is_sold() {
                tally.items = tally.items.saturating_add(household.items());
                tally.premium += household.premium();
                tally.sold.insert(&household.lead_id);
            }
        }

        let mut rows: Vec<ProducerMetrics> = tallies
            .into_iter()
            .map(|tally| tally.into_metrics(&names))
            .collect();
        rows.sort_by(|a, b| b.close_rate.total_cmp(&a.close_rate));

        info!(
            from = %range.from,
            to = %range.to,
            producers = rows.len(),
            households = households.len(),
            skipped,
            "producer leaderboard computed"
        );
        Ok(rows)
    }

    /// Zip-code roll-up of quoting activity logged in `range`.
    pub fn zip_metrics(&self, range: &DateRange) -> Result<Vec<ZipMetrics>, StoreError> {
        let entries = self.store.daily_entries(range)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let entry_ids: Vec<EntryId> = entries.into_iter().map(|entry| entry.id).collect();
        let households = self.store.quoted_households(&entry_ids)?;
        let rows = zip_rollup(&households);

        info!(
            from = %range.from,
            to = %range.to,
            zips = rows.len(),
            "zip health computed"
        );
        Ok(rows)
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
