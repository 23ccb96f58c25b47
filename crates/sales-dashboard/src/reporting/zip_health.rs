use std::collections::{HashMap, HashSet};

use super::domain::{rate_percent, LeadId, QuotedHousehold, ZipHealth, ZipMetrics};

/// Classifies a zip code's quoting activity.
///
/// Rules are evaluated strictly in order: red, then yellow, then green, with
/// green as the fallback. Negative counts and negative or NaN rates are
/// treated as zero.
pub fn classify(quotes: i64, sales: i64, conversion_rate: f64) -> ZipHealth {
    let quotes = quotes.max(0);
    let sales = sales.max(0);
    let rate = if conversion_rate.is_nan() {
        0.0
    } else {
        conversion_rate.max(0.0)
    };

    if quotes >= 8 && sales == 0 {
        return ZipHealth::Red;
    }
    if ((5..=9).contains(&quotes) && sales == 0) || (quotes >= 10 && rate < 10.0) {
        return ZipHealth::Yellow;
    }
    if rate >= 15.0 || quotes < 5 {
        return ZipHealth::Green;
    }
    ZipHealth::Green
}

#[derive(Default)]
struct ZipAccumulator<'a> {
    leads: HashSet<&'a LeadId>,
    sold: HashSet<&'a LeadId>,
    items: u32,
    premium: f64,
}

/// Groups quoted households by zip code. Rows without a zip are left out.
/// Results are ordered by quote volume, busiest first, then by zip.
pub fn zip_rollup(households: &[QuotedHousehold]) -> Vec<ZipMetrics> {
    let mut by_zip: HashMap<&str, ZipAccumulator<'_>> = HashMap::new();

    for household in households {
        let Some(zip) = household.zip_code.as_deref() else {
            continue;
        };
        let acc = by_zip.entry(zip).or_default();
        acc.leads.insert(&household.lead_id);
        if household.is_sold() {
            acc.sold.insert(&household.lead_id);
            acc.items = acc.items.saturating_add(household.items());
            acc.premium += household.premium();
        }
    }

    let mut rows: Vec<ZipMetrics> = by_zip
        .into_iter()
        .map(|(zip, acc)| {
            let quotes = acc.leads.len();
            let sales = acc.sold.len();
            let conversion_rate = rate_percent(sales, quotes);
            ZipMetrics {
                zip_code: zip.to_string(),
                quotes: count(quotes),
                sales: count(sales),
                items: acc.items,
                premium: acc.premium,
                conversion_rate,
                health: classify(quotes as i64, sales as i64, conversion_rate),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.quotes
            .cmp(&a.quotes)
            .then_with(|| a.zip_code.cmp(&b.zip_code))
    });
    rows
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
