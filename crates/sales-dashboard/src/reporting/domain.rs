use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::coerce::{blank_as_none, lenient_amount, lenient_count, lenient_flag};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a producer's daily activity entry.
    EntryId
);
string_id!(
    /// Identifier of a producer (agent) on the sales floor.
    ProducerId
);
string_id!(
    /// Identifier of a prospective household being quoted.
    LeadId
);

/// A producer's activity record for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub id: EntryId,
    pub producer_id: ProducerId,
    pub entry_date: NaiveDate,
}

/// One lead-level quoting event, possibly closed into a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedHousehold {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<String>,
    pub daily_entry_id: EntryId,
    pub lead_id: LeadId,
    #[serde(default, deserialize_with = "lenient_count")]
    pub lines_quoted: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub items_sold: Option<u32>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quoted_premium: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub zip_code: Option<String>,
}

impl QuotedHousehold {
    pub fn lines(&self) -> u32 {
        self.lines_quoted.unwrap_or(0)
    }

    pub fn items(&self) -> u32 {
        self.items_sold.unwrap_or(0)
    }

    pub fn premium(&self) -> f64 {
        self.quoted_premium.unwrap_or(0.0)
    }

    pub fn is_sold(&self) -> bool {
        self.items() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: ProducerId,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub display_name: Option<String>,
    #[serde(default = "default_active", deserialize_with = "lenient_flag")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Label used when a producer's display name cannot be resolved.
pub const UNKNOWN_PRODUCER: &str = "Unknown";

/// Per-producer totals for a date range, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerMetrics {
    pub producer_id: ProducerId,
    pub producer_name: String,
    pub qhh: u32,
    pub quotes: u32,
    pub sales: u32,
    pub items: u32,
    pub premium: f64,
    pub close_rate: f64,
}

/// Traffic-light status of a zip code's quoting activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZipHealth {
    Green,
    Yellow,
    Red,
}

impl ZipHealth {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Healthy",
            Self::Yellow => "Watch",
            Self::Red => "Needs Attention",
        }
    }
}

/// Per-zip totals for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipMetrics {
    pub zip_code: String,
    pub quotes: u32,
    pub sales: u32,
    pub items: u32,
    pub premium: f64,
    pub conversion_rate: f64,
    pub health: ZipHealth,
}

/// Percentage of `part` over `whole`, zero when `whole` is zero.
pub(crate) fn rate_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
