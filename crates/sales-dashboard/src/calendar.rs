//! Agency calendar anchored to America/Chicago.
//!
//! Every "today", cutoff, and week boundary is computed in the agency's civil
//! timezone regardless of where the caller runs, so a producer in Denver and a
//! manager in Atlanta see the same entry day.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Civil timezone every dashboard date is interpreted in.
pub const AGENCY_TIMEZONE: Tz = chrono_tz::America::Chicago;

/// Entries for a calendar day lock once this local time has passed.
const SUBMISSION_CUTOFF_HOUR: u32 = 18;

/// The day the entry form moved to same-day logging. Producers opening the
/// form on that date were still catching up on the previous day.
const ENTRY_DATE_CUTOVER: (i32, u32, u32) = (2025, 11, 3);

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant, for reports pinned to a date and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Date helpers evaluated against an injected clock in the agency timezone.
#[derive(Debug, Clone)]
pub struct AgencyCalendar<C = SystemClock> {
    clock: C,
    timezone: Tz,
}

impl AgencyCalendar<SystemClock> {
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl Default for AgencyCalendar<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: Clock> AgencyCalendar<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            timezone: AGENCY_TIMEZONE,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn yesterday(&self) -> NaiveDate {
        let today = self.today();
        today.pred_opt().unwrap_or(today)
    }

    /// Whether the 6 PM cutoff for `date` (a `YYYY-MM-DD` string) has passed
    /// in the agency timezone. Malformed input never locks an entry.
    pub fn is_past_six_pm(&self, date: &str) -> bool {
        let Ok(day) = parse_date(date) else {
            return false;
        };
        self.is_past_cutoff(day)
    }

    pub fn is_past_cutoff(&self, day: NaiveDate) -> bool {
        let Some(cutoff_time) = NaiveTime::from_hms_opt(SUBMISSION_CUTOFF_HOUR, 0, 0) else {
            return false;
        };
        match self
            .timezone
            .from_local_datetime(&day.and_time(cutoff_time))
            .earliest()
        {
            Some(cutoff) => self.now() > cutoff,
            None => false,
        }
    }

    /// Date the entry form should open on.
    pub fn default_entry_date(&self) -> NaiveDate {
        let today = self.today();
        if Some(today) == entry_date_cutover() {
            return today.pred_opt().unwrap_or(today);
        }
        today
    }

    /// Monday through Sunday of the week containing today.
    pub fn current_week(&self) -> DateRange {
        let today = self.today();
        let offset = u64::from(today.weekday().num_days_from_monday());
        let monday = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
        let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
        DateRange {
            from: monday,
            to: sunday,
        }
    }
}

fn entry_date_cutover() -> Option<NaiveDate> {
    let (year, month, day) = ENTRY_DATE_CUTOVER;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

/// Short label used in leaderboard headers, e.g. `Oct 6, 2025`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Inclusive range of whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn parse(from: &str, to: &str) -> Result<Self, DateRangeError> {
        let from = parse_date(from).map_err(|_| DateRangeError::InvalidDate {
            field: "from",
            value: from.to_string(),
        })?;
        let to = parse_date(to).map_err(|_| DateRangeError::InvalidDate {
            field: "to",
            value: to.to_string(),
        })?;
        Self::new(from, to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn label(&self) -> String {
        if self.from == self.to {
            format_display(self.from)
        } else {
            format!("{} to {}", format_display(self.from), format_display(self.to))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("{field} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("range start {from} is after range end {to}")]
    Inverted { from: NaiveDate, to: NaiveDate },
}
