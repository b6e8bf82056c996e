use crate::calc::grid::days_in_month;
use crate::data::Ticket;
use chrono::{DateTime, Local, NaiveDate, ParseError, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A calendar day used as a lookup key. Formats as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    /// The calendar day `ts` falls on as seen from `tz`.
    pub fn from_timestamp<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> Self {
        DateKey(ts.with_timezone(tz).date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(DateKey)
    }
}

/// Tickets grouped by the local calendar day they were created on.
#[derive(Debug, Default, Clone)]
pub struct DateIndex {
    buckets: HashMap<DateKey, Vec<Ticket>>,
}

impl DateIndex {
    /// Groups by day in the viewer's local time zone.
    pub fn build(tickets: &[Ticket]) -> Self {
        Self::build_in(tickets, &Local)
    }

    /// Groups by day in `tz`. Bucket order follows input order.
    pub fn build_in<Tz: TimeZone>(tickets: &[Ticket], tz: &Tz) -> Self {
        let mut buckets: HashMap<DateKey, Vec<Ticket>> = HashMap::new();
        for ticket in tickets {
            let key = DateKey::from_timestamp(&ticket.created_at, tz);
            buckets.entry(key).or_default().push(ticket.clone());
        }
        DateIndex { buckets }
    }

    pub fn lookup(&self, key: DateKey) -> &[Ticket] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, key: DateKey) -> usize {
        self.lookup(key).len()
    }

    pub fn has_tickets(&self, key: DateKey) -> bool {
        self.count(key) > 0
    }

    /// Number of distinct days with tickets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `(days with tickets, total tickets)` for one month.
    pub fn month_totals(&self, year: i32, month: u32) -> (usize, usize) {
        let mut ticket_days = 0;
        let mut total = 0;
        for day in 1..=days_in_month(year, month) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            let count = self.count(DateKey(date));
            if count > 0 {
                ticket_days += 1;
                total += count;
            }
        }
        (ticket_days, total)
    }
}
