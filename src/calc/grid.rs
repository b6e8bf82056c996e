use crate::calc::date_index::{DateIndex, DateKey};
use crate::calc::navigation::{ViewMode, ViewState};
use crate::data::Ticket;
use chrono::{Datelike, Duration, NaiveDate};

/// Tickets shown by title in a week column before collapsing into "+N more".
pub const WEEK_PREVIEW_LEN: usize = 3;
/// Highest count still drawn as one dot per ticket.
pub const MAX_INDIVIDUAL_DOTS: usize = 3;
/// Dots drawn on a year-view month card at most.
pub const MAX_MONTH_DOTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_current_period: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub ticket_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthSummary {
    /// First day of the month.
    pub month: NaiveDate,
    pub ticket_days: usize,
    pub total_tickets: usize,
    pub is_current_month: bool,
}

impl MonthSummary {
    pub fn dots(&self) -> usize {
        self.ticket_days.min(MAX_MONTH_DOTS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridBody {
    Days(Vec<GridCell>),
    Months(Vec<MonthSummary>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarGrid {
    pub title: String,
    pub body: GridBody,
}

impl CalendarGrid {
    pub fn days(&self) -> &[GridCell] {
        match &self.body {
            GridBody::Days(cells) => cells,
            GridBody::Months(_) => &[],
        }
    }

    pub fn months(&self) -> &[MonthSummary] {
        match &self.body {
            GridBody::Months(months) => months,
            GridBody::Days(_) => &[],
        }
    }
}

/// Derives everything a view needs to draw. Cheap enough to call every frame.
pub fn build_grid(state: &ViewState, index: &DateIndex, today: NaiveDate) -> CalendarGrid {
    let anchor = state.anchor;
    match state.mode {
        ViewMode::Month => {
            let (start, end) = month_range(anchor);
            let cells = day_cells(start, end, state, index, today, |d| {
                d.month() == anchor.month() && d.year() == anchor.year()
            });
            CalendarGrid {
                title: month_title(anchor),
                body: GridBody::Days(cells),
            }
        }
        ViewMode::Week => {
            let (start, end) = week_range(anchor);
            let cells = day_cells(start, end, state, index, today, |_| true);
            CalendarGrid {
                title: week_title(anchor),
                body: GridBody::Days(cells),
            }
        }
        ViewMode::Day => {
            let cells = day_cells(anchor, anchor, state, index, today, |_| true);
            CalendarGrid {
                title: anchor.format("%A, %B %-d, %Y").to_string(),
                body: GridBody::Days(cells),
            }
        }
        ViewMode::Year => CalendarGrid {
            title: anchor.year().to_string(),
            body: GridBody::Months(year_summaries(anchor.year(), index, today)),
        },
    }
}

fn day_cells(
    start: NaiveDate,
    end: NaiveDate,
    state: &ViewState,
    index: &DateIndex,
    today: NaiveDate,
    in_period: impl Fn(NaiveDate) -> bool,
) -> Vec<GridCell> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| GridCell {
            date,
            in_current_period: in_period(date),
            is_today: date == today,
            is_selected: state.selected == Some(date),
            ticket_count: index.count(DateKey::new(date)),
        })
        .collect()
}

fn year_summaries(year: i32, index: &DateIndex, today: NaiveDate) -> Vec<MonthSummary> {
    (1..=12)
        .filter_map(|m| NaiveDate::from_ymd_opt(year, m, 1))
        .map(|month| {
            let (ticket_days, total_tickets) = index.month_totals(year, month.month());
            MonthSummary {
                month,
                ticket_days,
                total_tickets,
                is_current_month: today.year() == year && today.month() == month.month(),
            }
        })
        .collect()
}

pub fn month_title(anchor: NaiveDate) -> String {
    format!("{} {}", month_name(anchor.month()), anchor.year())
}

pub fn week_title(anchor: NaiveDate) -> String {
    let (start, end) = week_range(anchor);
    format!("{} – {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
}

/// The Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as i64;
    date.checked_sub_signed(Duration::days(offset)).unwrap_or(date)
}

/// Sunday through Saturday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = start_of_week(date);
    let end = start.checked_add_signed(Duration::days(6)).unwrap_or(start);
    (start, end)
}

/// Full weeks covering the month of `date`.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = date
        .with_day(days_in_month(date.year(), date.month()))
        .unwrap_or(date);
    (start_of_week(first), week_range(last).1)
}

// ── Indicators ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dot {
    Primary,
    Secondary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotIndicator {
    pub dots: Vec<Dot>,
    /// Rendered as `+N` next to the dots.
    pub overflow: Option<usize>,
}

impl DotIndicator {
    pub fn badge(&self) -> Option<String> {
        self.overflow.map(|n| format!("+{n}"))
    }
}

/// Up to three tickets get one dot each. Busier days collapse to a primary
/// and a secondary dot plus a `+{count - 2}` badge.
pub fn dot_indicator(count: usize) -> Option<DotIndicator> {
    match count {
        0 => None,
        n if n <= MAX_INDIVIDUAL_DOTS => Some(DotIndicator {
            dots: vec![Dot::Primary; n],
            overflow: None,
        }),
        n => Some(DotIndicator {
            dots: vec![Dot::Primary, Dot::Secondary],
            overflow: Some(n - 2),
        }),
    }
}

/// Titles listed in a week column plus the "+N more" remainder.
pub fn week_preview(tickets: &[Ticket]) -> (&[Ticket], Option<usize>) {
    if tickets.len() > WEEK_PREVIEW_LEN {
        (&tickets[..WEEK_PREVIEW_LEN], Some(tickets.len() - WEEK_PREVIEW_LEN))
    } else {
        (tickets, None)
    }
}

// ── Calendar helpers ──────────────────────────────────────────────────────────

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
        NaiveDate::from_ymd_opt(year, month, 1),
    ) {
        (Some(next), Some(first)) => next.signed_duration_since(first).num_days() as u32,
        _ => 30,
    }
}

/// Shifts by whole months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let new_year = total.div_euclid(12);
    let new_month = (total.rem_euclid(12) + 1) as u32;
    let new_day = date.day().min(days_in_month(new_year, new_month));
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn state(anchor: NaiveDate, mode: ViewMode) -> ViewState {
        ViewState {
            anchor,
            mode,
            selected: None,
        }
    }

    fn index_with(days: &[(NaiveDate, usize)]) -> DateIndex {
        let mut tickets = Vec::new();
        for (date, n) in days {
            for i in 0..*n {
                let ts = date.and_hms_opt(12, 0, 0).unwrap().and_utc();
                tickets.push(Ticket::new(&format!("{date}-{i}"), "t", ts));
            }
        }
        DateIndex::build_in(&tickets, &Utc)
    }

    // ── month view ────────────────────────────────────────────────────────────

    #[test]
    fn test_month_grid_covers_full_weeks_for_many_anchors() {
        let index = DateIndex::default();
        let mut anchor = d(2023, 1, 15);
        while anchor < d(2026, 1, 1) {
            let grid = build_grid(&state(anchor, ViewMode::Month), &index, d(2024, 1, 1));
            let days = grid.days();
            assert_eq!(days.len() % 7, 0, "anchor {anchor}");
            assert_eq!(days[0].date.weekday(), Weekday::Sun);
            assert_eq!(days[days.len() - 1].date.weekday(), Weekday::Sat);
            let in_month = days.iter().filter(|c| c.in_current_period).count();
            assert_eq!(in_month as u32, days_in_month(anchor.year(), anchor.month()));
            anchor = add_months(anchor, 1);
        }
    }

    #[test]
    fn test_month_grid_march_2024() {
        let grid = build_grid(&state(d(2024, 3, 15), ViewMode::Month), &DateIndex::default(), d(2024, 3, 15));
        assert_eq!(grid.title, "March 2024");
        let days = grid.days();
        // 2024-03-01 is a Friday.
        assert_eq!(days[0].date, d(2024, 2, 25));
        assert_eq!(days[days.len() - 1].date, d(2024, 4, 6));
        assert_eq!(days.len(), 42);
        assert!(!days[0].in_current_period);
        assert!(days.iter().find(|c| c.date == d(2024, 3, 15)).unwrap().is_today);
    }

    #[test]
    fn test_month_grid_exact_four_weeks() {
        // February 2015 starts on Sunday and ends on Saturday.
        let grid = build_grid(&state(d(2015, 2, 10), ViewMode::Month), &DateIndex::default(), d(2015, 2, 10));
        assert_eq!(grid.days().len(), 28);
        assert!(grid.days().iter().all(|c| c.in_current_period));
    }

    #[test]
    fn test_month_grid_marks_counts_and_selection() {
        let index = index_with(&[(d(2024, 3, 15), 2), (d(2024, 3, 20), 5)]);
        let mut s = state(d(2024, 3, 1), ViewMode::Month);
        s.selected = Some(d(2024, 3, 20));
        let grid = build_grid(&s, &index, d(2024, 1, 1));
        let cell = |date: NaiveDate| *grid.days().iter().find(|c| c.date == date).unwrap();
        assert_eq!(cell(d(2024, 3, 15)).ticket_count, 2);
        assert_eq!(cell(d(2024, 3, 20)).ticket_count, 5);
        assert!(cell(d(2024, 3, 20)).is_selected);
        assert!(!cell(d(2024, 3, 15)).is_selected);
        assert_eq!(cell(d(2024, 3, 16)).ticket_count, 0);
        assert!(grid.days().iter().all(|c| !c.is_today));
    }

    // ── week / day / year ────────────────────────────────────────────────────

    #[test]
    fn test_week_grid_for_sunday_anchor() {
        let grid = build_grid(&state(d(2024, 3, 10), ViewMode::Week), &DateIndex::default(), d(2024, 3, 12));
        let dates: Vec<_> = grid.days().iter().map(|c| c.date).collect();
        let expected: Vec<_> = (10..=16).map(|day| d(2024, 3, day)).collect();
        assert_eq!(dates, expected);
        assert_eq!(grid.title, "Mar 10 – Mar 16, 2024");
        assert!(grid.days()[2].is_today);
    }

    #[test]
    fn test_week_grid_mid_week_anchor_spanning_years() {
        let grid = build_grid(&state(d(2025, 1, 1), ViewMode::Week), &DateIndex::default(), d(2025, 1, 1));
        assert_eq!(grid.days()[0].date, d(2024, 12, 29));
        assert_eq!(grid.days()[6].date, d(2025, 1, 4));
        assert_eq!(grid.title, "Dec 29 – Jan 4, 2025");
    }

    #[test]
    fn test_day_grid_single_cell() {
        let index = index_with(&[(d(2024, 3, 15), 4)]);
        let grid = build_grid(&state(d(2024, 3, 15), ViewMode::Day), &index, d(2024, 3, 1));
        assert_eq!(grid.title, "Friday, March 15, 2024");
        assert_eq!(grid.days().len(), 1);
        assert_eq!(grid.days()[0].ticket_count, 4);
        assert!(grid.months().is_empty());
    }

    #[test]
    fn test_year_grid_summarises_each_month() {
        let index = index_with(&[
            (d(2024, 3, 15), 2),
            (d(2024, 3, 20), 1),
            (d(2024, 12, 31), 3),
            (d(2025, 1, 1), 9),
        ]);
        let grid = build_grid(&state(d(2024, 6, 1), ViewMode::Year), &index, d(2024, 3, 2));
        assert_eq!(grid.title, "2024");
        let months = grid.months();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].month, d(2024, 1, 1));
        assert_eq!(months[2].ticket_days, 2);
        assert_eq!(months[2].total_tickets, 3);
        assert!(months[2].is_current_month);
        assert_eq!(months[11].total_tickets, 3);
        assert_eq!(months[0].total_tickets, 0);
        assert!(grid.days().is_empty());
    }

    #[test]
    fn test_month_summary_dots_cap_at_five() {
        let summary = MonthSummary {
            month: d(2024, 1, 1),
            ticket_days: 9,
            total_tickets: 20,
            is_current_month: false,
        };
        assert_eq!(summary.dots(), 5);
    }

    // ── indicators ────────────────────────────────────────────────────────────

    #[test]
    fn test_dot_indicator_none_for_empty_day() {
        assert_eq!(dot_indicator(0), None);
    }

    #[test]
    fn test_dot_indicator_one_dot_per_ticket_up_to_three() {
        let one = dot_indicator(1).unwrap();
        assert_eq!(one.dots, vec![Dot::Primary]);
        assert_eq!(one.badge(), None);
        let three = dot_indicator(3).unwrap();
        assert_eq!(three.dots.len(), 3);
        assert_eq!(three.badge(), None);
    }

    #[test]
    fn test_dot_indicator_overflow_subtracts_two() {
        let four = dot_indicator(4).unwrap();
        assert_eq!(four.dots, vec![Dot::Primary, Dot::Secondary]);
        assert_eq!(four.badge().as_deref(), Some("+2"));
        let ten = dot_indicator(10).unwrap();
        assert_eq!(ten.dots.len(), 2);
        assert_eq!(ten.badge().as_deref(), Some("+8"));
    }

    #[test]
    fn test_week_preview_limits_titles() {
        let ts = d(2024, 3, 15).and_hms_opt(9, 0, 0).unwrap().and_utc();
        let tickets: Vec<Ticket> = (0..5).map(|i| Ticket::new(&i.to_string(), "t", ts)).collect();
        let (shown, more) = week_preview(&tickets);
        assert_eq!(shown.len(), 3);
        assert_eq!(more, Some(2));
        let (shown, more) = week_preview(&tickets[..3]);
        assert_eq!(shown.len(), 3);
        assert_eq!(more, None);
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_start_of_week_is_sunday() {
        assert_eq!(start_of_week(d(2024, 3, 13)), d(2024, 3, 10));
        assert_eq!(start_of_week(d(2024, 3, 10)), d(2024, 3, 10));
        assert_eq!(start_of_week(d(2024, 3, 16)), d(2024, 3, 10));
    }

    #[test]
    fn test_add_months_forward_and_backward() {
        assert_eq!(add_months(d(2025, 1, 15), 1), d(2025, 2, 15));
        assert_eq!(add_months(d(2025, 11, 15), 3), d(2026, 2, 15));
        assert_eq!(add_months(d(2025, 1, 15), -1), d(2024, 12, 15));
    }

    #[test]
    fn test_add_months_clamps_month_end() {
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2024, 2, 29), 12), d(2025, 2, 28));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
