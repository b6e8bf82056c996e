use crate::calc::date_index::{DateIndex, DateKey};
use crate::calc::grid::add_months;
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use tracing::debug;

/// Granularity of the calendar. Every mode can be reached from every other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
    Year,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::Month, ViewMode::Week, ViewMode::Day, ViewMode::Year];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Month => "Month",
            ViewMode::Week => "Week",
            ViewMode::Day => "Day",
            ViewMode::Year => "Year",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub anchor: NaiveDate,
    pub mode: ViewMode,
    pub selected: Option<NaiveDate>,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        ViewState {
            anchor: today,
            mode: ViewMode::Month,
            selected: None,
        }
    }
}

/// Owns the ViewState and applies user navigation to it.
#[derive(Debug, Clone)]
pub struct NavigationController {
    state: ViewState,
}

impl NavigationController {
    pub fn new(today: NaiveDate) -> Self {
        NavigationController {
            state: ViewState::new(today),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Moves the anchor by one unit of the current mode. Selection is kept.
    pub fn advance(&mut self, direction: Direction) {
        let step = match direction {
            Direction::Next => 1,
            Direction::Prev => -1,
        };
        let anchor = self.state.anchor;
        self.state.anchor = match self.state.mode {
            ViewMode::Month => add_months(anchor, step),
            ViewMode::Year => add_months(anchor, 12 * step),
            ViewMode::Week => anchor
                .checked_add_signed(Duration::weeks(step as i64))
                .unwrap_or(anchor),
            ViewMode::Day => anchor
                .checked_add_signed(Duration::days(step as i64))
                .unwrap_or(anchor),
        };
        debug!(mode = %self.state.mode, ?direction, anchor = %self.state.anchor, "advanced");
    }

    pub fn jump_to_today(&mut self, today: NaiveDate) {
        self.state.anchor = today;
    }

    /// Only days that have tickets can be selected. Returns whether the
    /// selection now points at `date`.
    pub fn select_day(&mut self, date: NaiveDate, index: &DateIndex) -> bool {
        if !index.has_tickets(DateKey::new(date)) {
            return false;
        }
        self.state.selected = Some(date);
        debug!(%date, "selected day");
        true
    }

    /// Drills down from the year view into the chosen month.
    pub fn select_month(&mut self, date: NaiveDate) {
        self.state.anchor = date.with_day(1).unwrap_or(date);
        self.state.mode = ViewMode::Month;
        debug!(anchor = %self.state.anchor, "drilled into month");
    }

    pub fn clear_selection(&mut self) {
        self.state.selected = None;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Ticket;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn index_on(dates: &[NaiveDate]) -> DateIndex {
        let tickets: Vec<Ticket> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                Ticket::new(&i.to_string(), "t", date.and_hms_opt(10, 0, 0).unwrap().and_utc())
            })
            .collect();
        DateIndex::build_in(&tickets, &Utc)
    }

    fn at(anchor: NaiveDate, mode: ViewMode) -> NavigationController {
        let mut nav = NavigationController::new(anchor);
        nav.set_view_mode(mode);
        nav
    }

    #[test]
    fn test_new_starts_on_today_in_month_view() {
        let nav = NavigationController::new(d(2024, 3, 15));
        assert_eq!(*nav.state(), ViewState {
            anchor: d(2024, 3, 15),
            mode: ViewMode::Month,
            selected: None,
        });
    }

    #[test]
    fn test_advance_by_unit_of_each_mode() {
        let start = d(2024, 3, 15);
        let cases = [
            (ViewMode::Month, d(2024, 4, 15), d(2024, 2, 15)),
            (ViewMode::Week, d(2024, 3, 22), d(2024, 3, 8)),
            (ViewMode::Day, d(2024, 3, 16), d(2024, 3, 14)),
            (ViewMode::Year, d(2025, 3, 15), d(2023, 3, 15)),
        ];
        for (mode, next, prev) in cases {
            let mut nav = at(start, mode);
            nav.advance(Direction::Next);
            assert_eq!(nav.state().anchor, next, "{mode} next");
            let mut nav = at(start, mode);
            nav.advance(Direction::Prev);
            assert_eq!(nav.state().anchor, prev, "{mode} prev");
        }
    }

    #[test]
    fn test_advance_year_keeps_mode() {
        let mut nav = at(d(2024, 6, 1), ViewMode::Year);
        nav.advance(Direction::Next);
        assert_eq!(nav.state().anchor, d(2025, 6, 1));
        assert_eq!(nav.state().mode, ViewMode::Year);
    }

    #[test]
    fn test_advance_month_clamps_to_shorter_month() {
        let mut nav = at(d(2024, 1, 31), ViewMode::Month);
        nav.advance(Direction::Next);
        assert_eq!(nav.state().anchor, d(2024, 2, 29));
    }

    #[test]
    fn test_advance_keeps_selection() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 15), ViewMode::Month);
        assert!(nav.select_day(d(2024, 3, 15), &index));
        nav.advance(Direction::Next);
        nav.advance(Direction::Next);
        assert_eq!(nav.state().selected, Some(d(2024, 3, 15)));
    }

    #[test]
    fn test_jump_to_today_keeps_mode_and_selection() {
        let index = index_on(&[d(2020, 1, 2)]);
        let mut nav = at(d(2020, 1, 1), ViewMode::Week);
        nav.select_day(d(2020, 1, 2), &index);
        nav.jump_to_today(d(2024, 3, 15));
        assert_eq!(nav.state().anchor, d(2024, 3, 15));
        assert_eq!(nav.state().mode, ViewMode::Week);
        assert_eq!(nav.state().selected, Some(d(2020, 1, 2)));
    }

    #[test]
    fn test_select_day_without_tickets_is_noop() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 1), ViewMode::Month);
        let before = *nav.state();
        assert!(!nav.select_day(d(2024, 3, 16), &index));
        assert_eq!(*nav.state(), before);
        assert!(!nav.select_day(d(2024, 3, 16), &index));
        assert_eq!(*nav.state(), before);
    }

    #[test]
    fn test_select_day_with_tickets_is_idempotent() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 1), ViewMode::Month);
        nav.select_day(d(2024, 3, 15), &index);
        let once = *nav.state();
        nav.select_day(d(2024, 3, 15), &index);
        assert_eq!(*nav.state(), once);
        assert_eq!(once.selected, Some(d(2024, 3, 15)));
    }

    #[test]
    fn test_select_empty_day_keeps_previous_selection() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 1), ViewMode::Month);
        nav.select_day(d(2024, 3, 15), &index);
        nav.select_day(d(2024, 3, 16), &index);
        assert_eq!(nav.state().selected, Some(d(2024, 3, 15)));
    }

    #[test]
    fn test_select_month_drills_into_month_view() {
        let mut nav = at(d(2024, 6, 18), ViewMode::Year);
        nav.select_month(d(2024, 9, 14));
        assert_eq!(nav.state().anchor, d(2024, 9, 1));
        assert_eq!(nav.state().mode, ViewMode::Month);
    }

    #[test]
    fn test_clear_selection() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 1), ViewMode::Month);
        nav.select_day(d(2024, 3, 15), &index);
        nav.clear_selection();
        assert_eq!(nav.state().selected, None);
    }

    #[test]
    fn test_view_mode_round_trip_preserves_anchor_and_selection() {
        let index = index_on(&[d(2024, 3, 15)]);
        let mut nav = at(d(2024, 3, 13), ViewMode::Month);
        nav.select_day(d(2024, 3, 15), &index);
        let before = *nav.state();
        nav.set_view_mode(ViewMode::Week);
        assert_eq!(nav.state().anchor, before.anchor);
        nav.set_view_mode(ViewMode::Month);
        assert_eq!(*nav.state(), before);
    }

    #[test]
    fn test_any_mode_reachable_from_any_other() {
        for from in ViewMode::ALL {
            for to in ViewMode::ALL {
                let mut nav = at(d(2024, 3, 15), from);
                nav.set_view_mode(to);
                assert_eq!(nav.state().mode, to);
            }
        }
    }
}
