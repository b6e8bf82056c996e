use crate::calc::grid::{month_name, month_range, week_range};
use crate::calc::{
    build_grid, dot_indicator, week_preview, CalendarGrid, DateIndex, DateKey, Direction, Dot,
    GridCell, MonthSummary, NavigationController, ViewMode, ViewState,
};
use crate::data::{Ticket, TicketQuery, TicketSource};
use crate::ui::status_badge::{priority_color, status_badge};
use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::fmt;
use std::io::Stdout;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

const PRIMARY_DOT: Color = Color::LightBlue;
const SECONDARY_DOT: Color = Color::Indexed(214); // amber
const HEADER_BG: Color = Color::Rgb(40, 44, 52);
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// User intents understood by the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    SetView(ViewMode),
    Advance(Direction),
    Today,
    SelectDay(NaiveDate),
    SelectMonth(NaiveDate),
    ClearSelection,
    OpenTicket(String),
    Close,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
enum Focus {
    #[default]
    Grid,
    Detail,
}

/// Current instant. Read on every render and on `Today`.
pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct CalendarModal<Tz: TimeZone = Local> {
    nav: NavigationController,
    index: DateIndex,
    /// Zone that decides which calendar day a ticket and "today" fall on.
    tz: Tz,
    clock: Clock,
    /// Keyboard position inside the visible period. A day, or the first of a
    /// month in year view.
    cursor: NaiveDate,
    focus: Focus,
    /// Highlighted row of the selected day's ticket list.
    detail_cursor: usize,
    is_open: bool,
    /// Ticket chosen in the detail panel, handed to the router after close.
    pending_ticket: Option<String>,
}

impl CalendarModal<Local> {
    pub fn new() -> Self {
        Self::with_clock(Local, Box::new(Utc::now))
    }
}

impl Default for CalendarModal<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> CalendarModal<Tz>
where
    Tz::Offset: fmt::Display,
{
    pub fn with_clock(tz: Tz, clock: Clock) -> Self {
        let today = clock().with_timezone(&tz).date_naive();
        CalendarModal {
            nav: NavigationController::new(today),
            index: DateIndex::default(),
            tz,
            clock,
            cursor: today,
            focus: Focus::Grid,
            detail_cursor: 0,
            is_open: false,
            pending_ticket: None,
        }
    }

    /// Resets the view to today's month and requests the ticket window.
    /// A failed request leaves the calendar empty.
    pub fn open(&mut self, source: &dyn TicketSource) {
        let today = self.today();
        self.nav = NavigationController::new(today);
        self.cursor = today;
        self.focus = Focus::Grid;
        self.pending_ticket = None;
        self.is_open = true;

        let query = TicketQuery::calendar();
        let tickets = match source.fetch(&query) {
            Ok(page) => page.data,
            Err(e) => {
                warn!(error = %e, "ticket fetch failed; showing empty calendar");
                Vec::new()
            }
        };
        self.set_tickets(&tickets);
        info!(
            limit = query.limit,
            sort = query.sort.as_param(),
            received = tickets.len(),
            days = self.index.len(),
            "calendar opened"
        );
    }

    /// Replaces the ticket list. The index is rebuilt from scratch.
    pub fn set_tickets(&mut self, tickets: &[Ticket]) {
        self.index = DateIndex::build_in(tickets, &self.tz);
        self.clamp_detail_cursor();
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn state(&self) -> &ViewState {
        self.nav.state()
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)().with_timezone(&self.tz).date_naive()
    }

    pub fn grid(&self) -> CalendarGrid {
        build_grid(self.state(), &self.index, self.today())
    }

    pub fn selected_tickets(&self) -> &[Ticket] {
        match self.state().selected {
            Some(date) => self.index.lookup(DateKey::new(date)),
            None => &[],
        }
    }

    /// The ticket id chosen before closing, if any.
    pub fn take_pending_ticket(&mut self) -> Option<String> {
        self.pending_ticket.take()
    }

    /// Applies one event. Returns true once the calendar has closed.
    pub fn handle_event(&mut self, ev: ModalEvent) -> bool {
        match ev {
            ModalEvent::SetView(mode) => {
                self.nav.set_view_mode(mode);
                self.sync_cursor();
            }
            ModalEvent::Advance(dir) => {
                self.nav.advance(dir);
                self.sync_cursor();
            }
            ModalEvent::Today => {
                let today = self.today();
                self.nav.jump_to_today(today);
                self.sync_cursor();
            }
            ModalEvent::SelectDay(date) => {
                let previous = self.state().selected;
                if self.nav.select_day(date, &self.index) && previous != Some(date) {
                    self.detail_cursor = 0;
                }
            }
            ModalEvent::SelectMonth(date) => {
                self.nav.select_month(date);
                self.sync_cursor();
            }
            ModalEvent::ClearSelection => {
                self.nav.clear_selection();
                self.focus = Focus::Grid;
                self.detail_cursor = 0;
            }
            ModalEvent::OpenTicket(id) => {
                info!(ticket = %id, "navigating to ticket");
                self.pending_ticket = Some(id);
                self.close();
            }
            ModalEvent::Close => self.close(),
        }
        !self.is_open
    }

    fn close(&mut self) {
        self.is_open = false;
        info!("calendar closed");
    }

    /// Returns true if the calendar should close.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_event(ModalEvent::Close);
        }
        match self.focus {
            Focus::Detail => self.handle_detail_key(code),
            Focus::Grid => self.handle_grid_key(code),
        }
    }

    fn handle_grid_key(&mut self, code: KeyCode) -> bool {
        let ev = match code {
            KeyCode::Char('m') => ModalEvent::SetView(ViewMode::Month),
            KeyCode::Char('w') => ModalEvent::SetView(ViewMode::Week),
            KeyCode::Char('d') => ModalEvent::SetView(ViewMode::Day),
            KeyCode::Char('y') => ModalEvent::SetView(ViewMode::Year),
            KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => {
                ModalEvent::Advance(Direction::Next)
            }
            KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => {
                ModalEvent::Advance(Direction::Prev)
            }
            KeyCode::Char('t') => ModalEvent::Today,
            KeyCode::Left => return self.move_cursor(-1),
            KeyCode::Right => return self.move_cursor(1),
            KeyCode::Up => return self.move_cursor(-self.row_step()),
            KeyCode::Down => return self.move_cursor(self.row_step()),
            KeyCode::Enter => match self.state().mode {
                ViewMode::Year => ModalEvent::SelectMonth(self.cursor),
                ViewMode::Day => ModalEvent::SelectDay(self.state().anchor),
                ViewMode::Month | ViewMode::Week => ModalEvent::SelectDay(self.cursor),
            },
            KeyCode::Tab => {
                if !self.selected_tickets().is_empty() {
                    self.focus = Focus::Detail;
                    self.clamp_detail_cursor();
                }
                return false;
            }
            KeyCode::Esc => {
                if self.state().selected.is_some() {
                    ModalEvent::ClearSelection
                } else {
                    ModalEvent::Close
                }
            }
            KeyCode::Char('q') => ModalEvent::Close,
            _ => return false,
        };
        self.handle_event(ev)
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> bool {
        let len = self.selected_tickets().len();
        match code {
            KeyCode::Up => {
                self.detail_cursor = self.detail_cursor.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                if self.detail_cursor + 1 < len {
                    self.detail_cursor += 1;
                }
                false
            }
            KeyCode::Enter => {
                let chosen = self
                    .selected_tickets()
                    .get(self.detail_cursor)
                    .map(|t| t.id.clone());
                match chosen {
                    Some(id) => self.handle_event(ModalEvent::OpenTicket(id)),
                    None => false,
                }
            }
            KeyCode::Tab => {
                self.focus = Focus::Grid;
                false
            }
            KeyCode::Esc => self.handle_event(ModalEvent::ClearSelection),
            KeyCode::Char('q') => self.handle_event(ModalEvent::Close),
            _ => false,
        }
    }

    /// Cursor step for Up/Down: one week in day grids, one row of the
    /// three-column month grid in year view.
    fn row_step(&self) -> i64 {
        match self.state().mode {
            ViewMode::Year => 3,
            _ => 7,
        }
    }

    fn move_cursor(&mut self, step: i64) -> bool {
        let state = self.nav.state();
        self.cursor = match state.mode {
            ViewMode::Month | ViewMode::Week => {
                let (start, end) = visible_range(state);
                self.cursor
                    .checked_add_signed(Duration::days(step))
                    .unwrap_or(self.cursor)
                    .clamp(start, end)
            }
            ViewMode::Year => {
                let month0 = (self.cursor.month0() as i64 + step).clamp(0, 11) as u32;
                NaiveDate::from_ymd_opt(state.anchor.year(), month0 + 1, 1).unwrap_or(self.cursor)
            }
            ViewMode::Day => self.cursor,
        };
        false
    }

    /// Puts the cursor back on the anchor after the visible period changes.
    fn sync_cursor(&mut self) {
        let state = self.nav.state();
        self.cursor = match state.mode {
            ViewMode::Year => state.anchor.with_day(1).unwrap_or(state.anchor),
            _ => state.anchor,
        };
    }

    fn clamp_detail_cursor(&mut self) {
        let len = self.selected_tickets().len();
        if self.detail_cursor >= len {
            self.detail_cursor = len.saturating_sub(1);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn render(&self, f: &mut Frame) {
        let grid = self.grid();
        let selected = self.selected_tickets();
        let detail_height = if selected.is_empty() {
            0
        } else {
            (selected.len() as u16).min(8) + 3
        };

        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3),             // header + view tabs
                Constraint::Length(1),             // period title
                Constraint::Min(8),                // view body
                Constraint::Length(detail_height), // selected day
                Constraint::Length(1),             // key help
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_period_title(f, chunks[1], &grid.title);
        match self.state().mode {
            ViewMode::Month => self.render_month(f, chunks[2], grid.days()),
            ViewMode::Week => self.render_week(f, chunks[2], grid.days()),
            ViewMode::Day => self.render_day(f, chunks[2]),
            ViewMode::Year => self.render_year(f, chunks[2], grid.months()),
        }
        if !selected.is_empty() {
            self.render_detail(f, chunks[3], selected);
        }
        self.render_help(f, chunks[4]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mode = self.state().mode;
        let mut spans = vec![Span::styled(
            " Calendar ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )];
        spans.push(Span::styled(" [t] Today ", Style::default().fg(Color::LightBlue)));
        spans.push(Span::raw("   "));
        for m in ViewMode::ALL {
            let style = if m == mode {
                Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ", m.label()), style));
            spans.push(Span::raw(" "));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).style(Style::default().bg(HEADER_BG)));
        f.render_widget(header, area);
    }

    fn render_period_title(&self, f: &mut Frame, area: Rect, title: &str) {
        let line = Line::from(vec![
            Span::styled("◀ p  ", Style::default().fg(Color::DarkGray)),
            Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("  n ▶", Style::default().fg(Color::DarkGray)),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_month(&self, f: &mut Frame, area: Rect, cells: &[GridCell]) {
        let header = Row::new(WEEKDAYS.iter().map(|d| {
            Cell::from(Line::from(*d).alignment(Alignment::Center))
                .style(Style::default().fg(Color::DarkGray))
        }));
        let rows: Vec<Row> = cells
            .chunks(7)
            .map(|week| {
                Row::new(week.iter().map(|cell| {
                    let style = day_style(cell, cell.date == self.cursor);
                    let mut lines = vec![Line::from(format!("{}", cell.date.day()))];
                    lines.push(dot_line(cell.ticket_count, cell.is_selected));
                    Cell::from(Text::from(lines).alignment(Alignment::Center)).style(style)
                }))
                .height(2)
            })
            .collect();
        let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
            .header(header)
            .column_spacing(1);
        f.render_widget(table, area);
    }

    fn render_week(&self, f: &mut Frame, area: Rect, cells: &[GridCell]) {
        let header = Row::new(cells.iter().map(|cell| {
            let style = day_style(cell, cell.date == self.cursor);
            Cell::from(Text::from(vec![
                Line::from(cell.date.format("%a").to_string()),
                Line::from(cell.date.day().to_string()),
            ]))
            .style(style)
        }))
        .height(2);
        let body = Row::new(cells.iter().map(|cell| {
            let tickets = self.index.lookup(DateKey::new(cell.date));
            let (shown, more) = week_preview(tickets);
            let mut lines: Vec<Line> = shown
                .iter()
                .map(|t| Line::styled(t.title.clone(), Style::default().fg(PRIMARY_DOT)))
                .collect();
            if let Some(more) = more {
                lines.push(Line::styled(
                    format!("+{more} more"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let cell_style = if cell.is_selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Cell::from(Text::from(lines)).style(cell_style)
        }))
        .height(5);
        let table = Table::new(vec![body], [Constraint::Ratio(1, 7); 7])
            .header(header)
            .column_spacing(1)
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(table, area);
    }

    fn render_day(&self, f: &mut Frame, area: Rect) {
        let anchor = self.state().anchor;
        let tickets = self.index.lookup(DateKey::new(anchor));

        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let day_style = if anchor == self.today() {
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let mut summary = vec![
            Line::styled(anchor.day().to_string(), day_style),
            Line::styled(
                anchor.format("%A, %B %Y").to_string(),
                Style::default().fg(Color::Gray),
            ),
        ];
        if !tickets.is_empty() {
            summary.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(PRIMARY_DOT)),
                Span::raw(ticket_count_label(tickets.len())),
            ]));
        }
        f.render_widget(Paragraph::new(summary).alignment(Alignment::Center), chunks[0]);

        if tickets.is_empty() {
            let empty = Paragraph::new("No tickets on this day")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, chunks[1]);
            return;
        }

        let rows: Vec<Row> = tickets
            .iter()
            .map(|t| {
                Row::new(vec![
                    Cell::from(t.title.clone()),
                    Cell::from(format!("{} · {}", ticket_time(t, &self.tz), t.priority)),
                    Cell::from(status_badge(t.status)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [Constraint::Min(20), Constraint::Length(18), Constraint::Length(14)],
        )
        .block(Block::default().borders(Borders::TOP).title(" Enter select · Tab tickets "));
        f.render_widget(table, chunks[1]);
    }

    fn render_year(&self, f: &mut Frame, area: Rect, months: &[MonthSummary]) {
        let rows: Vec<Row> = months
            .chunks(3)
            .map(|row| {
                Row::new(row.iter().map(|m| {
                    let mut name_style = Style::default().add_modifier(Modifier::BOLD);
                    if m.is_current_month {
                        name_style = name_style.fg(Color::LightBlue);
                    }
                    let summary = if m.total_tickets > 0 {
                        Line::from(vec![
                            Span::styled("●".repeat(m.dots()), Style::default().fg(PRIMARY_DOT)),
                            Span::styled(
                                format!(" {} tickets", m.total_tickets),
                                Style::default().fg(Color::DarkGray),
                            ),
                        ])
                    } else {
                        Line::styled("No tickets", Style::default().fg(Color::DarkGray))
                    };
                    let mut cell_style = Style::default();
                    if m.month == self.cursor {
                        cell_style = cell_style.add_modifier(Modifier::REVERSED);
                    }
                    Cell::from(Text::from(vec![
                        Line::styled(month_name(m.month.month()), name_style),
                        summary,
                    ]))
                    .style(cell_style)
                }))
                .height(3)
            })
            .collect();
        let table = Table::new(rows, [Constraint::Ratio(1, 3); 3]).column_spacing(2);
        f.render_widget(table, area);
    }

    fn render_detail(&self, f: &mut Frame, area: Rect, tickets: &[Ticket]) {
        let Some(date) = self.state().selected else {
            return;
        };
        let rows: Vec<Row> = tickets
            .iter()
            .map(|t| {
                Row::new(vec![
                    Cell::from(t.title.clone()),
                    Cell::from(Span::styled(
                        t.priority.to_string(),
                        Style::default().fg(priority_color(t.priority)),
                    )),
                    Cell::from(t.category_label().to_string()),
                    Cell::from(ticket_time(t, &self.tz)),
                    Cell::from(status_badge(t.status)),
                ])
            })
            .collect();
        let border = if self.focus == Focus::Detail {
            Color::LightBlue
        } else {
            Color::DarkGray
        };
        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(7),
                Constraint::Length(16),
                Constraint::Length(9),
                Constraint::Length(14),
            ],
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" Tickets on {} ", date.format("%B %-d, %Y"))),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if self.focus == Focus::Detail {
            state.select(Some(self.detail_cursor));
        }
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let text = match self.focus {
            Focus::Grid => {
                "m/w/d/y view  n/p next/prev  t today  ←↑↓→ move  Enter select  Tab tickets  Esc back  q close"
            }
            Focus::Detail => "↑↓ choose  Enter open ticket  Tab calendar  Esc clear selection  q close",
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

/// First and last day shown by a day-based view.
fn visible_range(state: &ViewState) -> (NaiveDate, NaiveDate) {
    match state.mode {
        ViewMode::Month => month_range(state.anchor),
        ViewMode::Week => week_range(state.anchor),
        ViewMode::Day | ViewMode::Year => (state.anchor, state.anchor),
    }
}

/// Style for a day cell in month and week views.
pub(crate) fn day_style(cell: &GridCell, is_cursor: bool) -> Style {
    let mut style = if cell.is_selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD)
    } else if cell.is_today {
        Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
    } else if !cell.in_current_period {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    if is_cursor {
        style = style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED);
    }
    style
}

/// Dots (and `+N` badge) under a month-view day number.
fn dot_line(count: usize, selected: bool) -> Line<'static> {
    let Some(indicator) = dot_indicator(count) else {
        return Line::from("");
    };
    let mut spans: Vec<Span> = indicator
        .dots
        .iter()
        .map(|dot| {
            let color = match (selected, dot) {
                (true, _) => Color::White,
                (false, Dot::Primary) => PRIMARY_DOT,
                (false, Dot::Secondary) => SECONDARY_DOT,
            };
            Span::styled("●", Style::default().fg(color))
        })
        .collect();
    if let Some(badge) = indicator.badge() {
        let color = if selected { Color::White } else { Color::Gray };
        spans.push(Span::styled(
            badge,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn ticket_time<Tz: TimeZone>(ticket: &Ticket, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    ticket
        .created_at
        .with_timezone(tz)
        .format("%-I:%M %p")
        .to_string()
}

fn ticket_count_label(n: usize) -> String {
    if n == 1 {
        "1 ticket".to_string()
    } else {
        format!("{n} tickets")
    }
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    modal: &mut CalendarModal,
) -> Result<()> {
    while modal.is_open() {
        terminal.draw(|f| modal.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && modal.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
    }
    Ok(())
}
