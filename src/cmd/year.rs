use crate::calc::grid::month_name;
use crate::calc::{build_grid, DateIndex, MonthSummary, ViewMode, ViewState};
use crate::data::{TicketQuery, TicketSource};
use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDate};

pub fn run(year: i32) -> Result<()> {
    let Some(anchor) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        bail!("Year {} is out of range.", year);
    };
    let page = super::ticket_source()?.fetch(&TicketQuery::calendar())?;
    let index = DateIndex::build(&page.data);
    let state = ViewState {
        anchor,
        mode: ViewMode::Year,
        selected: None,
    };
    let grid = build_grid(&state, &index, Local::now().date_naive());
    write_year(&grid.title, grid.months(), &mut std::io::stdout())
}

pub(crate) fn write_year<W: std::io::Write>(
    title: &str,
    months: &[MonthSummary],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Year {}", title)?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<12} {:<12} {}", "Month", "Active Days", "Tickets")?;
    for m in months {
        writeln!(
            out,
            "  {:<12} {:<12} {}",
            month_name(m.month.month()),
            m.ticket_days,
            m.total_tickets
        )?;
    }
    writeln!(out, "---")?;
    writeln!(
        out,
        "Total: {} ticket(s)",
        months.iter().map(|m| m.total_tickets).sum::<usize>()
    )?;
    Ok(())
}
