use crate::data::{Ticket, TicketQuery, TicketSort, TicketSource};
use anyhow::Result;
use chrono::Local;

pub fn run(oldest_first: bool) -> Result<()> {
    let mut query = TicketQuery::calendar();
    if oldest_first {
        query.sort = TicketSort::OldestFirst;
    }
    let page = super::ticket_source()?.fetch(&query)?;
    write_tickets(&page.data, page.total, &mut std::io::stdout())
}

pub(crate) fn write_tickets<W: std::io::Write>(
    tickets: &[Ticket],
    total: usize,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Tickets")?;
    writeln!(out, "---")?;
    writeln!(
        out,
        "  {:<12} {:<18} {:<8} {:<12} {}",
        "ID", "Created", "Priority", "Status", "Title"
    )?;
    for t in tickets {
        writeln!(
            out,
            "  {:<12} {:<18} {:<8} {:<12} {}",
            t.id,
            t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            t.priority,
            t.status,
            t.title
        )?;
    }
    writeln!(out, "---")?;
    if tickets.len() < total {
        writeln!(out, "Showing {} of {} ticket(s)", tickets.len(), total)?;
    } else {
        writeln!(out, "Total: {} ticket(s)", tickets.len())?;
    }
    Ok(())
}
