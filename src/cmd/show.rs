use crate::data::{Persistable, Ticket, TicketData};
use anyhow::{bail, Result};
use chrono::Local;

pub fn run(id: &str) -> Result<()> {
    let source = super::ticket_source()?;
    let data = TicketData::load_path(source.path())?;
    let Some(ticket) = data.find(id) else {
        bail!("Ticket '{}' not found.", id);
    };
    write_ticket(ticket, &mut std::io::stdout())
}

pub(crate) fn write_ticket<W: std::io::Write>(ticket: &Ticket, out: &mut W) -> Result<()> {
    let created = ticket.created_at.with_timezone(&Local);
    writeln!(out, "Ticket {}", ticket.id)?;
    writeln!(out, "---")?;
    writeln!(out, "{:<12} {}", "Title:", ticket.title)?;
    writeln!(out, "{:<12} {}", "Status:", ticket.status)?;
    writeln!(out, "{:<12} {}", "Priority:", ticket.priority)?;
    writeln!(out, "{:<12} {}", "Category:", ticket.category_label())?;
    writeln!(out, "{:<12} {}", "Created:", created.format("%B %-d, %Y %-I:%M %p"))?;
    writeln!(out, "---")?;
    Ok(())
}
