use crate::cmd::show::write_ticket;
use crate::data::{Persistable, TicketData};
use crate::ui::calendar_view::{run_app, CalendarModal};
use crate::ui::{restore_terminal, setup_terminal, Router};
use anyhow::{bail, Result};
use std::io::Write;

pub fn run() -> Result<()> {
    let source = super::ticket_source()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen
        );
        original_hook(info);
    }));

    let mut modal = CalendarModal::new();
    modal.open(&source);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut modal);
    restore_terminal(&mut terminal)?;
    result?;

    // The calendar is closed by now; only then hand the ticket to the router.
    if let Some(id) = modal.take_pending_ticket() {
        let tickets = TicketData::load_path(source.path())?;
        ConsoleRouter::new(tickets, std::io::stdout()).open_ticket(&id)?;
    }
    Ok(())
}

/// Shows a ticket's detail on the terminal the calendar was running in.
pub(crate) struct ConsoleRouter<W: Write> {
    tickets: TicketData,
    out: W,
}

impl<W: Write> ConsoleRouter<W> {
    pub(crate) fn new(tickets: TicketData, out: W) -> Self {
        ConsoleRouter { tickets, out }
    }
}

impl<W: Write> Router for ConsoleRouter<W> {
    fn open_ticket(&mut self, id: &str) -> Result<()> {
        match self.tickets.find(id) {
            Some(ticket) => write_ticket(ticket, &mut self.out),
            None => bail!("Ticket '{}' not found.", id),
        }
    }
}
