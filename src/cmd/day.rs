use crate::calc::{DateIndex, DateKey};
use crate::data::{Ticket, TicketQuery, TicketSource};
use anyhow::{Context, Result};
use chrono::Local;

pub fn run(date: &str) -> Result<()> {
    let key: DateKey = date
        .parse()
        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", date))?;
    let source = super::ticket_source()?;
    write_day(key, &tickets_on(&source, key)?, &mut std::io::stdout())
}

/// Reads the whole store so days older than the calendar window are found.
pub(crate) fn tickets_on(source: &dyn TicketSource, key: DateKey) -> Result<Vec<Ticket>> {
    let page = source.fetch(&TicketQuery::all())?;
    Ok(DateIndex::build(&page.data).lookup(key).to_vec())
}

pub(crate) fn write_day<W: std::io::Write>(key: DateKey, tickets: &[Ticket], out: &mut W) -> Result<()> {
    writeln!(out, "Tickets on {}", key.date().format("%B %-d, %Y"))?;
    writeln!(out, "---")?;
    if tickets.is_empty() {
        writeln!(out, "  No tickets on this day")?;
    }
    for t in tickets {
        writeln!(
            out,
            "  {:<9} {:<8} {:<16} {:<12} {}",
            t.created_at.with_timezone(&Local).format("%-I:%M %p"),
            t.priority,
            t.category_label(),
            t.status,
            t.title
        )?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} ticket(s)", tickets.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FileTicketSource;
    use crate::data::{Persistable, TicketData};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_write_day_empty() {
        let mut buf = Vec::new();
        write_day(key("2024-03-16"), &[], &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Tickets on March 16, 2024"));
        assert!(out.contains("No tickets on this day"));
        assert!(out.contains("Total: 0 ticket(s)"));
    }

    #[test]
    fn test_write_day_lists_bucket() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let tickets = vec![Ticket::new("1", "Projector", ts), Ticket::new("2", "Keyboard", ts)];
        let mut buf = Vec::new();
        write_day(key("2024-03-15"), &tickets, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Projector"));
        assert!(out.contains("Keyboard"));
        assert!(out.contains("Uncategorized"));
        assert!(out.contains("Total: 2 ticket(s)"));
    }

    #[test]
    fn test_tickets_on_reaches_past_calendar_window() {
        let tmp = TempDir::new().unwrap();
        let oldest = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let mut data = TicketData::default();
        data.add(Ticket::new("old", "Archived printer issue", oldest));
        let recent = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        for i in 0..520 {
            data.add(Ticket::new(&format!("r{i}"), "recent", recent + Duration::minutes(i)));
        }
        data.save_to(tmp.path()).unwrap();

        let source = FileTicketSource::new(tmp.path().join("tickets.json"));
        let day = DateKey::from_timestamp(&oldest, &Local);
        let found = tickets_on(&source, day).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "old");
    }
}
