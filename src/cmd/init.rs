use crate::data::{AppSettings, Persistable, Priority, Status, Ticket, TicketData};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir, Utc::now())?;
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes config.yaml and a sample ticket store into `dir`.
pub(crate) fn run_in_dir(dir: &Path, now: DateTime<Utc>) -> Result<()> {
    let settings = AppSettings::default();
    settings.save_to(dir)?;
    sample_tickets(now).save_path(&settings.tickets_path(dir))?;
    Ok(())
}

/// A spread of tickets over the last few weeks, some days busier than others.
fn sample_tickets(now: DateTime<Utc>) -> TicketData {
    const SAMPLES: [(&str, i64, Priority, Status, Option<&str>); 12] = [
        ("VPN disconnects every hour", 0, Priority::High, Status::Open, Some("Network")),
        ("Request second monitor", 0, Priority::Low, Status::Open, Some("Hardware")),
        ("Outlook search broken", 1, Priority::Medium, Status::InProgress, Some("Software")),
        ("Printer on 3rd floor jammed", 3, Priority::Low, Status::Resolved, Some("Hardware")),
        ("Reset MFA device", 3, Priority::High, Status::Closed, Some("Accounts")),
        ("Shared drive permissions", 3, Priority::Medium, Status::Resolved, None),
        ("Laptop battery swelling", 3, Priority::High, Status::InProgress, Some("Hardware")),
        ("New hire onboarding kit", 3, Priority::Medium, Status::Open, Some("Accounts")),
        ("Slack notifications delayed", 6, Priority::Low, Status::Closed, Some("Software")),
        ("Badge reader offline", 10, Priority::High, Status::Resolved, Some("Facilities")),
        ("Conference room display flicker", 17, Priority::Medium, Status::Closed, None),
        ("Password expiry emails missing", 32, Priority::Medium, Status::Resolved, Some("Accounts")),
    ];

    let mut data = TicketData::default();
    for (i, (title, days_ago, priority, status, category)) in SAMPLES.iter().enumerate() {
        let created_at = now - Duration::days(*days_ago) - Duration::minutes(37 * i as i64);
        let mut ticket = Ticket::new(&format!("TCK-{:04}", 1001 + i), title, created_at);
        ticket.priority = *priority;
        ticket.status = *status;
        ticket.category_name = category.map(str::to_string);
        data.add(ticket);
    }
    data
}
