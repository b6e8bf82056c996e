use crate::data::persistence::Persistable;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl Ticket {
    pub fn new(id: &str, title: &str, created_at: DateTime<Utc>) -> Self {
        Ticket {
            id: id.to_string(),
            title: title.to_string(),
            created_at,
            priority: Priority::default(),
            status: Status::default(),
            category_name: None,
        }
    }

    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Uncategorized")
    }
}

/// Backing store for `tickets.json`.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct TicketData {
    pub tickets: Vec<Ticket>,
}

impl Persistable for TicketData {
    fn filename() -> &'static str {
        "tickets.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl TicketData {
    pub fn add(&mut self, ticket: Ticket) {
        self.tickets.push(ticket);
    }

    pub fn find(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }
}

/// Size of the window the calendar requests; older tickets show no indicator.
pub const CALENDAR_FETCH_LIMIT: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketSort {
    NewestFirst,
    OldestFirst,
}

impl TicketSort {
    /// Query-string form understood by the ticket service.
    pub fn as_param(&self) -> &'static str {
        match self {
            TicketSort::NewestFirst => "-createdAt",
            TicketSort::OldestFirst => "createdAt",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketQuery {
    pub limit: usize,
    pub sort: TicketSort,
}

impl TicketQuery {
    /// The request the calendar issues when it opens.
    pub fn calendar() -> Self {
        TicketQuery {
            limit: CALENDAR_FETCH_LIMIT,
            sort: TicketSort::NewestFirst,
        }
    }

    /// Every ticket in the store, newest first.
    pub fn all() -> Self {
        TicketQuery {
            limit: usize::MAX,
            sort: TicketSort::NewestFirst,
        }
    }
}

/// One page of results. `total` is the size of the full collection.
#[derive(Debug, Clone, Default)]
pub struct TicketPage {
    pub data: Vec<Ticket>,
    pub total: usize,
}

pub trait TicketSource {
    fn fetch(&self, query: &TicketQuery) -> Result<TicketPage>;
}

/// Serves tickets from a JSON file on disk.
pub struct FileTicketSource {
    path: PathBuf,
}

impl FileTicketSource {
    pub fn new(path: PathBuf) -> Self {
        FileTicketSource { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TicketSource for FileTicketSource {
    fn fetch(&self, query: &TicketQuery) -> Result<TicketPage> {
        let data = TicketData::load_path(&self.path)?;
        Ok(apply_query(data.tickets, query))
    }
}

pub(crate) fn apply_query(mut tickets: Vec<Ticket>, query: &TicketQuery) -> TicketPage {
    let total = tickets.len();
    match query.sort {
        TicketSort::NewestFirst => tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TicketSort::OldestFirst => tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    tickets.truncate(query.limit);
    TicketPage {
        data: tickets,
        total,
    }
}
