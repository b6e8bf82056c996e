pub mod app_settings;
pub mod persistence;
pub mod ticket;

pub use app_settings::AppSettings;
pub use persistence::Persistable;
pub use ticket::{
    FileTicketSource, Priority, Status, Ticket, TicketData, TicketQuery, TicketSort,
    TicketSource,
};
