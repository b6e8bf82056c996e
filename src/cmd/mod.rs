pub mod day;
pub mod init;
pub mod root;
pub mod show;
pub mod tickets;
pub mod year;

use crate::data::persistence::get_data_dir;
use crate::data::{AppSettings, FileTicketSource};
use anyhow::Result;

/// The ticket store configured in config.yaml.
pub(crate) fn ticket_source() -> Result<FileTicketSource> {
    let dir = get_data_dir()?;
    let settings = AppSettings::load_from(&dir)?;
    Ok(FileTicketSource::new(settings.tickets_path(&dir)))
}
