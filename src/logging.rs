use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "ticketcal.log";

/// Routes tracing output to `<data_dir>/ticketcal.log`; the calendar owns
/// the terminal so nothing is written to stderr. RUST_LOG takes precedence
/// over `level`.
pub fn init_tracing(data_dir: &Path, level: &str) -> Result<()> {
    let filter = build_filter(level)?;

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create dir {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|e| anyhow!("invalid log filter: {e}"))
}
