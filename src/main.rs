mod calc;
mod cmd;
mod data;
mod logging;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ticketcal", about = "support tickets on a calendar")]
struct Cli {
    /// Path to the data directory containing config and ticket files (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    /// Log filter written to ticketcal.log (overrides config.yaml; RUST_LOG wins)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write config.yaml and a sample tickets.json
    Init,
    /// List the most recent tickets, newest first
    Tickets {
        /// List oldest first instead
        #[arg(long)]
        oldest_first: bool,
    },
    /// List the tickets created on one day
    Day {
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Summarise ticket activity per month for a year
    Year {
        /// Calendar year (e.g. 2024)
        year: i32,
    },
    /// Show a single ticket
    Show {
        /// Ticket id
        id: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did not
    // explicitly invoke the `init` subcommand.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    if !is_init_command && dir_needs_init(&data_dir) {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    let settings = data::AppSettings::load_from(&data_dir).unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    if let Err(e) = logging::init_tracing(&data_dir, level) {
        eprintln!("Logging disabled: {e:#}");
    }

    match cli.command {
        None => cmd::root::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Tickets { oldest_first }) => cmd::tickets::run(oldest_first),
        Some(Commands::Day { date }) => cmd::day::run(&date),
        Some(Commands::Year { year }) => cmd::year::run(year),
        Some(Commands::Show { id }) => cmd::show::run(&id),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
