//! `rdpman` CLI - Command-line interface for the `rdpman` connection manager
//!
//! Provides commands for listing, adding, editing and deleting RDP
//! connections, managing credentials, importing and exporting the connection
//! list, regrouping connections and launching sessions.

mod cli;
mod commands;
mod error;
mod format;
mod terminal;
mod util;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = commands::dispatch(&cli);

    if let Err(e) = result {
        if !cli.quiet && !e.is_reported() {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
