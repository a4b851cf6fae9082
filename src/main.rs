mod cli;
mod clipboard;
mod dialog;
mod i18n;
mod logging;
mod store;
mod tokens;
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli_args = cli::Cli::parse();

    // The TUI owns the terminal, so interactive runs log to a file by default.
    let log_file = workflow::log_file(&cli_args);
    logging::init_logging(log_file.as_deref())?;

    // Delegate the main application logic to the workflow module
    workflow::run_hf_settings(cli_args)
}
