// ytgrab-cli/src/main.rs
//
// Entry point for the ytgrab CLI: parses arguments, sets up logging, and
// dispatches to the command implementations. Errors from the core library
// are printed in red and turn into a non-zero exit code.

use clap::Parser;
use colored::Colorize;
use std::process;

mod cli;
mod commands;
mod logging;
mod output;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Download(args) => commands::download::run_download(args),
        Commands::Formats(args) => commands::formats::run_formats(args),
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".bright_red().bold(), e);
        process::exit(1);
    }
}
