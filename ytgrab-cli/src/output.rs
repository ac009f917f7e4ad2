//! Colored terminal output helpers.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;

/// Print a heading with colored styling and clear separation
pub fn print_heading(text: &str) {
    let heading = format!(" {} ", text).bold().bright_white();
    let line = "=".repeat(50).bright_blue();

    println!("\n{}", line);
    println!("{}", heading);
    println!("{}\n", line);
}

/// Print a section heading (smaller than main heading)
pub fn print_section(text: &str) {
    let section = format!(" {} ", text).bold().white();
    let line = "-".repeat(40).blue();

    println!("\n{}", line);
    println!("{}", section);
    println!("{}", line);
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", label.bright_cyan(), value);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".bright_green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
}

/// Spinner shown while waiting on yt-dlp metadata queries.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
