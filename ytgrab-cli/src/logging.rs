//! Logging setup for the CLI.
//!
//! Uses env_logger behind the standard `log` facade. `RUST_LOG` overrides
//! the default level; `--verbose` bumps the default to debug.

use env_logger::Env;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS",
/// used to label download runs in debug output.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
