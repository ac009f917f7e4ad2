//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

pub mod analyze;
pub mod download;
pub mod formats;
