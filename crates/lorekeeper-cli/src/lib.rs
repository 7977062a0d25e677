//! Lorekeeper CLI library.
//!
//! Configuration, document reading, command execution and output formatting
//! for the `lorekeeper` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::Context;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
