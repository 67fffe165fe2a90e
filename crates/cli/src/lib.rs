//! poetredis_cli - operator CLI for the poetredis cache.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;

pub use error::{CliError, Result};
