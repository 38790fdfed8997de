//! # am-cli
//!
//! `amtool`, a command-line client for the Alertmanager silence API.
//!
//! The binary resolves configuration once, builds an
//! [`am_silences::HttpSilenceClient`] and hands both to the command being run.
//! Commands write results through [`output::OutputFormat`] and never touch
//! process-wide state, so they can be driven by a fake API in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, SilenceAddArgs, SilenceCommands};
pub use error::CliError;
pub use output::OutputFormat;
