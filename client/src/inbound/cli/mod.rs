//! Command-line inbound adapter.
//!
//! Parses `consentctl` arguments and drives the domain services. The adapter
//! sees only ports and services; the binary decides which adapters back them.

mod commands;
mod output;

pub use commands::{Cli, CliContext, Command, run};
pub use output::render_error;
