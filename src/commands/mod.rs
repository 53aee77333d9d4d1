//! Command implementations for solorun.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command lives in its own submodule.

mod clear;
mod cycle;
mod history;
mod list;
mod run;
mod status;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Cycle(args) => cycle::cmd_cycle(args),
        Command::List(args) => list::cmd_list(args),
        Command::Status(args) => status::cmd_status(args),
        Command::Clear(args) => clear::cmd_clear(args),
        Command::History(args) => history::cmd_history(args),
    }
}
