//! CLI command handlers
//!
//! Handlers for the subcommands beyond the default generate run.

pub mod list;
pub mod template;
