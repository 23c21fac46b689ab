//! CLI module for restbreak.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `console`: Line commands read while the scheduler runs
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod console;
pub mod display;

pub use commands::{Cli, Commands, ConfigCommand, RunArgs, SetArgs};
pub use console::ConsoleCommand;
pub use display::Display;
