//! Command definitions for the restbreak CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::types::{BreakCategory, BreakConfig, WallClock};

// ============================================================================
// CLI Structure
// ============================================================================

/// restbreak - A break reminder for eye-rest, stretch and end-of-day breaks
#[derive(Parser, Debug)]
#[command(
    name = "restbreak",
    version,
    about = "Break reminder that schedules eye-rest, stretch and end-of-day breaks",
    long_about = "Runs one countdown per break category and reminds you when a break is due.\n\
                  Hook commands can be configured to run when a break starts or ends.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of the default one
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the break scheduler in the foreground
    Run(RunArgs),

    /// Show the configured break categories
    Status,

    /// Inspect or change the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stop after this many ticks instead of running until Ctrl-C
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Real time between ticks in milliseconds; each tick counts as one second
    #[arg(
        long,
        hide = true,
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_millis: u64,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,

    /// Enable a break category
    Enable {
        /// small_break, stretch_break or day_break
        category: BreakCategory,
    },

    /// Disable a break category
    Disable {
        /// small_break, stretch_break or day_break
        category: BreakCategory,
    },

    /// Change the durations of a break category
    Set(SetArgs),
}

/// Arguments for the config set command and the console `set` command
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetArgs {
    /// small_break, stretch_break or day_break
    pub category: BreakCategory,

    /// Work time before the break, e.g. "20m" or "1h 30m"
    #[arg(short, long)]
    pub work: Option<WallClock>,

    /// Length of the break (not for day_break)
    #[arg(short = 'b', long = "break")]
    pub break_duration: Option<WallClock>,

    /// Delay applied when the break is postponed
    #[arg(short, long)]
    pub postpone: Option<WallClock>,
}

impl SetArgs {
    /// Returns true if no duration was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none() && self.break_duration.is_none() && self.postpone.is_none()
    }

    /// Builds the changed configuration from `current`, keeping the values
    /// that were not given along with the enabled flag and hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing would change or the result is invalid.
    pub fn apply_to(&self, current: &BreakConfig) -> Result<BreakConfig> {
        if self.is_empty() {
            bail!("nothing to change, pass --work, --break or --postpone");
        }

        let mut config = BreakConfig::new(
            self.category,
            self.work.unwrap_or(current.work_duration()),
            self.break_duration.or(current.break_duration()),
            self.postpone.unwrap_or(current.postpone_duration()),
        )?
        .with_enabled(current.is_enabled());
        if let Some(hooks) = current.hooks() {
            config = config.with_hooks(hooks.as_ref().clone());
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
