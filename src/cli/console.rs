//! Line commands accepted on stdin while `restbreak run` is active.
//!
//! The console thread plays the part of the UI: it reads one command per
//! line and calls into the [`BreakManager`] concurrently with the ticker.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{bail, Result};
use clap::Parser;

use super::commands::SetArgs;
use crate::daemon::{BreakManager, DecisionError};
use crate::types::{BreakCategory, WallClock};

/// A command typed while the scheduler is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    /// Postpone by the given duration, or the category's postpone time
    Postpone(BreakCategory, Option<WallClock>),
    /// Skip the break and restart its work countdown
    Dismiss(BreakCategory),
    Acknowledge(BreakCategory),
    Enable(BreakCategory),
    Disable(BreakCategory),
    /// Change durations, saved like `config set`
    Set(SetArgs),
    /// Freeze every countdown
    Stop,
    /// Unfreeze after `Stop`
    Resume,
    Help,
}

pub const HELP: &str = "\
commands:
  status                     show every countdown
  postpone <category> [dur]  postpone a due or running break
  dismiss <category>         skip a due or running break
  ack <category>             end a due or running break
  enable <category>          enable a break category
  disable <category>         disable a break category
  set <category> [--work D] [--break D] [--postpone D]
                             change and save durations
  stop | resume              freeze or unfreeze all countdowns
  help                       show this message";

/// `set` arguments, parsed the same way as `config set`.
#[derive(Parser, Debug)]
#[command(name = "set", no_binary_name = true)]
struct SetLine {
    #[command(flatten)]
    args: SetArgs,
}

/// Splits `words` into a category and an optional trailing duration.
fn category_and_duration(words: &[&str]) -> Result<(BreakCategory, Option<WallClock>)> {
    if let [name @ .., last] = words {
        if !name.is_empty() {
            if let (Ok(category), Ok(duration)) =
                (name.join(" ").parse::<BreakCategory>(), last.parse::<WallClock>())
            {
                return Ok((category, Some(duration)));
            }
        }
    }
    Ok((words.join(" ").parse()?, None))
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let rest: Vec<&str> = words.collect();
        let needs_category = || -> Result<()> {
            if rest.is_empty() {
                bail!("'{verb}' needs a break category");
            }
            Ok(())
        };
        let category = || -> Result<BreakCategory> {
            needs_category()?;
            Ok(rest.join(" ").parse()?)
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "status" | "s" => ConsoleCommand::Status,
            "postpone" | "p" => {
                needs_category()?;
                let (category, duration) = category_and_duration(&rest)?;
                ConsoleCommand::Postpone(category, duration)
            }
            "dismiss" | "skip" => ConsoleCommand::Dismiss(category()?),
            "ack" | "acknowledge" | "a" => ConsoleCommand::Acknowledge(category()?),
            "enable" => ConsoleCommand::Enable(category()?),
            "disable" => ConsoleCommand::Disable(category()?),
            "set" => ConsoleCommand::Set(SetLine::try_parse_from(rest.iter().copied())?.args),
            "stop" => ConsoleCommand::Stop,
            "resume" => ConsoleCommand::Resume,
            "help" | "?" => ConsoleCommand::Help,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

impl ConsoleCommand {
    /// Applies the command and returns the text to show.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration change cannot be saved or is
    /// invalid.
    pub fn execute(self, manager: &BreakManager) -> Result<String> {
        let scheduler = manager.scheduler();
        let reply = match self {
            ConsoleCommand::Status => {
                let mut out = String::new();
                if scheduler.is_stopped() {
                    out.push_str("(stopped)\n");
                }
                for progress in scheduler.breaks_todo_list().values() {
                    let _ = writeln!(
                        out,
                        "{:<14} {:<12} {}",
                        progress.category().name(),
                        progress.status().as_str(),
                        progress.status_message()
                    );
                }
                out.trim_end().to_string()
            }
            ConsoleCommand::Postpone(category, duration) => {
                match scheduler.postpone_with(category, duration) {
                    Ok(remaining) => format!("{category} postponed, due again in {remaining}"),
                    Err(DecisionError::NotHappening(_)) => format!("no {category} to postpone"),
                    Err(e @ DecisionError::Forced(_)) => e.to_string(),
                    Err(e) => return Err(e.into()),
                }
            }
            ConsoleCommand::Dismiss(category) => match scheduler.dismiss(category) {
                Ok(()) => format!("{category} skipped"),
                Err(DecisionError::NotHappening(_)) => format!("no {category} to skip"),
                Err(e) => e.to_string(),
            },
            ConsoleCommand::Acknowledge(category) => {
                if scheduler.acknowledge(category) {
                    format!("{category} done")
                } else {
                    format!("no {category} in progress")
                }
            }
            ConsoleCommand::Enable(category) => {
                manager.set_break_enabled(category, true)?;
                format!("{category} enabled")
            }
            ConsoleCommand::Disable(category) => {
                manager.set_break_enabled(category, false)?;
                format!("{category} disabled")
            }
            ConsoleCommand::Set(args) => {
                let current = manager.store().load()?.break_config(args.category)?;
                let config = args.apply_to(&current)?;
                let work = config.work_duration();
                manager.save_break_config(config)?;
                format!("{} saved, next break in {work}", args.category)
            }
            ConsoleCommand::Stop => {
                scheduler.set_stopped(true);
                "all countdowns stopped".to_string()
            }
            ConsoleCommand::Resume => {
                scheduler.set_stopped(false);
                "countdowns resumed".to_string()
            }
            ConsoleCommand::Help => HELP.to_string(),
        };
        Ok(reply)
    }
}
