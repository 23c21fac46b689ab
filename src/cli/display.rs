//! Display utilities for the restbreak CLI.
//!
//! This module provides formatted output for:
//! - Break notices while the scheduler runs
//! - The configured categories (`status`)
//! - Success and error messages

use std::path::Path;

use crate::hooks::BreakNotice;
use crate::types::{ActiveHoursBoundary, BreakConfig, WallClock};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a break notice from the running scheduler.
    pub fn show_notice(notice: &BreakNotice) {
        println!("{}", Self::format_notice(notice));
    }

    /// Shows the configured break categories.
    pub fn show_status(configs: &[BreakConfig], path: &Path) {
        println!("restbreak configuration ({})", path.display());
        println!("─────────────────────────────");
        for config in configs {
            println!("{}", Self::format_config(config));
        }
    }

    /// Shows a message once the scheduler is running.
    pub fn show_run_started(ticks: Option<u64>) {
        match ticks {
            Some(ticks) => println!("* restbreak running for {ticks} ticks"),
            None => println!("* restbreak running, press Ctrl-C to quit (type 'help' for commands)"),
        }
    }

    pub fn show_config_written(path: &Path) {
        println!("* Configuration written to {}", path.display());
    }

    pub fn show_config_exists(path: &Path) {
        println!("Configuration already exists at {}", path.display());
        println!("  Use --force to overwrite it");
    }

    pub fn show_config_updated(config: &BreakConfig) {
        println!("* Updated {}", Self::format_config(config).trim_start());
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn format_notice(notice: &BreakNotice) -> String {
        match notice {
            BreakNotice::Due { category, message } => {
                format!("[{}] {}", category.as_str(), message)
            }
            BreakNotice::Ended { category } => {
                format!("[{}] {} is over, back to work", category.as_str(), category)
            }
            BreakNotice::Postponed {
                category,
                remaining,
            } => format!(
                "[{}] {} postponed for {}",
                category.as_str(),
                category,
                Self::format_duration(*remaining)
            ),
            BreakNotice::Dismissed { category } => {
                format!("[{}] {} skipped", category.as_str(), category)
            }
            BreakNotice::OutsideActiveHours { boundary } => {
                let when = match boundary {
                    ActiveHoursBoundary::BeforeStart => "before",
                    ActiveHoursBoundary::AfterEnd => "after",
                };
                format!("[active_hours] still working {when} your active hours")
            }
        }
    }

    fn format_config(config: &BreakConfig) -> String {
        let state = if config.is_enabled() { "on " } else { "off" };
        let break_part = match config.break_duration() {
            Some(duration) => format!("break {}", Self::format_duration(duration)),
            None => "until acknowledged".to_string(),
        };
        let mut line = format!(
            "  {:<14} {}  every {}, {}, postpone {}",
            config.category().name(),
            state,
            Self::format_duration(config.work_duration()),
            break_part,
            Self::format_duration(config.postpone_duration()),
        );
        if config.hooks().is_some_and(|hooks| !hooks.is_empty()) {
            line.push_str(", hooks");
        }
        line
    }

    /// Formats a duration, showing "0s" instead of an empty string.
    fn format_duration(duration: WallClock) -> String {
        if duration.is_zero() {
            "0s".to_string()
        } else {
            duration.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
