//! Per-category break configuration.
//!
//! A [`BreakConfig`] is an immutable value: the configuration layer builds a
//! new one and hands it to the scheduler, which replaces its copy wholesale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::BreakCategory;
use super::clock::WallClock;

// ============================================================================
// ConfigError
// ============================================================================

/// Errors for malformed break configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A category with a break phase was configured without a break duration.
    #[error("{0} requires a break duration")]
    MissingBreakDuration(BreakCategory),

    /// A category without a break phase was given a break duration.
    #[error("{0} has no break phase, but a break duration was given")]
    UnexpectedBreakDuration(BreakCategory),

    /// A duration that must be positive is zero.
    #[error("{field} duration of {category} must be greater than zero")]
    ZeroDuration {
        /// Category being configured
        category: BreakCategory,
        /// Which duration ("work", "break" or "postpone")
        field: &'static str,
    },

    /// A category without a break phase was given break countdown hooks.
    #[error("{0} has no break phase, but break hooks were given")]
    UnexpectedBreakHooks(BreakCategory),

    /// The category name is not one of the known break kinds.
    #[error("unknown break category '{0}' (expected small_break, stretch_break or day_break)")]
    UnknownCategory(String),

    /// The active-hours window is empty or inverted.
    #[error("active hours must start before they end (got {start} to {end})")]
    InvalidActiveHours {
        start: String,
        end: String,
    },
}

// ============================================================================
// HookSet
// ============================================================================

fn default_true() -> bool {
    true
}

/// A pair of shell commands run when something starts and when it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSet {
    /// Command run on start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_start: Option<String>,

    /// Command run on end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_end: Option<String>,

    #[serde(default = "default_true")]
    pub start_enabled: bool,

    #[serde(default = "default_true")]
    pub end_enabled: bool,
}

impl HookSet {
    /// Creates a hook set with both commands enabled.
    #[must_use]
    pub fn new(on_start: Option<String>, on_end: Option<String>) -> Self {
        Self {
            on_start,
            on_end,
            start_enabled: true,
            end_enabled: true,
        }
    }

    /// The start command, if configured and enabled.
    #[must_use]
    pub fn start_command(&self) -> Option<&str> {
        self.on_start
            .as_deref()
            .filter(|cmd| self.start_enabled && !cmd.trim().is_empty())
    }

    /// The end command, if configured and enabled.
    #[must_use]
    pub fn end_command(&self) -> Option<&str> {
        self.on_end
            .as_deref()
            .filter(|cmd| self.end_enabled && !cmd.trim().is_empty())
    }

    /// Returns true if no command would ever run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_command().is_none() && self.end_command().is_none()
    }

    fn is_unset(&self) -> bool {
        self.on_start.is_none() && self.on_end.is_none()
    }
}

impl Default for HookSet {
    fn default() -> Self {
        Self::new(None, None)
    }
}

// ============================================================================
// BreakHooks
// ============================================================================

/// Hooks of one category.
///
/// The notification pair runs when the break reminder appears and when it
/// goes away (acknowledged, postponed, dismissed or finished). The break
/// pair runs around the break countdown and is absent for categories
/// without a break phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakHooks {
    #[serde(default, skip_serializing_if = "HookSet::is_unset")]
    pub notification: HookSet,

    #[serde(rename = "break", default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<HookSet>,
}

impl BreakHooks {
    #[must_use]
    pub fn new(notification: HookSet, countdown: Option<HookSet>) -> Self {
        Self {
            notification,
            countdown,
        }
    }

    /// Hooks that only run around the break countdown.
    #[must_use]
    pub fn countdown(hooks: HookSet) -> Self {
        Self::new(HookSet::default(), Some(hooks))
    }

    /// Hooks that only run around the reminder.
    #[must_use]
    pub fn notification(hooks: HookSet) -> Self {
        Self::new(hooks, None)
    }

    /// Returns true if no command would ever run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notification.is_empty() && self.countdown.as_ref().map_or(true, HookSet::is_empty)
    }
}

// ============================================================================
// BreakPhaseConfig
// ============================================================================

/// What happens once a break becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakPhaseConfig {
    /// The break counts down for `duration`, then work resumes.
    Timed {
        /// Length of the break
        duration: WallClock,
    },
    /// The break stays due until the user acknowledges it.
    Acknowledged,
}

// ============================================================================
// BreakConfig
// ============================================================================

/// Configuration for one break category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakConfig {
    category: BreakCategory,
    work: WallClock,
    phase: BreakPhaseConfig,
    postpone: WallClock,
    enabled: bool,
    hooks: Option<Arc<BreakHooks>>,
}

impl BreakConfig {
    /// Creates an enabled configuration without hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if `break_duration` is present for a category
    /// without a break phase, or absent for one that has it.
    pub fn new(
        category: BreakCategory,
        work: WallClock,
        break_duration: Option<WallClock>,
        postpone: WallClock,
    ) -> Result<Self, ConfigError> {
        let phase = match (category.has_break_phase(), break_duration) {
            (true, Some(duration)) => BreakPhaseConfig::Timed { duration },
            (true, None) => return Err(ConfigError::MissingBreakDuration(category)),
            (false, None) => BreakPhaseConfig::Acknowledged,
            (false, Some(_)) => return Err(ConfigError::UnexpectedBreakDuration(category)),
        };

        Ok(Self {
            category,
            work,
            phase,
            postpone,
            enabled: true,
            hooks: None,
        })
    }

    /// The built-in defaults for `category`, enabled and without hooks.
    #[must_use]
    pub fn default_for(category: BreakCategory) -> Self {
        let phase = match category.default_break_duration() {
            Some(duration) => BreakPhaseConfig::Timed { duration },
            None => BreakPhaseConfig::Acknowledged,
        };
        Self {
            category,
            work: category.default_work_duration(),
            phase,
            postpone: category.default_postpone_duration(),
            enabled: true,
            hooks: None,
        }
    }

    /// Returns a copy with the enabled flag set.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns a copy using `hooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: BreakHooks) -> Self {
        self.hooks = Some(Arc::new(hooks));
        self
    }

    /// Checks that every countdown is positive and that break hooks are
    /// only given to categories with a break phase.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] naming the first zero duration,
    /// or [`ConfigError::UnexpectedBreakHooks`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.category.has_break_phase()
            && self.hooks.as_ref().is_some_and(|hooks| hooks.countdown.is_some())
        {
            return Err(ConfigError::UnexpectedBreakHooks(self.category));
        }

        let zero = |field| ConfigError::ZeroDuration {
            category: self.category,
            field,
        };
        if self.work.is_zero() {
            return Err(zero("work"));
        }
        if self.postpone.is_zero() {
            return Err(zero("postpone"));
        }
        if matches!(self.break_duration(), Some(duration) if duration.is_zero()) {
            return Err(zero("break"));
        }
        Ok(())
    }

    pub fn category(&self) -> BreakCategory {
        self.category
    }

    pub fn work_duration(&self) -> WallClock {
        self.work
    }

    /// The break countdown; `None` for categories without a break phase.
    pub fn break_duration(&self) -> Option<WallClock> {
        match self.phase {
            BreakPhaseConfig::Timed { duration } => Some(duration),
            BreakPhaseConfig::Acknowledged => None,
        }
    }

    pub fn phase(&self) -> BreakPhaseConfig {
        self.phase
    }

    pub fn postpone_duration(&self) -> WallClock {
        self.postpone
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn hooks(&self) -> Option<&Arc<BreakHooks>> {
        self.hooks.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================
