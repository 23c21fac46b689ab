//! The fixed set of break kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::break_config::ConfigError;
use super::clock::WallClock;

/// A kind of break reminder.
///
/// The declaration order is the scheduling priority: when two categories
/// expire on the same tick, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakCategory {
    /// Short eye-rest break
    SmallBreak,
    /// Longer stretch break
    StretchBreak,
    /// End-of-day break; has no timed break phase
    DayBreak,
}

impl BreakCategory {
    /// All categories in scheduling order.
    pub const ALL: [BreakCategory; 3] = [
        BreakCategory::SmallBreak,
        BreakCategory::StretchBreak,
        BreakCategory::DayBreak,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            BreakCategory::SmallBreak => "small break",
            BreakCategory::StretchBreak => "stretch break",
            BreakCategory::DayBreak => "day break",
        }
    }

    /// Key used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakCategory::SmallBreak => "small_break",
            BreakCategory::StretchBreak => "stretch_break",
            BreakCategory::DayBreak => "day_break",
        }
    }

    /// Returns true if the category has a timed break countdown.
    ///
    /// The day break goes straight from due to acknowledged.
    pub fn has_break_phase(&self) -> bool {
        !matches!(self, BreakCategory::DayBreak)
    }

    pub fn default_work_duration(&self) -> WallClock {
        match self {
            BreakCategory::SmallBreak => WallClock::from_minutes(20),
            BreakCategory::StretchBreak => WallClock::from_hours(1),
            BreakCategory::DayBreak => WallClock::from_hours(8),
        }
    }

    /// `None` for categories without a break phase.
    pub fn default_break_duration(&self) -> Option<WallClock> {
        match self {
            BreakCategory::SmallBreak => Some(WallClock::from_seconds(20)),
            BreakCategory::StretchBreak => Some(WallClock::from_minutes(5)),
            BreakCategory::DayBreak => None,
        }
    }

    pub fn default_postpone_duration(&self) -> WallClock {
        match self {
            BreakCategory::SmallBreak => WallClock::from_minutes(5),
            BreakCategory::StretchBreak => WallClock::from_minutes(10),
            BreakCategory::DayBreak => WallClock::from_minutes(30),
        }
    }
}

impl fmt::Display for BreakCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreakCategory {
    type Err = ConfigError;

    /// Accepts the config key (`small_break`), the name (`small break`) or
    /// a dashed form (`small-break`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}
