//! Duration values used by every break countdown.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 60 * 60;

// ============================================================================
// WallClockError
// ============================================================================

/// Errors produced when building or parsing a [`WallClock`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WallClockError {
    /// Minutes or seconds outside `0..=59`.
    #[error("invalid clock component: {minutes}m {seconds}s (minutes and seconds must be below 60)")]
    InvalidComponent {
        /// Requested minutes
        minutes: u8,
        /// Requested seconds
        seconds: u8,
    },

    /// Total seconds larger than the biggest representable duration.
    #[error("{0} seconds exceeds the maximum duration of {max}", max = WallClock::MAX)]
    OutOfRange(u32),

    /// Text that is neither `1h 2m 3s` style nor a bare number of seconds.
    #[error("cannot parse duration '{0}' (expected e.g. '1h 20m 5s' or '90')")]
    Parse(String),
}

// ============================================================================
// WallClock
// ============================================================================

/// An immutable hours/minutes/seconds duration.
///
/// Minutes and seconds are always normalized to `0..=59`; hours are not
/// wrapped at 24. Equality and ordering are defined by the total number of
/// seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl WallClock {
    /// The zero duration.
    pub const ZERO: WallClock = WallClock {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// The largest representable duration (`255h 59m 59s`).
    pub const MAX: WallClock = WallClock {
        hours: u8::MAX,
        minutes: 59,
        seconds: 59,
    };

    /// Creates a clock from its components.
    ///
    /// # Errors
    ///
    /// Returns [`WallClockError::InvalidComponent`] if minutes or seconds
    /// are 60 or more.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, WallClockError> {
        if minutes >= 60 || seconds >= 60 {
            return Err(WallClockError::InvalidComponent { minutes, seconds });
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Decomposes a number of seconds into hours, minutes and seconds.
    ///
    /// Values above [`WallClock::MAX`] saturate; use `WallClock::try_from`
    /// to detect that case.
    #[must_use]
    pub fn from_seconds(total_seconds: u32) -> Self {
        Self::try_from(total_seconds).unwrap_or(Self::MAX)
    }

    /// Shorthand for a duration given in minutes.
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_seconds(minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    /// Shorthand for a duration given in hours.
    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        Self::from_seconds(hours.saturating_mul(SECONDS_PER_HOUR))
    }

    #[must_use]
    pub fn hours(&self) -> u8 {
        self.hours
    }

    #[must_use]
    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    #[must_use]
    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Returns the whole duration in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> u32 {
        u32::from(self.hours) * SECONDS_PER_HOUR
            + u32::from(self.minutes) * SECONDS_PER_MINUTE
            + u32::from(self.seconds)
    }

    /// Returns true if the duration is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.to_seconds() == 0
    }

    /// Renders the non-zero components as `"<h>h <m>m <s>s"`.
    ///
    /// A zero duration renders as the empty string.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.hours != 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.minutes != 0 {
            parts.push(format!("{}m", self.minutes));
        }
        if self.seconds != 0 {
            parts.push(format!("{}s", self.seconds));
        }
        parts.join(" ")
    }

    /// Returns the duration `n` seconds shorter, or `None` if it would go
    /// negative.
    #[must_use]
    pub fn checked_sub_seconds(&self, n: u32) -> Option<Self> {
        self.to_seconds().checked_sub(n).map(Self::from_seconds)
    }

    /// Replaces `self` with the duration `n` seconds shorter.
    ///
    /// Returns false and leaves `self` unchanged if the result would be
    /// negative.
    pub fn subtract_seconds(&mut self, n: u32) -> bool {
        match self.checked_sub_seconds(n) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

impl TryFrom<u32> for WallClock {
    type Error = WallClockError;

    fn try_from(total_seconds: u32) -> Result<Self, Self::Error> {
        let hours = total_seconds / SECONDS_PER_HOUR;
        let hours = u8::try_from(hours).map_err(|_| WallClockError::OutOfRange(total_seconds))?;
        let rest = total_seconds % SECONDS_PER_HOUR;

        // both components are < 60 here
        Ok(Self {
            hours,
            minutes: (rest / SECONDS_PER_MINUTE) as u8,
            seconds: (rest % SECONDS_PER_MINUTE) as u8,
        })
    }
}

impl From<WallClock> for u32 {
    fn from(clock: WallClock) -> Self {
        clock.to_seconds()
    }
}

impl PartialEq for WallClock {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for WallClock {}

impl Hash for WallClock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_seconds().hash(state);
    }
}

impl PartialOrd for WallClock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallClock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl FromStr for WallClock {
    type Err = WallClockError;

    /// Accepts `"1h 20m 5s"` (any subset, any order of spacing), a bare
    /// number of seconds, or the empty string for zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        if let Ok(total) = trimmed.parse::<u32>() {
            return Self::try_from(total);
        }

        let parse_err = || WallClockError::Parse(s.to_string());
        let mut total: u32 = 0;
        for token in trimmed.split_whitespace() {
            let unit_len = token.chars().last().map_or(0, char::len_utf8);
            let (value, unit) = token.split_at(token.len() - unit_len);
            let value: u32 = value.parse().map_err(|_| parse_err())?;
            let factor = match unit {
                "h" => SECONDS_PER_HOUR,
                "m" => SECONDS_PER_MINUTE,
                "s" => 1,
                _ => return Err(parse_err()),
            };
            total = value
                .checked_mul(factor)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(parse_err)?;
        }
        Self::try_from(total)
    }
}

impl Serialize for WallClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_display_string())
    }
}

impl<'de> Deserialize<'de> for WallClock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(total) => WallClock::try_from(total).map_err(serde::de::Error::custom),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
