//! The daily window in which the user means to work.
//!
//! Times are local times of day written as `"HH:MM"` or `"HH:MM:SS"`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::break_config::ConfigError;

/// Which side of the active-hours window the current time falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveHoursBoundary {
    BeforeStart,
    AfterEnd,
}

impl ActiveHoursBoundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveHoursBoundary::BeforeStart => "before_start",
            ActiveHoursBoundary::AfterEnd => "after_end",
        }
    }
}

/// Working hours with optional commands run when the user works outside
/// of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    #[serde(with = "time_of_day")]
    start: NaiveTime,

    #[serde(with = "time_of_day")]
    end: NaiveTime,

    /// Command run when work happens before `start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    before_start: Option<String>,

    /// Command run when work happens after `end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after_end: Option<String>,
}

impl ActiveHours {
    /// Creates a window without hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidActiveHours`] unless `start` is before
    /// `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ConfigError> {
        let hours = Self {
            start,
            end,
            before_start: None,
            after_end: None,
        };
        hours.validate()?;
        Ok(hours)
    }

    #[must_use]
    pub fn with_hooks(mut self, before_start: Option<String>, after_end: Option<String>) -> Self {
        self.before_start = before_start;
        self.after_end = after_end;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidActiveHours`] unless `start` is before
    /// `end`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(ConfigError::InvalidActiveHours {
                start: format_time(self.start),
                end: format_time(self.end),
            })
        }
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Where `now` lies relative to the window; `None` inside it.
    ///
    /// Both ends are inside the window. Only whole seconds are compared.
    pub fn boundary_at(&self, now: NaiveTime) -> Option<ActiveHoursBoundary> {
        let now = now.num_seconds_from_midnight();
        if now < self.start.num_seconds_from_midnight() {
            Some(ActiveHoursBoundary::BeforeStart)
        } else if now > self.end.num_seconds_from_midnight() {
            Some(ActiveHoursBoundary::AfterEnd)
        } else {
            None
        }
    }

    /// The command configured for `boundary`, ignoring blank ones.
    pub fn hook(&self, boundary: ActiveHoursBoundary) -> Option<&str> {
        let command = match boundary {
            ActiveHoursBoundary::BeforeStart => self.before_start.as_deref(),
            ActiveHoursBoundary::AfterEnd => self.after_end.as_deref(),
        };
        command.filter(|cmd| !cmd.trim().is_empty())
    }
}

fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .ok()
}

mod time_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_time(text.trim()).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time of day '{text}', expected HH:MM"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn office_hours() -> ActiveHours {
        ActiveHours::new(time(9, 0, 0), time(17, 30, 0)).unwrap()
    }

    #[test]
    fn test_boundary_at() {
        let hours = office_hours();
        assert_eq!(
            hours.boundary_at(time(8, 59, 59)),
            Some(ActiveHoursBoundary::BeforeStart)
        );
        assert_eq!(hours.boundary_at(time(9, 0, 0)), None);
        assert_eq!(hours.boundary_at(time(17, 30, 0)), None);
        assert_eq!(
            hours.boundary_at(time(17, 30, 1)),
            Some(ActiveHoursBoundary::AfterEnd)
        );
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert!(matches!(
            ActiveHours::new(time(18, 0, 0), time(9, 0, 0)),
            Err(ConfigError::InvalidActiveHours { .. })
        ));
        assert!(ActiveHours::new(time(9, 0, 0), time(9, 0, 0)).is_err());
    }

    #[test]
    fn test_hooks_by_boundary() {
        let hours = office_hours().with_hooks(Some("echo early".into()), Some("  ".into()));
        assert_eq!(hours.hook(ActiveHoursBoundary::BeforeStart), Some("echo early"));
        assert_eq!(hours.hook(ActiveHoursBoundary::AfterEnd), None);
    }

    #[test]
    fn test_serde_time_formats() {
        let hours: ActiveHours = serde_json::from_str(
            r#"{"start": "08:30", "end": "18:00:15", "after_end": "echo late"}"#,
        )
        .unwrap();
        assert_eq!(hours.start(), time(8, 30, 0));
        assert_eq!(hours.end(), time(18, 0, 15));

        let json = serde_json::to_value(&hours).unwrap();
        assert_eq!(json["start"], "08:30");
        assert_eq!(json["end"], "18:00:15");
        assert!(json.get("before_start").is_none());

        assert!(serde_json::from_str::<ActiveHours>(r#"{"start": "9am", "end": "17:00"}"#).is_err());
    }
}
