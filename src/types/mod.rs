//! Core data types for the break scheduler.
//!
//! This module defines the data structures used for:
//! - Durations ([`WallClock`])
//! - The fixed set of break kinds ([`BreakCategory`])
//! - Per-category configuration with validation ([`BreakConfig`])
//! - Per-category runtime state ([`BreakProgress`])
//! - The daily working window ([`ActiveHours`])

mod active_hours;
mod break_config;
mod category;
mod clock;
mod progress;

pub use active_hours::{ActiveHours, ActiveHoursBoundary};
pub use break_config::{BreakConfig, BreakHooks, BreakPhaseConfig, ConfigError, HookSet};
pub use category::BreakCategory;
pub use clock::{WallClock, WallClockError};
pub use progress::{BreakPhase, BreakProgress, BreakStatus, MAX_DISMISSES, MAX_POSTPONES};
