//! Daemon module for the break scheduler.
//!
//! This module contains the core daemon functionality:
//! - `scheduler`: Per-category countdowns, phase transitions and events
//! - `ticker`: One-second driver for the scheduler
//! - `manager`: Persists configuration changes, then applies them

pub mod manager;
pub mod scheduler;
pub mod ticker;

pub use manager::BreakManager;
pub use scheduler::{BreakEvent, BreakScheduler, DecisionError, SchedulerError, SchedulerRegistry};
pub use ticker::{Ticker, TICK_PERIOD};
