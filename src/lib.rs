//! Break Reminder Library
//!
//! This library provides the core functionality for the restbreak CLI.
//! It includes:
//! - Break scheduler driving one countdown per break category
//! - Fixed-rate ticker and configuration-aware manager
//! - Hook dispatch for reminder and break commands and notifications
//! - JSON configuration file handling, including the active-hours window
//! - CLI command parsing and display utilities
//! - Type definitions for durations, categories, configuration and state

pub mod cli;
pub mod config;
pub mod daemon;
pub mod hooks;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ActiveHours, ActiveHoursBoundary, BreakCategory, BreakConfig, BreakHooks, BreakPhase,
    BreakPhaseConfig, BreakProgress, BreakStatus, ConfigError, HookSet, WallClock, WallClockError,
};

// Re-export scheduler types
pub use daemon::{
    BreakEvent, BreakManager, BreakScheduler, DecisionError, SchedulerError, SchedulerRegistry,
    Ticker,
};

// Re-export hook types
pub use hooks::{
    BreakNotice, BreakNotifier, ChannelNotifier, CommandHookInvoker, HookDispatcher, HookError,
    HookInvoker, MockBreakNotifier, MockHookInvoker,
};

// Re-export config types
pub use config::{AppConfig, ConfigStore, StoreError};
