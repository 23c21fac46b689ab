//! Configuration file.
//!
//! Break settings live in a JSON file, by default
//! `<config dir>/restbreak/config.json`:
//!
//! ```json
//! {
//!   "breaks": {
//!     "small_break": { "enabled": true, "work": "20m", "break": "20s", "postpone": "5m",
//!                      "hooks": { "break": { "on_start": "xset dpms force off" } } },
//!     "day_break": { "enabled": true, "work": "8h", "postpone": "30m",
//!                    "hooks": { "notification": { "on_start": "notify-send 'Go home'" } } }
//!   },
//!   "active_hours": { "start": "08:30", "end": "18:00", "after_end": "notify-send 'Stop'" },
//!   "hook_timeout_seconds": 10
//! }
//! ```
//!
//! Missing categories and a missing file fall back to the built-in defaults.
//! Durations accept the display form (`"1h 30m"`) or a number of seconds.

pub mod error;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use error::StoreError;

use crate::hooks::DEFAULT_TIMEOUT_SECONDS;
use crate::types::{ActiveHours, BreakCategory, BreakConfig, BreakHooks, ConfigError, WallClock};

/// Directory name under the platform config dir.
pub const APP_DIR_NAME: &str = "restbreak";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

fn default_true() -> bool {
    true
}

fn default_hook_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

// ============================================================================
// BreakSettings
// ============================================================================

/// On-disk settings of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub work: WallClock,

    /// Absent for the day break.
    #[serde(rename = "break", default, skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<WallClock>,

    pub postpone: WallClock,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<BreakHooks>,
}

impl BreakSettings {
    pub fn from_config(config: &BreakConfig) -> Self {
        Self {
            enabled: config.is_enabled(),
            work: config.work_duration(),
            break_duration: config.break_duration(),
            postpone: config.postpone_duration(),
            hooks: config.hooks().map(|hooks| BreakHooks::clone(hooks)),
        }
    }

    /// Builds and validates the configuration for `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the break duration does not match the category
    /// or a duration is zero.
    pub fn to_config(&self, category: BreakCategory) -> Result<BreakConfig, ConfigError> {
        let mut config = BreakConfig::new(category, self.work, self.break_duration, self.postpone)?
            .with_enabled(self.enabled);
        if let Some(hooks) = &self.hooks {
            config = config.with_hooks(hooks.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub breaks: BTreeMap<BreakCategory, BreakSettings>,

    /// Daily working window; no warnings when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_hours: Option<ActiveHours>,

    /// Timeout for each hook command in seconds.
    #[serde(default = "default_hook_timeout_seconds")]
    pub hook_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let breaks = BreakCategory::ALL
            .into_iter()
            .map(|category| {
                let settings = BreakSettings::from_config(&BreakConfig::default_for(category));
                (category, settings)
            })
            .collect();
        Self {
            breaks,
            active_hours: None,
            hook_timeout_seconds: default_hook_timeout_seconds(),
        }
    }
}

impl AppConfig {
    /// One validated configuration per category, in category order.
    ///
    /// # Errors
    ///
    /// Returns the first invalid category's error.
    pub fn break_configs(&self) -> Result<Vec<BreakConfig>, ConfigError> {
        BreakCategory::ALL
            .into_iter()
            .map(|category| self.break_config(category))
            .collect()
    }

    /// The configuration of `category`, or its defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored settings are invalid.
    pub fn break_config(&self, category: BreakCategory) -> Result<BreakConfig, ConfigError> {
        match self.breaks.get(&category) {
            Some(settings) => settings.to_config(category),
            None => Ok(BreakConfig::default_for(category)),
        }
    }

    /// The validated active-hours window, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidActiveHours`] if the window ends before
    /// it starts.
    pub fn active_hours(&self) -> Result<Option<ActiveHours>, ConfigError> {
        if let Some(hours) = &self.active_hours {
            hours.validate()?;
        }
        Ok(self.active_hours.clone())
    }

    /// Stores the settings of `config`'s category.
    pub fn set_break_config(&mut self, config: &BreakConfig) {
        self.breaks
            .insert(config.category(), BreakSettings::from_config(config));
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the store at the default location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoConfigDir`] if the platform has no config dir.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// `<config dir>/restbreak/config.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoConfigDir`] if the platform has no config dir.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(StoreError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(&self) -> Result<AppConfig, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No config file, using defaults");
                return Ok(AppConfig::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Reads the file and builds one configuration per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or holds invalid
    /// break settings.
    pub fn load_break_configs(&self) -> Result<Vec<BreakConfig>, StoreError> {
        Ok(self.load()?.break_configs()?)
    }

    /// Writes `config`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, config: &AppConfig) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(config).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json + "\n").map_err(|source| self.io_error(source))?;

        info!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    /// Persists one category's configuration, keeping the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or written.
    pub fn save_break_config(&self, config: &BreakConfig) -> Result<(), StoreError> {
        let mut app = self.load()?;
        app.set_break_config(config);
        self.save(&app)
    }

    /// Persists the enabled flag of `category` and returns its new config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or written, or the
    /// stored settings of `category` are invalid.
    pub fn set_break_enabled(
        &self,
        category: BreakCategory,
        enabled: bool,
    ) -> Result<BreakConfig, StoreError> {
        let mut app = self.load()?;
        let config = app.break_config(category)?.with_enabled(enabled);
        app.set_break_config(&config);
        self.save(&app)?;
        Ok(config)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
