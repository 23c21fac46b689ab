//! Keeps the configuration file and the running scheduler in step.
//!
//! Every change is persisted first and applied in memory only once the
//! write succeeded, so a failed save never leaves the scheduler ahead of
//! the file.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use super::scheduler::BreakScheduler;
use crate::config::ConfigStore;
use crate::types::{BreakCategory, BreakConfig, BreakProgress};

pub struct BreakManager {
    store: ConfigStore,
    scheduler: Arc<BreakScheduler>,
}

impl BreakManager {
    pub fn new(store: ConfigStore, scheduler: Arc<BreakScheduler>) -> Self {
        Self { store, scheduler }
    }

    /// Saves `config` and restarts its category's countdown with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be persisted; the
    /// scheduler is left untouched in that case.
    pub fn save_break_config(&self, config: BreakConfig) -> Result<()> {
        let category = config.category();
        self.store
            .save_break_config(&config)
            .with_context(|| format!("Failed to save {category} settings"))?;

        self.scheduler.update_break_todo(BreakProgress::new(config));
        info!(%category, "Break configuration updated");
        Ok(())
    }

    /// Saves and applies the enabled flag of `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be persisted.
    pub fn set_break_enabled(&self, category: BreakCategory, enabled: bool) -> Result<()> {
        self.store
            .set_break_enabled(category, enabled)
            .with_context(|| format!("Failed to save {category} enabled state"))?;

        self.scheduler.set_break_enabled(category, enabled);
        Ok(())
    }

    pub fn scheduler(&self) -> &Arc<BreakScheduler> {
        &self.scheduler
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{BreakEvent, SchedulerRegistry};
    use crate::types::{BreakPhase, BreakStatus, WallClock};
    use tokio::sync::mpsc;

    fn manager(
        store: ConfigStore,
    ) -> (BreakManager, mpsc::UnboundedReceiver<BreakEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let breaks = store
            .load_break_configs()
            .unwrap()
            .into_iter()
            .map(BreakProgress::new);
        let scheduler = SchedulerRegistry::new().create(breaks, tx).unwrap();
        (BreakManager::new(store, Arc::new(scheduler)), rx)
    }

    #[test]
    fn test_save_break_config_persists_then_applies() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _rx) = manager(ConfigStore::new(dir.path().join("config.json")));
        manager.scheduler().tick();

        let config = BreakConfig::new(
            BreakCategory::SmallBreak,
            WallClock::from_minutes(30),
            Some(WallClock::from_seconds(40)),
            WallClock::from_minutes(2),
        )
        .unwrap();
        manager.save_break_config(config.clone()).unwrap();

        let progress = manager.scheduler().get(BreakCategory::SmallBreak);
        assert_eq!(progress.phase(), BreakPhase::Working);
        assert_eq!(progress.remaining(), WallClock::from_minutes(30));
        assert_eq!(manager.store().load_break_configs().unwrap()[0], config);
    }

    #[test]
    fn test_set_break_enabled_keeps_countdown() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _rx) = manager(ConfigStore::new(dir.path().join("config.json")));
        manager.scheduler().tick();

        manager
            .set_break_enabled(BreakCategory::StretchBreak, false)
            .unwrap();
        let progress = manager.scheduler().get(BreakCategory::StretchBreak);
        assert_eq!(progress.status(), BreakStatus::Disabled);
        assert_eq!(progress.remaining(), WallClock::from_seconds(3599));
        assert!(!manager.store().load_break_configs().unwrap()[1].is_enabled());
    }

    #[test]
    fn test_failed_save_leaves_scheduler_alone() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be makes every write fail
        let path = dir.path().join("config.json");
        std::fs::create_dir(&path).unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let breaks = BreakCategory::ALL
            .into_iter()
            .map(|c| BreakProgress::new(BreakConfig::default_for(c)));
        let scheduler = Arc::new(SchedulerRegistry::new().create(breaks, tx).unwrap());
        let manager = BreakManager::new(ConfigStore::new(path), Arc::clone(&scheduler));

        let before = scheduler.breaks_todo_list();
        assert!(manager
            .set_break_enabled(BreakCategory::SmallBreak, false)
            .is_err());
        assert_eq!(scheduler.breaks_todo_list(), before);
    }
}
