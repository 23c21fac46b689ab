//! Break scheduler.
//!
//! This module provides the core scheduling functionality:
//! - One countdown per break category, advanced by [`BreakScheduler::tick`]
//! - Phase transitions (Working → BreakDue/BreakActive → Working)
//! - Event firing for hooks and notifications
//! - Postpone, dismiss, acknowledge and live configuration updates
//! - A one-shot warning when work happens outside the active hours
//!
//! Every operation takes `&self`; the scheduler is meant to be shared as
//! `Arc<BreakScheduler>` between the ticker and the UI.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveTime};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::types::{
    ActiveHours, ActiveHoursBoundary, BreakCategory, BreakHooks, BreakPhase, BreakProgress,
    WallClock,
};

// ============================================================================
// SchedulerError
// ============================================================================

/// Errors returned when building a scheduler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// A scheduler was already created from this registry.
    #[error("a break scheduler has already been created")]
    AlreadyInitialized,

    /// The initial break list lacks a category.
    #[error("no progress given for {0}")]
    MissingCategory(BreakCategory),

    /// The initial break list has two entries for one category.
    #[error("more than one progress given for {0}")]
    DuplicateCategory(BreakCategory),
}

/// Reasons a postpone or dismiss request is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("no {0} is due or running")]
    NotHappening(BreakCategory),

    /// The postpone or dismiss limit was reached; the break must be taken.
    #[error("{0} was put off too often and cannot be put off again")]
    Forced(BreakCategory),

    #[error("postpone duration must be greater than zero")]
    ZeroPostpone,
}

// ============================================================================
// BreakEvent
// ============================================================================

/// Scheduler events for hooks and notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakEvent {
    /// A break became due (also after a postponement expires); the
    /// notification start hook should run
    Due {
        category: BreakCategory,
        /// Reminder text for the user
        message: String,
        hooks: Option<Arc<BreakHooks>>,
    },
    /// The break began (for a timed break, its countdown); the break start
    /// hook should run
    Started {
        category: BreakCategory,
        hooks: Option<Arc<BreakHooks>>,
    },
    /// The break is over; the break end and notification end hooks run
    Ended {
        category: BreakCategory,
        hooks: Option<Arc<BreakHooks>>,
    },
    /// The user postponed a due or running break
    Postponed {
        category: BreakCategory,
        /// Time until the break is due again
        remaining: WallClock,
        hooks: Option<Arc<BreakHooks>>,
    },
    /// The user skipped a due or running break
    Dismissed {
        category: BreakCategory,
        hooks: Option<Arc<BreakHooks>>,
        /// The break countdown was running, so its end hook is owed
        countdown_stopped: bool,
    },
    /// Countdowns are running outside the active hours
    OutsideActiveHours {
        boundary: ActiveHoursBoundary,
        /// Command configured for this side of the window
        hook: Option<String>,
    },
}

impl BreakEvent {
    /// The category the event is about; `None` for active-hours events.
    pub fn category(&self) -> Option<BreakCategory> {
        match self {
            BreakEvent::Due { category, .. }
            | BreakEvent::Started { category, .. }
            | BreakEvent::Ended { category, .. }
            | BreakEvent::Postponed { category, .. }
            | BreakEvent::Dismissed { category, .. } => Some(*category),
            BreakEvent::OutsideActiveHours { .. } => None,
        }
    }
}

// ============================================================================
// SchedulerRegistry
// ============================================================================

/// Hands out at most one [`BreakScheduler`].
///
/// The application owns a single registry; a second call to
/// [`SchedulerRegistry::create`] fails instead of building a competing
/// scheduler.
#[derive(Debug, Default)]
pub struct SchedulerRegistry {
    created: AtomicBool,
}

impl SchedulerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the scheduler from one progress per category.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyInitialized`] if a scheduler was
    /// already created, or a category error if `breaks` does not hold
    /// exactly one progress per category. A rejected break list does not
    /// consume the registry.
    pub fn create(
        &self,
        breaks: impl IntoIterator<Item = BreakProgress>,
        event_tx: mpsc::UnboundedSender<BreakEvent>,
    ) -> Result<BreakScheduler, SchedulerError> {
        if self.is_created() {
            return Err(SchedulerError::AlreadyInitialized);
        }
        let breaks = collect_breaks(breaks)?;

        self.created
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SchedulerError::AlreadyInitialized)?;

        info!("Break scheduler created");
        Ok(BreakScheduler {
            breaks: Mutex::new(breaks),
            stopped: AtomicBool::new(false),
            active_hours: Mutex::new(ActiveHoursWatch::default()),
            event_tx,
        })
    }

    /// Returns true once a scheduler has been handed out.
    pub fn is_created(&self) -> bool {
        self.created.load(Ordering::SeqCst)
    }
}

fn collect_breaks(
    breaks: impl IntoIterator<Item = BreakProgress>,
) -> Result<BTreeMap<BreakCategory, BreakProgress>, SchedulerError> {
    let mut map = BTreeMap::new();
    for progress in breaks {
        let category = progress.category();
        if map.insert(category, progress).is_some() {
            return Err(SchedulerError::DuplicateCategory(category));
        }
    }
    if let Some(missing) = BreakCategory::ALL
        .into_iter()
        .find(|category| !map.contains_key(category))
    {
        return Err(SchedulerError::MissingCategory(missing));
    }
    Ok(map)
}

// ============================================================================
// BreakScheduler
// ============================================================================

/// The active-hours window and whether its warning may still fire.
#[derive(Debug, Default)]
struct ActiveHoursWatch {
    hours: Option<ActiveHours>,
    armed: bool,
}

/// Drives the break countdowns of every category.
pub struct BreakScheduler {
    /// Holds exactly one progress per category
    breaks: Mutex<BTreeMap<BreakCategory, BreakProgress>>,
    stopped: AtomicBool,
    active_hours: Mutex<ActiveHoursWatch>,
    event_tx: mpsc::UnboundedSender<BreakEvent>,
}

impl BreakScheduler {
    /// Returns the scheduler watching `hours`.
    #[must_use]
    pub fn with_active_hours(self, hours: Option<ActiveHours>) -> Self {
        self.set_active_hours(hours);
        self
    }

    /// Advances every enabled category by one second, at the current local
    /// time.
    pub fn tick(&self) {
        self.tick_at(Local::now().time());
    }

    /// Advances every enabled category by one second.
    ///
    /// Countdowns do not move while stopped. While a category is in a
    /// break, only that category advances. At most one break becomes due
    /// per tick; categories after it in [`BreakCategory::ALL`] wait for the
    /// next tick.
    ///
    /// The active-hours window is checked against `now` on every tick, also
    /// while stopped or during a break.
    pub fn tick_at(&self, now: NaiveTime) {
        let mut events = Vec::new();
        if !self.is_stopped() {
            let mut breaks = self.lock();
            let mut running = happening_category(&breaks);

            for progress in breaks.values_mut() {
                if !progress.is_enabled() {
                    continue;
                }
                if running.is_some_and(|category| category != progress.category()) {
                    continue;
                }

                if progress.tick() {
                    handle_expired(progress, &mut events);
                    running = Some(progress.category());
                }
            }
        }
        self.check_active_hours(now, &mut events);
        self.emit(events);
    }

    /// Stops or resumes every countdown.
    pub fn set_stopped(&self, stopped: bool) {
        let previous = self.stopped.swap(stopped, Ordering::SeqCst);
        if previous != stopped {
            info!(stopped, "Break scheduler {}", if stopped { "stopped" } else { "resumed" });
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Returns true if any category is due or in its break.
    pub fn is_break_happening(&self) -> bool {
        self.break_happening_category().is_some()
    }

    /// The category currently due or in its break, if any.
    ///
    /// Only an enabled category can be in a break: disabling a category
    /// ends its break.
    pub fn break_happening_category(&self) -> Option<BreakCategory> {
        happening_category(&self.lock())
    }

    /// Replaces the progress of its category.
    ///
    /// A postponed progress is kept as given, so its expiry will not run the
    /// break start hook again. Replacing a category in the middle of its
    /// break ends that break.
    pub fn update_break_todo(&self, progress: BreakProgress) {
        let category = progress.category();
        debug!(
            %category,
            phase = progress.phase().as_str(),
            remaining = %progress.remaining(),
            postponed = progress.is_postponed(),
            "Replacing break progress"
        );
        let replaced = self.lock().insert(category, progress);

        if let Some(old) = replaced.filter(BreakProgress::is_break_happening) {
            info!(%category, "Break replaced while in progress");
            self.emit(vec![BreakEvent::Ended {
                category,
                hooks: old.config().hooks().cloned(),
            }]);
        }
    }

    /// Enables or disables a category, keeping its countdown.
    ///
    /// Disabling a category that is due or in its break ends the break
    /// first, so a disabled category never holds up its siblings.
    pub fn set_break_enabled(&self, category: BreakCategory, enabled: bool) {
        let mut events = Vec::new();
        if let Some(progress) = self.lock().get_mut(&category) {
            if !enabled && progress.is_break_happening() {
                progress.finish_break();
                events.push(BreakEvent::Ended {
                    category,
                    hooks: progress.config().hooks().cloned(),
                });
            }
            progress.set_enabled(enabled);
            info!(%category, enabled, "Break enabled state changed");
        }
        self.emit(events);
    }

    /// Watches `hours`, or stops watching with `None`.
    ///
    /// Re-arms the outside-active-hours warning.
    pub fn set_active_hours(&self, hours: Option<ActiveHours>) {
        let mut watch = self.watch();
        watch.armed = hours.is_some();
        watch.hours = hours;
    }

    pub fn active_hours(&self) -> Option<ActiveHours> {
        self.watch().hours.clone()
    }

    /// Consistent snapshot of every category's progress.
    pub fn breaks_todo_list(&self) -> BTreeMap<BreakCategory, BreakProgress> {
        self.lock().clone()
    }

    /// Snapshot of one category's progress.
    pub fn get(&self, category: BreakCategory) -> BreakProgress {
        // every category is present from construction on
        self.lock()[&category].clone()
    }

    /// Postpones a break that is due or running by its configured delay.
    ///
    /// Returns false, changing nothing, if the request is refused.
    pub fn postpone(&self, category: BreakCategory) -> bool {
        self.postpone_with(category, None).is_ok()
    }

    /// Postpones a break that is due or running, by `duration` when given.
    ///
    /// Returns the time until the break is due again.
    ///
    /// # Errors
    ///
    /// Refuses, changing nothing, while the category is working, once the
    /// break is forced, or for a zero `duration`.
    pub fn postpone_with(
        &self,
        category: BreakCategory,
        duration: Option<WallClock>,
    ) -> Result<WallClock, DecisionError> {
        if duration.is_some_and(|duration| duration.is_zero()) {
            return Err(DecisionError::ZeroPostpone);
        }
        let mut remaining = WallClock::ZERO;
        let event = self.decide(category, |progress| {
            remaining = duration.unwrap_or(progress.config().postpone_duration());
            progress.postpone_for(remaining);
            BreakEvent::Postponed {
                category,
                remaining,
                hooks: progress.config().hooks().cloned(),
            }
        })?;
        debug!(%category, %remaining, "Break postponed");
        self.emit(vec![event]);
        Ok(remaining)
    }

    /// Skips a break that is due or running and restarts its work
    /// countdown.
    ///
    /// # Errors
    ///
    /// Refuses, changing nothing, while the category is working or once the
    /// break is forced.
    pub fn dismiss(&self, category: BreakCategory) -> Result<(), DecisionError> {
        let event = self.decide(category, |progress| {
            let countdown_stopped = progress.phase() == BreakPhase::BreakActive;
            progress.dismiss();
            BreakEvent::Dismissed {
                category,
                hooks: progress.config().hooks().cloned(),
                countdown_stopped,
            }
        })?;
        debug!(%category, "Break dismissed");
        self.emit(vec![event]);
        Ok(())
    }

    /// Ends a break that is due or running, as if it had finished.
    ///
    /// This is how a break without a timed phase ends. Acknowledging is
    /// always allowed, also for a forced break. Returns false while the
    /// category is still working.
    pub fn acknowledge(&self, category: BreakCategory) -> bool {
        let event = {
            let mut breaks = self.lock();
            let Some(progress) = breaks.get_mut(&category) else {
                return false;
            };
            if !progress.is_break_happening() {
                return false;
            }
            progress.finish_break();
            BreakEvent::Ended {
                category,
                hooks: progress.config().hooks().cloned(),
            }
        };
        debug!(%category, "Break acknowledged");
        self.emit(vec![event]);
        true
    }

    /// Applies a postpone or dismiss decision to a happening, unforced
    /// break.
    fn decide(
        &self,
        category: BreakCategory,
        apply: impl FnOnce(&mut BreakProgress) -> BreakEvent,
    ) -> Result<BreakEvent, DecisionError> {
        let mut breaks = self.lock();
        let progress = breaks
            .get_mut(&category)
            .filter(|progress| progress.is_break_happening())
            .ok_or(DecisionError::NotHappening(category))?;
        if progress.is_forced() {
            return Err(DecisionError::Forced(category));
        }
        Ok(apply(progress))
    }

    fn check_active_hours(&self, now: NaiveTime, events: &mut Vec<BreakEvent>) {
        let mut watch = self.watch();
        if !watch.armed {
            return;
        }
        let Some(hours) = &watch.hours else {
            return;
        };
        let Some(boundary) = hours.boundary_at(now) else {
            return;
        };

        let hook = hours.hook(boundary).map(str::to_string);
        watch.armed = false;
        info!(boundary = boundary.as_str(), %now, "Working outside active hours");
        events.push(BreakEvent::OutsideActiveHours { boundary, hook });
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<BreakCategory, BreakProgress>> {
        self.breaks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn watch(&self) -> MutexGuard<'_, ActiveHoursWatch> {
        self.active_hours
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends events without blocking; a closed receiver is not an error.
    fn emit(&self, events: Vec<BreakEvent>) {
        for event in events {
            if self.event_tx.send(event).is_err() {
                debug!("Break event receiver closed, dropping events");
                return;
            }
        }
    }
}

fn happening_category(breaks: &BTreeMap<BreakCategory, BreakProgress>) -> Option<BreakCategory> {
    breaks
        .values()
        .find(|progress| progress.is_break_happening())
        .map(BreakProgress::category)
}

/// Handles an exhausted countdown (phase transitions).
fn handle_expired(progress: &mut BreakProgress, events: &mut Vec<BreakEvent>) {
    let category = progress.category();
    match progress.phase() {
        BreakPhase::Working => {
            let fire_start = progress.start_break();
            debug!(%category, fire_start, phase = progress.phase().as_str(), "Break due");

            let hooks = progress.config().hooks().cloned();
            events.push(BreakEvent::Due {
                category,
                message: progress.due_message(),
                hooks: hooks.clone(),
            });
            if fire_start {
                events.push(BreakEvent::Started { category, hooks });
            }
        }
        BreakPhase::BreakActive => {
            progress.finish_break();
            debug!(%category, "Break finished");

            events.push(BreakEvent::Ended {
                category,
                hooks: progress.config().hooks().cloned(),
            });
        }
        // waits for acknowledge()
        BreakPhase::BreakDue => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
