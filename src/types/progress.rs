//! Runtime state of one break category.

use serde::{Deserialize, Serialize};

use super::break_config::{BreakConfig, BreakPhaseConfig};
use super::category::BreakCategory;
use super::clock::WallClock;

// ============================================================================
// BreakPhase
// ============================================================================

/// Where a category is in its work/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPhase {
    /// Counting down the work interval (or a postponement)
    #[default]
    Working,
    /// The break is due and waits for the user
    BreakDue,
    /// Counting down the break itself
    BreakActive,
}

impl BreakPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakPhase::Working => "working",
            BreakPhase::BreakDue => "break_due",
            BreakPhase::BreakActive => "break_active",
        }
    }

    /// Returns true while a break is due or running.
    pub fn is_break(&self) -> bool {
        !matches!(self, BreakPhase::Working)
    }
}

// ============================================================================
// BreakStatus
// ============================================================================

/// State reported to the user, derived from the phase and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStatus {
    Disabled,
    Working,
    Postponed,
    BreakDue,
    BreakActive,
}

impl BreakStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakStatus::Disabled => "disabled",
            BreakStatus::Working => "working",
            BreakStatus::Postponed => "postponed",
            BreakStatus::BreakDue => "break_due",
            BreakStatus::BreakActive => "break_active",
        }
    }
}

// ============================================================================
// BreakProgress
// ============================================================================

/// Postponements after which a break can no longer be put off.
pub const MAX_POSTPONES: u8 = 4;

/// Dismissals after which a break can no longer be skipped.
pub const MAX_DISMISSES: u8 = 3;

/// Countdown state for one category.
///
/// A fresh progress starts in [`BreakPhase::Working`] with the full work
/// duration remaining. While in [`BreakPhase::BreakDue`] the remaining time
/// is always zero.
///
/// Postponements and dismissals are counted until a break is taken. Once
/// either count reaches its limit the break is forced: it can only be
/// taken or acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakProgress {
    config: BreakConfig,
    phase: BreakPhase,
    remaining: WallClock,
    postponed: bool,
    postpone_count: u8,
    dismiss_count: u8,
    status_message: String,
}

impl BreakProgress {
    /// Creates a progress at the start of the work interval.
    pub fn new(config: BreakConfig) -> Self {
        let mut progress = Self {
            remaining: config.work_duration(),
            config,
            phase: BreakPhase::Working,
            postponed: false,
            postpone_count: 0,
            dismiss_count: 0,
            status_message: String::new(),
        };
        progress.refresh_status();
        progress
    }

    /// Returns this progress restarted as a postponement.
    #[must_use]
    pub fn postponed(mut self) -> Self {
        self.postpone();
        self
    }

    /// Restarts the countdown with the postpone duration.
    ///
    /// The break start hook is not emitted again when this countdown
    /// expires.
    pub fn postpone(&mut self) {
        self.postpone_for(self.config.postpone_duration());
    }

    pub fn category(&self) -> BreakCategory {
        self.config.category()
    }

    pub fn config(&self) -> &BreakConfig {
        &self.config
    }

    pub fn phase(&self) -> BreakPhase {
        self.phase
    }

    pub fn remaining(&self) -> WallClock {
        self.remaining
    }

    pub fn is_postponed(&self) -> bool {
        self.postponed
    }

    /// Postponements since the last break was taken.
    pub fn postpone_count(&self) -> u8 {
        self.postpone_count
    }

    /// Dismissals since the last break was taken.
    pub fn dismiss_count(&self) -> u8 {
        self.dismiss_count
    }

    /// Returns true once the break can no longer be postponed or dismissed.
    pub fn is_forced(&self) -> bool {
        self.postpone_count >= MAX_POSTPONES || self.dismiss_count >= MAX_DISMISSES
    }

    /// The reminder text shown when the break becomes due.
    pub fn due_message(&self) -> String {
        let name = self.category().name();
        if self.is_forced() {
            format!("Time for a {name}, it cannot be put off again")
        } else {
            format!("Time for a {name}")
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Short human-readable description of the current state.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Returns true if the break is due or running, regardless of enablement.
    pub fn is_break_happening(&self) -> bool {
        self.phase.is_break()
    }

    pub fn status(&self) -> BreakStatus {
        if !self.config.is_enabled() {
            return BreakStatus::Disabled;
        }
        match self.phase {
            BreakPhase::Working if self.postponed => BreakStatus::Postponed,
            BreakPhase::Working => BreakStatus::Working,
            BreakPhase::BreakDue => BreakStatus::BreakDue,
            BreakPhase::BreakActive => BreakStatus::BreakActive,
        }
    }

    // ------------------------------------------------------------------------
    // Transitions driven by the scheduler
    // ------------------------------------------------------------------------

    /// Advances the countdown by one second.
    ///
    /// Returns true when the current countdown is exhausted. A break waiting
    /// for acknowledgement never completes on its own.
    pub(crate) fn tick(&mut self) -> bool {
        if self.phase == BreakPhase::BreakDue {
            return false;
        }
        let decremented = self.remaining.subtract_seconds(1);
        self.refresh_status();
        !decremented || self.remaining.is_zero()
    }

    /// Moves an expired work countdown into the break.
    ///
    /// Returns true if the break start hook should run, i.e. the expiry was
    /// not the end of a postponement.
    pub(crate) fn start_break(&mut self) -> bool {
        let fire_start = !self.postponed;
        match self.config.phase() {
            BreakPhaseConfig::Timed { duration } => {
                self.phase = BreakPhase::BreakActive;
                self.remaining = duration;
            }
            BreakPhaseConfig::Acknowledged => {
                self.phase = BreakPhase::BreakDue;
                self.remaining = WallClock::ZERO;
            }
        }
        self.refresh_status();
        fire_start
    }

    /// Ends the break and restarts the work countdown.
    ///
    /// A taken break clears the postpone and dismiss counts.
    pub(crate) fn finish_break(&mut self) {
        self.phase = BreakPhase::Working;
        self.remaining = self.config.work_duration();
        self.postponed = false;
        self.postpone_count = 0;
        self.dismiss_count = 0;
        self.refresh_status();
    }

    /// Restarts the countdown with `duration` instead of the configured
    /// postpone duration.
    pub(crate) fn postpone_for(&mut self, duration: WallClock) {
        self.phase = BreakPhase::Working;
        self.remaining = duration;
        self.postponed = true;
        self.postpone_count = self.postpone_count.saturating_add(1);
        self.refresh_status();
    }

    /// Skips the break and restarts the work countdown.
    pub(crate) fn dismiss(&mut self) {
        self.phase = BreakPhase::Working;
        self.remaining = self.config.work_duration();
        self.postponed = false;
        self.dismiss_count = self.dismiss_count.saturating_add(1);
        self.refresh_status();
    }

    /// Swaps the enabled flag, keeping the countdown.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.config = self.config.clone().with_enabled(enabled);
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let name = self.category().name();
        let remaining = if self.remaining.is_zero() {
            "now".to_string()
        } else {
            format!("in {}", self.remaining)
        };
        self.status_message = match self.status() {
            BreakStatus::Disabled => format!("{name} disabled"),
            BreakStatus::Working => format!("Next {name} {remaining}"),
            BreakStatus::Postponed => format!("{name} postponed, due {remaining}"),
            BreakStatus::BreakDue => self.due_message(),
            BreakStatus::BreakActive => format!("{name} ends {remaining}"),
        };
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small(work: u32, brk: u32, postpone: u32) -> BreakConfig {
        BreakConfig::new(
            BreakCategory::SmallBreak,
            WallClock::from_seconds(work),
            Some(WallClock::from_seconds(brk)),
            WallClock::from_seconds(postpone),
        )
        .unwrap()
    }

    fn day(work: u32, postpone: u32) -> BreakConfig {
        BreakConfig::new(
            BreakCategory::DayBreak,
            WallClock::from_seconds(work),
            None,
            WallClock::from_seconds(postpone),
        )
        .unwrap()
    }

    mod break_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_working() {
            assert_eq!(BreakPhase::default(), BreakPhase::Working);
        }

        #[test]
        fn test_is_break() {
            assert!(!BreakPhase::Working.is_break());
            assert!(BreakPhase::BreakDue.is_break());
            assert!(BreakPhase::BreakActive.is_break());
        }

        #[test]
        fn test_as_str() {
            assert_eq!(BreakPhase::BreakDue.as_str(), "break_due");
            assert_eq!(BreakStatus::Postponed.as_str(), "postponed");
        }
    }

    mod break_progress_tests {
        use super::*;

        #[test]
        fn test_new_progress() {
            let progress = BreakProgress::new(small(10, 3, 5));
            assert_eq!(progress.category(), BreakCategory::SmallBreak);
            assert_eq!(progress.phase(), BreakPhase::Working);
            assert_eq!(progress.remaining(), WallClock::from_seconds(10));
            assert!(!progress.is_postponed());
            assert_eq!(progress.status(), BreakStatus::Working);
            assert_eq!(progress.status_message(), "Next small break in 10s");
        }

        #[test]
        fn test_tick_counts_down() {
            let mut progress = BreakProgress::new(small(3, 1, 1));
            assert!(!progress.tick());
            assert!(!progress.tick());
            assert!(progress.tick());
            assert!(progress.remaining().is_zero());
            assert_eq!(progress.status_message(), "Next small break now");
        }

        #[test]
        fn test_tick_at_zero_completes() {
            let mut progress = BreakProgress::new(small(1, 1, 1));
            assert!(progress.tick());
            assert!(progress.tick());
            assert!(progress.remaining().is_zero());
        }

        #[test]
        fn test_start_timed_break() {
            let mut progress = BreakProgress::new(small(1, 4, 1));
            progress.tick();
            assert!(progress.start_break());
            assert_eq!(progress.phase(), BreakPhase::BreakActive);
            assert_eq!(progress.remaining(), WallClock::from_seconds(4));
            assert_eq!(progress.status(), BreakStatus::BreakActive);
        }

        #[test]
        fn test_start_acknowledged_break_waits() {
            let mut progress = BreakProgress::new(day(1, 5));
            progress.tick();
            assert!(progress.start_break());
            assert_eq!(progress.phase(), BreakPhase::BreakDue);
            assert!(progress.remaining().is_zero());

            for _ in 0..10 {
                assert!(!progress.tick());
            }
            assert_eq!(progress.phase(), BreakPhase::BreakDue);
            assert_eq!(progress.status_message(), "Time for a day break");
        }

        #[test]
        fn test_postpone_suppresses_start_hook() {
            let mut progress = BreakProgress::new(small(1, 1, 2)).postponed();
            assert_eq!(progress.status(), BreakStatus::Postponed);
            assert_eq!(progress.remaining(), WallClock::from_seconds(2));

            assert!(!progress.tick());
            assert!(progress.tick());
            assert!(!progress.start_break());
            assert_eq!(progress.phase(), BreakPhase::BreakActive);
        }

        #[test]
        fn test_finish_break_resets() {
            let mut progress = BreakProgress::new(small(7, 1, 2)).postponed();
            progress.start_break();
            progress.finish_break();
            assert_eq!(progress.phase(), BreakPhase::Working);
            assert_eq!(progress.remaining(), WallClock::from_seconds(7));
            assert!(!progress.is_postponed());
        }

        #[test]
        fn test_postpone_from_active_break() {
            let mut progress = BreakProgress::new(small(1, 5, 3));
            progress.tick();
            progress.start_break();
            progress.postpone();
            assert_eq!(progress.phase(), BreakPhase::Working);
            assert_eq!(progress.remaining(), WallClock::from_seconds(3));
            assert!(progress.is_postponed());
        }

        #[test]
        fn test_due_message_for_timed_break() {
            let mut progress = BreakProgress::new(small(1, 4, 1));
            progress.tick();
            progress.start_break();
            assert_eq!(progress.due_message(), "Time for a small break");
            assert_eq!(progress.status_message(), "small break ends in 4s");
        }

        #[test]
        fn test_postpone_for_counts() {
            let mut progress = BreakProgress::new(small(1, 5, 3));
            progress.postpone_for(WallClock::from_seconds(42));
            assert_eq!(progress.remaining(), WallClock::from_seconds(42));
            assert!(progress.is_postponed());
            assert_eq!(progress.postpone_count(), 1);

            progress.postpone();
            assert_eq!(progress.remaining(), WallClock::from_seconds(3));
            assert_eq!(progress.postpone_count(), 2);
        }

        #[test]
        fn test_dismiss_restarts_work() {
            let mut progress = BreakProgress::new(small(6, 5, 3)).postponed();
            progress.start_break();
            progress.dismiss();
            assert_eq!(progress.phase(), BreakPhase::Working);
            assert_eq!(progress.remaining(), WallClock::from_seconds(6));
            assert!(!progress.is_postponed());
            assert_eq!(progress.dismiss_count(), 1);
            assert_eq!(progress.postpone_count(), 1);
        }

        #[test]
        fn test_limits_force_the_break() {
            let mut progress = BreakProgress::new(day(1, 5));
            for _ in 0..MAX_DISMISSES {
                assert!(!progress.is_forced());
                progress.dismiss();
            }
            assert!(progress.is_forced());
            assert_eq!(
                progress.due_message(),
                "Time for a day break, it cannot be put off again"
            );

            progress.finish_break();
            assert!(!progress.is_forced());
            assert_eq!(progress.dismiss_count(), 0);

            for _ in 0..MAX_POSTPONES {
                progress.postpone();
            }
            assert!(progress.is_forced());
        }

        #[test]
        fn test_set_enabled_keeps_countdown() {
            let mut progress = BreakProgress::new(small(10, 1, 1));
            progress.tick();
            progress.set_enabled(false);
            assert_eq!(progress.status(), BreakStatus::Disabled);
            assert_eq!(progress.remaining(), WallClock::from_seconds(9));
            assert_eq!(progress.status_message(), "small break disabled");

            progress.set_enabled(true);
            assert_eq!(progress.status(), BreakStatus::Working);
            assert_eq!(progress.remaining(), WallClock::from_seconds(9));
        }
    }
}
