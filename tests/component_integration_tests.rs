//! Component integration tests.
//!
//! Wires the real components together: the ticker driving the scheduler,
//! shell hooks run by `CommandHookInvoker`, and notices delivered over the
//! crossbeam channel used by `restbreak run`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use restbreak::daemon::{BreakEvent, BreakScheduler, SchedulerRegistry, Ticker};
use restbreak::hooks::{
    BreakNotice, ChannelNotifier, HookDispatcher, MockBreakNotifier, MockHookInvoker,
};
use restbreak::types::{BreakCategory, BreakConfig, BreakPhase, BreakProgress, WallClock};

fn create_scheduler(
    small: BreakConfig,
) -> (Arc<BreakScheduler>, mpsc::UnboundedReceiver<BreakEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let breaks = [
        small,
        BreakConfig::default_for(BreakCategory::StretchBreak),
        BreakConfig::default_for(BreakCategory::DayBreak),
    ]
    .map(BreakProgress::new);
    let scheduler = SchedulerRegistry::new().create(breaks, tx).unwrap();
    (Arc::new(scheduler), rx)
}

fn fast_small_break() -> BreakConfig {
    BreakConfig::new(
        BreakCategory::SmallBreak,
        WallClock::from_seconds(1),
        Some(WallClock::from_seconds(1)),
        WallClock::from_seconds(5),
    )
    .unwrap()
}

mod ticker_integration {
    use super::*;

    #[tokio::test]
    async fn test_ticker_drives_full_break() {
        let (scheduler, rx) = create_scheduler(fast_small_break());
        let mut dispatcher =
            HookDispatcher::new(MockHookInvoker::new(), MockBreakNotifier::new(), rx);
        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));

        assert_eq!(ticker.run(Some(2)).await, 2);
        assert_eq!(dispatcher.drain().await, 3);

        assert_eq!(dispatcher.invoker().start_call_count(), 1);
        assert_eq!(dispatcher.invoker().end_call_count(), 1);
        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).phase(),
            BreakPhase::Working
        );
    }

    #[tokio::test]
    async fn test_ticker_and_dispatcher_run_together() {
        let (scheduler, rx) = create_scheduler(fast_small_break());
        let mut dispatcher =
            HookDispatcher::new(MockHookInvoker::new(), MockBreakNotifier::new(), rx);
        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));

        tokio::select! {
            _ = ticker.run(Some(4)) => {}
            _ = dispatcher.run() => unreachable!("scheduler still holds the sender"),
        }
        dispatcher.drain().await;

        // two full cycles
        assert_eq!(dispatcher.invoker().start_call_count(), 2);
        assert_eq!(dispatcher.invoker().end_call_count(), 2);
    }

    #[tokio::test]
    async fn test_stopped_scheduler_ignores_ticker() {
        let (scheduler, _rx) = create_scheduler(fast_small_break());
        scheduler.set_stopped(true);

        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));
        ticker.run(Some(3)).await;

        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).remaining(),
            WallClock::from_seconds(1)
        );
    }
}

mod notifier_integration {
    use super::*;

    #[tokio::test]
    async fn test_notices_cross_thread_boundary() {
        let (scheduler, rx) = create_scheduler(fast_small_break());
        let (notifier, notice_rx) = ChannelNotifier::channel();
        let printer = std::thread::spawn(move || notice_rx.iter().collect::<Vec<_>>());

        let mut dispatcher = HookDispatcher::new(MockHookInvoker::new(), notifier, rx);
        scheduler.tick();
        scheduler.tick();
        assert!(!scheduler.postpone(BreakCategory::SmallBreak));
        dispatcher.drain().await;
        drop(dispatcher);

        let notices = printer.join().unwrap();
        assert_eq!(
            notices,
            vec![
                BreakNotice::Due {
                    category: BreakCategory::SmallBreak,
                    message: "Time for a small break".into(),
                },
                BreakNotice::Ended {
                    category: BreakCategory::SmallBreak,
                },
            ]
        );
    }
}

#[cfg(unix)]
mod command_hook_integration {
    use super::*;
    use restbreak::config::{AppConfig, ConfigStore};
    use restbreak::hooks::{CommandHookInvoker, HookInvoker};
    use restbreak::types::{BreakHooks, HookSet};

    fn hooked_small_break(dir: &std::path::Path) -> BreakConfig {
        let log = dir.join("hooks.log");
        let echo = |word: &str| Some(format!("echo {word} >> {}", log.display()));
        fast_small_break().with_hooks(BreakHooks::new(
            HookSet::new(echo("due"), echo("gone")),
            Some(HookSet::new(echo("start"), echo("end"))),
        ))
    }

    #[tokio::test]
    async fn test_hooks_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, rx) = create_scheduler(hooked_small_break(dir.path()));
        let mut dispatcher =
            HookDispatcher::new(CommandHookInvoker::new(5), MockBreakNotifier::new(), rx);

        scheduler.tick();
        scheduler.tick();
        dispatcher.drain().await;

        let log = std::fs::read_to_string(dir.path().join("hooks.log")).unwrap();
        assert_eq!(log, "due\nstart\nend\ngone\n");
    }

    #[tokio::test]
    async fn test_postponed_break_closes_reminder_only() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, rx) = create_scheduler(hooked_small_break(dir.path()));
        let mut dispatcher =
            HookDispatcher::new(CommandHookInvoker::new(5), MockBreakNotifier::new(), rx);

        scheduler.tick();
        assert!(scheduler.postpone(BreakCategory::SmallBreak));
        dispatcher.drain().await;

        let log = std::fs::read_to_string(dir.path().join("hooks.log")).unwrap();
        assert_eq!(log, "due\nstart\ngone\n");
    }

    #[tokio::test]
    async fn test_disabled_start_hook_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut pair = HookSet::new(
            Some(format!("touch {}", dir.path().join("start").display())),
            Some(format!("touch {}", dir.path().join("end").display())),
        );
        pair.start_enabled = false;
        let hooks = BreakHooks::countdown(pair);

        let invoker = CommandHookInvoker::default();
        invoker
            .on_break_start(BreakCategory::SmallBreak, Some(&hooks))
            .await
            .unwrap();
        invoker
            .on_break_end(BreakCategory::SmallBreak, Some(&hooks))
            .await
            .unwrap();

        assert!(!dir.path().join("start").exists());
        assert!(dir.path().join("end").exists());
    }

    #[tokio::test]
    async fn test_failing_hook_keeps_schedule() {
        let config = fast_small_break()
            .with_hooks(BreakHooks::countdown(HookSet::new(Some("exit 3".into()), None)));
        let (scheduler, rx) = create_scheduler(config);
        let mut dispatcher =
            HookDispatcher::new(CommandHookInvoker::new(5), MockBreakNotifier::new(), rx);

        scheduler.tick();
        dispatcher.drain().await;
        scheduler.tick();
        dispatcher.drain().await;

        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).phase(),
            BreakPhase::Working
        );
        assert_eq!(dispatcher.notifier().notices().len(), 2);
    }

    #[tokio::test]
    async fn test_hooks_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let mut app = AppConfig::default();
        app.set_break_config(&hooked_small_break(dir.path()));
        store.save(&app).unwrap();

        let loaded = store.load_break_configs().unwrap();
        let (scheduler, rx) = create_scheduler(loaded[0].clone());
        let mut dispatcher = HookDispatcher::new(
            CommandHookInvoker::new(store.load().unwrap().hook_timeout_seconds),
            MockBreakNotifier::new(),
            rx,
        );

        scheduler.tick();
        dispatcher.drain().await;

        let log = std::fs::read_to_string(dir.path().join("hooks.log")).unwrap();
        assert_eq!(log, "due\nstart\n");
    }
}
