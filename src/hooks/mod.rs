//! Break hooks and notifications.
//!
//! The scheduler never runs external actions itself. It emits
//! [`BreakEvent`]s into a channel, and the [`HookDispatcher`] consumes them
//! on the async runtime:
//!
//! 1. Every event that concerns the user goes to a [`BreakNotifier`] as soon
//!    as it arrives, so the UI can present or dismiss the break
//! 2. Hook commands are queued and handed to a [`HookInvoker`] one at a
//!    time (shell commands in production, see [`CommandHookInvoker`])
//!
//! Each category has two hook pairs. The notification pair brackets the
//! reminder: it starts when the break is due and ends when the user takes,
//! postpones or skips it. The break pair brackets the timed break itself and
//! is never set for the day break.
//!
//! # Error Handling
//!
//! Hook errors are logged and dropped. They never reach the scheduler.

pub mod command;
pub mod error;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub use command::{run_hook_command, CommandHookInvoker, DEFAULT_TIMEOUT_SECONDS};
pub use error::HookError;

use crate::daemon::BreakEvent;
use crate::types::{ActiveHoursBoundary, BreakCategory, BreakHooks, WallClock};

// ============================================================================
// HookInvoker
// ============================================================================

/// Runs the external actions tied to a break.
#[allow(async_fn_in_trait)]
pub trait HookInvoker {
    async fn on_notification_start(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError>;

    async fn on_notification_end(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError>;

    async fn on_break_start(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError>;

    async fn on_break_end(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError>;

    async fn on_outside_active_hours(
        &self,
        boundary: ActiveHoursBoundary,
        command: Option<&str>,
    ) -> Result<(), HookError>;
}

/// A recorded hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCall {
    NotificationStart(BreakCategory),
    NotificationEnd(BreakCategory),
    Start(BreakCategory),
    End(BreakCategory),
    OutsideActiveHours(ActiveHoursBoundary),
}

#[derive(Debug, Default)]
pub struct MockHookInvoker {
    calls: Mutex<Vec<HookCall>>,
    should_fail: AtomicBool,
    should_hang: AtomicBool,
}

impl MockHookInvoker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes every later call record itself and then never return.
    pub fn set_should_hang(&self, should_hang: bool) {
        self.should_hang.store(should_hang, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of break start hooks run.
    #[must_use]
    pub fn start_call_count(&self) -> usize {
        self.count(|call| matches!(call, HookCall::Start(_)))
    }

    /// Number of break end hooks run.
    #[must_use]
    pub fn end_call_count(&self) -> usize {
        self.count(|call| matches!(call, HookCall::End(_)))
    }

    #[must_use]
    pub fn notification_call_count(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                HookCall::NotificationStart(_) | HookCall::NotificationEnd(_)
            )
        })
    }

    fn count(&self, pred: impl Fn(&HookCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: HookCall) -> Result<(), HookError> {
        self.calls.lock().unwrap().push(call);
        if self.should_hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(HookError::Other("simulated failure".to_string()));
        }
        Ok(())
    }
}

impl HookInvoker for MockHookInvoker {
    async fn on_notification_start(
        &self,
        category: BreakCategory,
        _hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        self.record(HookCall::NotificationStart(category)).await
    }

    async fn on_notification_end(
        &self,
        category: BreakCategory,
        _hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        self.record(HookCall::NotificationEnd(category)).await
    }

    async fn on_break_start(
        &self,
        category: BreakCategory,
        _hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        self.record(HookCall::Start(category)).await
    }

    async fn on_break_end(
        &self,
        category: BreakCategory,
        _hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        self.record(HookCall::End(category)).await
    }

    async fn on_outside_active_hours(
        &self,
        boundary: ActiveHoursBoundary,
        _command: Option<&str>,
    ) -> Result<(), HookError> {
        self.record(HookCall::OutsideActiveHours(boundary)).await
    }
}

// ============================================================================
// BreakNotifier
// ============================================================================

/// Something the UI should show or dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakNotice {
    Due {
        category: BreakCategory,
        message: String,
    },
    Ended {
        category: BreakCategory,
    },
    Postponed {
        category: BreakCategory,
        remaining: WallClock,
    },
    Dismissed {
        category: BreakCategory,
    },
    OutsideActiveHours {
        boundary: ActiveHoursBoundary,
    },
}

/// Presents breaks to the user.
pub trait BreakNotifier {
    fn break_due(&self, category: BreakCategory, message: &str);

    fn break_ended(&self, category: BreakCategory);

    fn break_postponed(&self, _category: BreakCategory, _remaining: WallClock) {}

    fn break_dismissed(&self, _category: BreakCategory) {}

    fn outside_active_hours(&self, _boundary: ActiveHoursBoundary) {}
}

/// Forwards notices to a UI thread over a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: crossbeam_channel::Sender<BreakNotice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(tx: crossbeam_channel::Sender<BreakNotice>) -> Self {
        Self { tx }
    }

    /// Creates a notifier together with the receiving end for the UI.
    #[must_use]
    pub fn channel() -> (Self, crossbeam_channel::Receiver<BreakNotice>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    fn send(&self, notice: BreakNotice) {
        if self.tx.send(notice).is_err() {
            debug!("Notice receiver closed");
        }
    }
}

impl BreakNotifier for ChannelNotifier {
    fn break_due(&self, category: BreakCategory, message: &str) {
        self.send(BreakNotice::Due {
            category,
            message: message.to_string(),
        });
    }

    fn break_ended(&self, category: BreakCategory) {
        self.send(BreakNotice::Ended { category });
    }

    fn break_postponed(&self, category: BreakCategory, remaining: WallClock) {
        self.send(BreakNotice::Postponed {
            category,
            remaining,
        });
    }

    fn break_dismissed(&self, category: BreakCategory) {
        self.send(BreakNotice::Dismissed { category });
    }

    fn outside_active_hours(&self, boundary: ActiveHoursBoundary) {
        self.send(BreakNotice::OutsideActiveHours { boundary });
    }
}

#[derive(Debug, Default)]
pub struct MockBreakNotifier {
    notices: Mutex<Vec<BreakNotice>>,
}

impl MockBreakNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<BreakNotice> {
        self.notices.lock().unwrap().clone()
    }

    fn push(&self, notice: BreakNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl BreakNotifier for MockBreakNotifier {
    fn break_due(&self, category: BreakCategory, message: &str) {
        self.push(BreakNotice::Due {
            category,
            message: message.to_string(),
        });
    }

    fn break_ended(&self, category: BreakCategory) {
        self.push(BreakNotice::Ended { category });
    }

    fn break_postponed(&self, category: BreakCategory, remaining: WallClock) {
        self.push(BreakNotice::Postponed {
            category,
            remaining,
        });
    }

    fn break_dismissed(&self, category: BreakCategory) {
        self.push(BreakNotice::Dismissed { category });
    }

    fn outside_active_hours(&self, boundary: ActiveHoursBoundary) {
        self.push(BreakNotice::OutsideActiveHours { boundary });
    }
}

// ============================================================================
// HookDispatcher
// ============================================================================

/// A hook command waiting for its turn.
#[derive(Debug, Clone)]
enum HookJob {
    NotificationStart(BreakCategory, Option<Arc<BreakHooks>>),
    NotificationEnd(BreakCategory, Option<Arc<BreakHooks>>),
    BreakStart(BreakCategory, Option<Arc<BreakHooks>>),
    BreakEnd(BreakCategory, Option<Arc<BreakHooks>>),
    OutsideActiveHours(ActiveHoursBoundary, Option<String>),
}

impl HookJob {
    fn name(&self) -> &'static str {
        match self {
            HookJob::NotificationStart(..) => "notification start",
            HookJob::NotificationEnd(..) => "notification end",
            HookJob::BreakStart(..) => "break start",
            HookJob::BreakEnd(..) => "break end",
            HookJob::OutsideActiveHours(..) => "outside active hours",
        }
    }
}

/// Sends the notice for `event` right away and queues its hooks.
fn accept<N: BreakNotifier>(notifier: &N, pending: &mut VecDeque<HookJob>, event: BreakEvent) {
    debug!(category = ?event.category(), queued = pending.len(), "Break event received");
    match event {
        BreakEvent::Due {
            category,
            message,
            hooks,
        } => {
            notifier.break_due(category, &message);
            pending.push_back(HookJob::NotificationStart(category, hooks));
        }
        BreakEvent::Started { category, hooks } => {
            pending.push_back(HookJob::BreakStart(category, hooks));
        }
        BreakEvent::Ended { category, hooks } => {
            notifier.break_ended(category);
            pending.push_back(HookJob::BreakEnd(category, hooks.clone()));
            pending.push_back(HookJob::NotificationEnd(category, hooks));
        }
        BreakEvent::Postponed {
            category,
            remaining,
            hooks,
        } => {
            notifier.break_postponed(category, remaining);
            pending.push_back(HookJob::NotificationEnd(category, hooks));
        }
        BreakEvent::Dismissed {
            category,
            hooks,
            countdown_stopped,
        } => {
            notifier.break_dismissed(category);
            if countdown_stopped {
                pending.push_back(HookJob::BreakEnd(category, hooks.clone()));
            }
            pending.push_back(HookJob::NotificationEnd(category, hooks));
        }
        BreakEvent::OutsideActiveHours { boundary, hook } => {
            notifier.outside_active_hours(boundary);
            pending.push_back(HookJob::OutsideActiveHours(boundary, hook));
        }
    }
}

/// Runs one queued hook; failures are logged.
async fn run_job<H: HookInvoker>(invoker: &H, job: &HookJob) {
    let result = match job {
        HookJob::NotificationStart(category, hooks) => {
            invoker
                .on_notification_start(*category, hooks.as_deref())
                .await
        }
        HookJob::NotificationEnd(category, hooks) => {
            invoker.on_notification_end(*category, hooks.as_deref()).await
        }
        HookJob::BreakStart(category, hooks) => {
            invoker.on_break_start(*category, hooks.as_deref()).await
        }
        HookJob::BreakEnd(category, hooks) => {
            invoker.on_break_end(*category, hooks.as_deref()).await
        }
        HookJob::OutsideActiveHours(boundary, command) => {
            invoker
                .on_outside_active_hours(*boundary, command.as_deref())
                .await
        }
    };

    if let Err(e) = result {
        if e.is_timeout() {
            warn!(hook = job.name(), "Hook was stopped: {} ({})", e, e.suggestion());
        } else {
            warn!(hook = job.name(), "Hook failed: {} ({})", e, e.suggestion());
        }
    }
}

/// Consumes scheduler events and runs hooks and notifications.
///
/// Notices are sent the moment an event arrives. Hooks wait in a queue and
/// run one at a time in the order the scheduler emitted their events, so
/// the end hook of a break never overtakes its start hook, and a slow hook
/// holds up later hooks but never a notice.
pub struct HookDispatcher<H, N> {
    invoker: H,
    notifier: N,
    event_rx: mpsc::UnboundedReceiver<BreakEvent>,
    pending: VecDeque<HookJob>,
    closed: bool,
}

impl<H: HookInvoker, N: BreakNotifier> HookDispatcher<H, N> {
    pub fn new(invoker: H, notifier: N, event_rx: mpsc::UnboundedReceiver<BreakEvent>) -> Self {
        Self {
            invoker,
            notifier,
            event_rx,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    /// Handles events until every sender is dropped and the hook queue is
    /// empty.
    ///
    /// Returns the number of events handled. When the future is dropped,
    /// the hook that was running is cut short and the rest stay queued for
    /// [`drain`](Self::drain).
    pub async fn run(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if let Some(job) = self.pending.pop_front() {
                let hook = run_job(&self.invoker, &job);
                tokio::pin!(hook);
                loop {
                    tokio::select! {
                        () = &mut hook => break,
                        event = self.event_rx.recv(), if !self.closed => match event {
                            Some(event) => {
                                accept(&self.notifier, &mut self.pending, event);
                                handled += 1;
                            }
                            None => self.closed = true,
                        },
                    }
                }
            } else if self.closed {
                break;
            } else {
                match self.event_rx.recv().await {
                    Some(event) => {
                        accept(&self.notifier, &mut self.pending, event);
                        handled += 1;
                    }
                    None => self.closed = true,
                }
            }
        }
        debug!(handled, "Break event channel closed");
        handled
    }

    /// Handles the events already queued and runs every pending hook,
    /// without waiting for more events.
    ///
    /// Used at shutdown, after the ticker has stopped.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            accept(&self.notifier, &mut self.pending, event);
            handled += 1;
        }
        while let Some(job) = self.pending.pop_front() {
            run_job(&self.invoker, &job).await;
        }
        handled
    }

    pub fn invoker(&self) -> &H {
        &self.invoker
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

// ============================================================================
// Tests
// ============================================================================
