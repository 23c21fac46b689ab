//! Shell command execution for break hooks.
//!
//! Hook commands run through the platform shell (`sh -c` or `cmd /C`) on
//! the async runtime, bounded by a timeout so a hanging command cannot hold
//! up later events.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

use super::error::HookError;
use super::HookInvoker;
use crate::types::{ActiveHoursBoundary, BreakCategory, BreakHooks, HookSet};

/// Default timeout for hook execution in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Runs `command` through the shell, waiting at most `timeout_seconds`.
///
/// # Errors
///
/// Returns an error if:
/// - The shell cannot be spawned (`HookError::SpawnFailed`)
/// - The command exits unsuccessfully (`HookError::ExitStatus`)
/// - Execution times out (`HookError::Timeout`); the child is killed
pub async fn run_hook_command(command: &str, timeout_seconds: u64) -> Result<(), HookError> {
    info!("Running hook command: {}", command);

    let result = timeout(
        Duration::from_secs(timeout_seconds),
        execute_command(command),
    )
    .await;

    match result {
        Ok(Ok(())) => {
            info!("Hook command finished: {}", command);
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Hook command failed: {}", e);
            Err(e)
        }
        Err(_) => {
            error!("Hook command timed out: {}", command);
            Err(HookError::Timeout(command.to_string(), timeout_seconds))
        }
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C");
        cmd
    };
    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c");
        cmd
    };
    cmd.arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

async fn execute_command(command: &str) -> Result<(), HookError> {
    let output = shell_command(command)
        .output()
        .await
        .map_err(|e| HookError::SpawnFailed(command.to_string(), e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!(command, "hook stdout: {}", stdout.trim());
    }

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(HookError::ExitStatus {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

// ============================================================================
// CommandHookInvoker
// ============================================================================

/// Runs the commands of a category's [`BreakHooks`].
#[derive(Debug, Clone)]
pub struct CommandHookInvoker {
    timeout_seconds: u64,
}

impl CommandHookInvoker {
    #[must_use]
    pub fn new(timeout_seconds: u64) -> Self {
        Self { timeout_seconds }
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    async fn run_optional(&self, command: Option<&str>, what: &str) -> Result<(), HookError> {
        match command {
            Some(command) => run_hook_command(command, self.timeout_seconds).await,
            None => {
                debug!("No {} hook configured", what);
                Ok(())
            }
        }
    }
}

impl Default for CommandHookInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl HookInvoker for CommandHookInvoker {
    async fn on_notification_start(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        debug!(%category, "Notification start");
        let command = hooks.and_then(|hooks| hooks.notification.start_command());
        self.run_optional(command, "notification start").await
    }

    async fn on_notification_end(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        debug!(%category, "Notification end");
        let command = hooks.and_then(|hooks| hooks.notification.end_command());
        self.run_optional(command, "notification end").await
    }

    async fn on_break_start(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        debug!(%category, "Break start");
        let command = hooks
            .and_then(|hooks| hooks.countdown.as_ref())
            .and_then(HookSet::start_command);
        self.run_optional(command, "break start").await
    }

    async fn on_break_end(
        &self,
        category: BreakCategory,
        hooks: Option<&BreakHooks>,
    ) -> Result<(), HookError> {
        debug!(%category, "Break end");
        let command = hooks
            .and_then(|hooks| hooks.countdown.as_ref())
            .and_then(HookSet::end_command);
        self.run_optional(command, "break end").await
    }

    async fn on_outside_active_hours(
        &self,
        boundary: ActiveHoursBoundary,
        command: Option<&str>,
    ) -> Result<(), HookError> {
        debug!(boundary = boundary.as_str(), "Outside active hours");
        self.run_optional(command, "active hours").await
    }
}
