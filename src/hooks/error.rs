//! Hook error types.
//!
//! Hook failures never reach the scheduler. The dispatcher logs them and
//! moves on to the next event.

use thiserror::Error;

/// Errors that can occur while running a break hook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The shell could not be started.
    #[error("failed to spawn hook command '{0}': {1}")]
    SpawnFailed(String, String),

    /// The command exited with a non-zero status.
    #[error("hook command '{command}' exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        /// Exit code, or a description when killed by a signal
        status: String,
        stderr: String,
    },

    /// The command did not finish in time.
    #[error("hook command '{0}' timed out after {1}s")]
    Timeout(String, u64),

    /// Generic hook error.
    #[error("hook error: {0}")]
    Other(String),
}

impl HookError {
    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_, _))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SpawnFailed(_, _) => "check that a shell is available on this system",
            Self::ExitStatus { .. } => "run the hook command by hand to see why it fails",
            Self::Timeout(_, _) => {
                "make the hook command return quickly or raise hook_timeout_seconds"
            }
            Self::Other(_) => "check the hook configuration and restart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_spawn_failed() {
        let err = HookError::SpawnFailed("notify-send".into(), "not found".into());
        assert!(err.to_string().contains("notify-send"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_error_display_exit_status() {
        let err = HookError::ExitStatus {
            command: "false".into(),
            status: "exit status: 1".into(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("'false'"));
        assert!(err.to_string().contains("exit status: 1"));
    }

    #[test]
    fn test_error_display_timeout() {
        let err = HookError::Timeout("sleep 60".into(), 5);
        assert!(err.to_string().contains("sleep 60"));
        assert!(err.to_string().contains("5s"));
        assert!(err.is_timeout());
        assert!(!HookError::Other("x".into()).is_timeout());
    }

    #[test]
    fn test_every_error_has_a_suggestion() {
        let errors = vec![
            HookError::SpawnFailed("a".into(), "b".into()),
            HookError::ExitStatus {
                command: "a".into(),
                status: "b".into(),
                stderr: "c".into(),
            },
            HookError::Timeout("a".into(), 1),
            HookError::Other("a".into()),
        ];

        for error in errors {
            assert!(!error.suggestion().is_empty());
        }
    }
}
