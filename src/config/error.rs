//! Configuration store errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ConfigError;

/// Errors that can occur while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No per-user configuration directory on this platform.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but describes an impossible break configuration.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl StoreError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoConfigDir => "pass an explicit path with --config",
            Self::Io { .. } => "check that the file and its directory are readable and writable",
            Self::Json { .. } | Self::Invalid(_) => {
                "fix the file by hand, or delete it and run `restbreak config init`"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakCategory;

    #[test]
    fn test_invalid_is_transparent() {
        let err = StoreError::from(ConfigError::MissingBreakDuration(BreakCategory::SmallBreak));
        assert_eq!(err.to_string(), "small break requires a break duration");
        assert!(err.suggestion().contains("config init"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/restbreak/config.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/restbreak/config.json"));
        assert!(err.to_string().contains("denied"));
    }
}
