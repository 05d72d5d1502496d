//! Errors produced while running a single check

use crate::clients::{AccessMode, ProviderError};
use std::time::Duration;
use thiserror::Error;

/// Why a check could not produce a conclusive score.
///
/// Every variant ends up as a `-1` result for the affected check only;
/// none of them aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("malformed evidence: {0}")]
    Malformed(String),

    #[error("unhandled case: {0}")]
    UnhandledCase(String),

    #[error("unknown check '{0}'")]
    UnknownCheck(String),

    #[error("check does not support {actual} repositories (supports: {supported})")]
    UnsupportedMode { actual: AccessMode, supported: String },

    #[error("check timed out after {0:?}")]
    Timeout(Duration),

    #[error("run cancelled before the check finished")]
    Cancelled,

    #[error("check panicked: {0}")]
    Panic(String),

    #[error("dependency cycle between checks: {0}")]
    DependencyCycle(String),
}

impl CheckError {
    /// True for a provider `NotFound`, which collectors usually treat as absence
    pub fn is_not_found(&self) -> bool {
        matches!(self, CheckError::Provider(ProviderError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_convert() {
        let err: CheckError = ProviderError::NotFound("SECURITY.md".to_string()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: SECURITY.md");
    }

    #[test]
    fn test_unsupported_mode_message() {
        let err = CheckError::UnsupportedMode {
            actual: AccessMode::FileBased,
            supported: "commit-based".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "check does not support file-based repositories (supports: commit-based)"
        );
    }
}
