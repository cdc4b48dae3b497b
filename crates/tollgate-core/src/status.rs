//! Commit status reports and the status service trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{PullRequestRef, Result};

/// Description published for jobs that were deliberately not run.
pub const SKIPPED_DESCRIPTION: &str = "Skipped.";

/// State of a commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    Error,
}

impl StatusState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusState::Pending)
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusState::Pending => write!(f, "pending"),
            StatusState::Success => write!(f, "success"),
            StatusState::Failure => write!(f, "failure"),
            StatusState::Error => write!(f, "error"),
        }
    }
}

/// A status published under one context on one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub context: String,
    pub state: StatusState,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl StatusReport {
    /// Terminal status for a job that was bypassed.
    pub fn skipped(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            state: StatusState::Success,
            description: SKIPPED_DESCRIPTION.to_string(),
            target_url: None,
        }
    }
}

/// Trait for source-control status services.
///
/// Repeated calls for the same commit with different contexts are
/// independent of each other.
#[async_trait]
pub trait StatusService: Send + Sync {
    /// Publish `report` on `commit` in the repository `pr` points at.
    async fn set_status(
        &self,
        pr: &PullRequestRef,
        commit: &str,
        report: &StatusReport,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_report() {
        let report = StatusReport::skipped("first-context");
        assert_eq!(report.context, "first-context");
        assert_eq!(report.state, StatusState::Success);
        assert_eq!(report.description, "Skipped.");
        assert!(report.target_url.is_none());
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_value(StatusReport::skipped("ctx")).unwrap();
        assert_eq!(json["state"], "success");
        assert!(json.get("target_url").is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!StatusState::Pending.is_terminal());
        assert!(StatusState::Success.is_terminal());
        assert!(StatusState::Failure.is_terminal());
        assert!(StatusState::Error.is_terminal());
    }
}
