//! Execution requests and the job backend trait.
//!
//! A job backend accepts execution requests and starts jobs (pods,
//! containers, queue entries, ...). Dispatch never reads a request back
//! once it has been handed over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{EventId, JobSpec, PullRequestRef, ResourceId, Result};

/// Label carrying the correlation token of the triggering event.
pub const EVENT_ID_LABEL: &str = "tollgate.io/event-id";
/// Label carrying the job name.
pub const JOB_LABEL: &str = "tollgate.io/job";
/// Label carrying the job kind.
pub const KIND_LABEL: &str = "tollgate.io/type";
pub const ORG_LABEL: &str = "tollgate.io/org";
pub const REPO_LABEL: &str = "tollgate.io/repo";
pub const PULL_LABEL: &str = "tollgate.io/pull";

/// Kind of job an execution request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Presubmit,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Presubmit => write!(f, "presubmit"),
        }
    }
}

/// A request to start one job for one pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub id: ResourceId,
    /// Name of the job being started.
    pub job: String,
    pub kind: JobKind,
    /// Status context the job will report under.
    pub context: String,
    /// Pull request the job runs against.
    pub refs: PullRequestRef,
    /// Webhook delivery that caused this request.
    pub event_id: EventId,
    pub rerun_command: String,
    pub labels: HashMap<String, String>,
    /// Full job definition, for the backend's use.
    pub spec: JobSpec,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRequest {
    /// Build the presubmit request for `spec` against `pr`.
    ///
    /// Job labels are copied first so the reserved `tollgate.io/*` labels
    /// always win.
    pub fn presubmit(spec: &JobSpec, pr: &PullRequestRef, event_id: &EventId) -> Self {
        let mut labels = spec.labels.clone();
        labels.insert(EVENT_ID_LABEL.to_string(), event_id.to_string());
        labels.insert(JOB_LABEL.to_string(), spec.name.clone());
        labels.insert(KIND_LABEL.to_string(), JobKind::Presubmit.to_string());
        labels.insert(ORG_LABEL.to_string(), pr.org.clone());
        labels.insert(REPO_LABEL.to_string(), pr.repo.clone());
        if let Some(number) = pr.number {
            labels.insert(PULL_LABEL.to_string(), number.to_string());
        }

        Self {
            id: ResourceId::new(),
            job: spec.name.clone(),
            kind: JobKind::Presubmit,
            context: spec.context.clone(),
            refs: pr.clone(),
            event_id: event_id.clone(),
            rerun_command: spec.rerun_command.clone(),
            labels,
            spec: spec.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Handle to a job the backend accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    /// Id of the execution request that created the job.
    pub id: ResourceId,
    /// Job name.
    pub job: String,
    /// Backend-specific identifier (e.g., pod name, queue entry).
    pub backend_id: String,
}

/// Trait for job-execution backends.
///
/// Implementations must accept concurrent `create` calls for independent
/// requests.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &'static str;

    /// Hand a request to the backend. Success means the request was
    /// accepted, not that the job finished.
    async fn create(&self, request: ExecutionRequest) -> Result<JobHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pr() -> PullRequestRef {
        PullRequestRef::new("org", "repo", "branch", "foobar1").with_number(42)
    }

    #[test]
    fn test_presubmit_request_copies_job_and_refs() {
        let spec = JobSpec::new("first", "first-context");
        let request = ExecutionRequest::presubmit(&spec, &make_pr(), &EventId::from("event-guid"));

        assert_eq!(request.job, "first");
        assert_eq!(request.kind, JobKind::Presubmit);
        assert_eq!(request.context, "first-context");
        assert_eq!(request.refs.head_sha, "foobar1");
        assert_eq!(request.event_id.as_str(), "event-guid");
        assert_eq!(request.rerun_command, "/test first");
    }

    #[test]
    fn test_presubmit_request_labels() {
        let spec = JobSpec::new("first", "first-context")
            .with_label("team", "infra")
            .with_label(JOB_LABEL, "spoofed");
        let request = ExecutionRequest::presubmit(&spec, &make_pr(), &EventId::from("event-guid"));

        assert_eq!(request.labels.get("team").map(String::as_str), Some("infra"));
        assert_eq!(request.labels.get(JOB_LABEL).map(String::as_str), Some("first"));
        assert_eq!(
            request.labels.get(EVENT_ID_LABEL).map(String::as_str),
            Some("event-guid")
        );
        assert_eq!(request.labels.get(KIND_LABEL).map(String::as_str), Some("presubmit"));
        assert_eq!(request.labels.get(PULL_LABEL).map(String::as_str), Some("42"));
    }

    #[test]
    fn test_pull_label_absent_without_number() {
        let pr = PullRequestRef::new("org", "repo", "branch", "foobar1");
        let request =
            ExecutionRequest::presubmit(&JobSpec::new("first", "c"), &pr, &EventId::from("e"));
        assert!(!request.labels.contains_key(PULL_LABEL));
    }

    #[test]
    fn test_each_request_gets_fresh_id() {
        let spec = JobSpec::new("first", "first-context");
        let event = EventId::from("event-guid");
        let a = ExecutionRequest::presubmit(&spec, &make_pr(), &event);
        let b = ExecutionRequest::presubmit(&spec, &make_pr(), &event);
        assert_ne!(a.id, b.id);
    }
}
