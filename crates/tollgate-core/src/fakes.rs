//! In-memory fakes for the collaborator traits (testing only)
//!
//! `FakeJobBackend` records every accepted execution request and
//! `FakeStatusService` records every published status per commit, in
//! publication order. Both can be told to fail for specific jobs or
//! contexts.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    Error, ExecutionRequest, JobBackend, JobHandle, PullRequestRef, Result, StatusReport,
    StatusService,
};

/// Job backend that keeps accepted requests in memory.
#[derive(Debug, Default)]
pub struct FakeJobBackend {
    failing_jobs: HashSet<String>,
    created: Mutex<Vec<ExecutionRequest>>,
}

impl FakeJobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject creation of the named jobs.
    pub fn failing_on<I, S>(jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing_jobs: jobs.into_iter().map(Into::into).collect(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every request accepted so far, in acceptance order.
    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.created.lock().unwrap().clone()
    }

    /// Names of the jobs accepted so far.
    pub fn created_jobs(&self) -> BTreeSet<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.job.clone())
            .collect()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl JobBackend for FakeJobBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create(&self, request: ExecutionRequest) -> Result<JobHandle> {
        if self.failing_jobs.contains(&request.job) {
            return Err(Error::Backend(format!(
                "failed to create job {}",
                request.job
            )));
        }

        let handle = JobHandle {
            id: request.id,
            job: request.job.clone(),
            backend_id: format!("fake-{}", request.id),
        };
        self.created.lock().unwrap().push(request);
        Ok(handle)
    }
}

/// Status service that keeps published statuses in memory, keyed by commit.
#[derive(Debug, Default)]
pub struct FakeStatusService {
    failing_contexts: HashSet<String>,
    statuses: Mutex<HashMap<String, Vec<StatusReport>>>,
}

impl FakeStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject publication of statuses under the named contexts.
    pub fn failing_on<I, S>(contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing_contexts: contexts.into_iter().map(Into::into).collect(),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// Statuses published on `commit`, in publication order.
    pub fn statuses_for(&self, commit: &str) -> Vec<StatusReport> {
        self.statuses
            .lock()
            .unwrap()
            .get(commit)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of statuses published across all commits.
    pub fn total(&self) -> usize {
        self.statuses.lock().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl StatusService for FakeStatusService {
    async fn set_status(
        &self,
        _pr: &PullRequestRef,
        commit: &str,
        report: &StatusReport,
    ) -> Result<()> {
        if self.failing_contexts.contains(&report.context) {
            return Err(Error::Status(format!(
                "failed to set status {}",
                report.context
            )));
        }

        self.statuses
            .lock()
            .unwrap()
            .entry(commit.to_string())
            .or_default()
            .push(report.clone());
        Ok(())
    }
}
