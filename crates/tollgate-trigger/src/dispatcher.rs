//! Run-and-skip dispatcher - starts requested presubmits and reports
//! skipped ones for a single pull request event.

use std::sync::Arc;
use tollgate_core::{EventId, JobBackend, JobSpec, PullRequestRef, StatusService};
use tracing::{info, warn};

use crate::{
    DispatchError, DispatchFailures, report_skipped, submit_all, validate_context_overlap,
};

/// Dispatches presubmits to a job backend and skip statuses to a status
/// service. Holds no per-event state; one dispatcher serves every event.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn JobBackend>,
    status: Arc<dyn StatusService>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn JobBackend>, status: Arc<dyn StatusService>) -> Self {
        Self { backend, status }
    }

    /// Start `to_run` and report `to_skip` as skipped.
    ///
    /// Fails without side effects when the two sets share a status
    /// context. Otherwise reporting and submission run concurrently and
    /// every failure from either is returned in one error; whatever
    /// succeeded stays in effect.
    pub async fn run_and_skip(
        &self,
        pr: &PullRequestRef,
        to_run: &[JobSpec],
        to_skip: &[JobSpec],
        event_id: &EventId,
        elide_skipped_contexts: bool,
    ) -> Result<(), DispatchError> {
        if let Err(e) = validate_context_overlap(to_run, to_skip) {
            warn!(
                repo = %pr.full_name(),
                event_id = %event_id,
                contexts = ?e.contexts,
                "Refusing to dispatch overlapping run and skip sets"
            );
            return Err(e.into());
        }

        info!(
            repo = %pr.full_name(),
            sha = %pr.short_sha(),
            event_id = %event_id,
            run = to_run.len(),
            skip = to_skip.len(),
            "Dispatching presubmits"
        );

        let (reports, submissions) = tokio::join!(
            report_skipped(
                self.status.as_ref(),
                pr,
                to_skip,
                elide_skipped_contexts
            ),
            submit_all(&self.backend, pr, to_run, event_id),
        );

        match DispatchFailures::from_results(submissions, reports) {
            Some(failures) => Err(DispatchError::Partial(failures)),
            None => Ok(()),
        }
    }

    /// Start `to_run` only. For flows with no skip set, such as a manual
    /// re-run, so there is nothing to validate or report.
    pub async fn run_requested(
        &self,
        pr: &PullRequestRef,
        to_run: &[JobSpec],
        event_id: &EventId,
    ) -> Result<(), DispatchError> {
        info!(
            repo = %pr.full_name(),
            sha = %pr.short_sha(),
            event_id = %event_id,
            run = to_run.len(),
            "Running requested presubmits"
        );

        let submissions = submit_all(&self.backend, pr, to_run, event_id).await;
        match DispatchFailures::from_results(submissions, Ok(())) {
            Some(failures) => Err(DispatchError::Partial(failures)),
            None => Ok(()),
        }
    }
}
