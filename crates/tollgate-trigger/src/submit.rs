//! Job submission.

use futures::future::join_all;
use std::sync::Arc;
use tollgate_core::{EventId, ExecutionRequest, JobBackend, JobHandle, JobSpec, PullRequestRef};
use tracing::{error, info};

use crate::{AggregateError, SubmissionError};

/// Submit one execution request per job in `to_run`.
///
/// Every submission runs as its own task so a slow backend call does not
/// hold up unrelated jobs, and a failed one does not cancel the others.
/// Results are collected once all tasks have finished. On success the
/// handles of the created jobs are returned in input order.
pub async fn submit_all(
    backend: &Arc<dyn JobBackend>,
    pr: &PullRequestRef,
    to_run: &[JobSpec],
    event_id: &EventId,
) -> Result<Vec<JobHandle>, AggregateError<SubmissionError>> {
    let (jobs, tasks): (Vec<_>, Vec<_>) = to_run
        .iter()
        .map(|spec| {
            let request = ExecutionRequest::presubmit(spec, pr, event_id);
            let backend = Arc::clone(backend);
            let task = tokio::spawn(async move { backend.create(request).await });
            (spec.name.clone(), task)
        })
        .unzip();

    let results = join_all(tasks).await;

    let mut handles = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for (job, result) in jobs.into_iter().zip(results) {
        match result {
            Ok(Ok(handle)) => {
                info!(
                    job = %job,
                    backend = backend.name(),
                    backend_id = %handle.backend_id,
                    event_id = %event_id,
                    "Created job"
                );
                handles.push(handle);
            }
            Ok(Err(e)) => {
                error!(job = %job, event_id = %event_id, error = %e, "Failed to create job");
                errors.push(SubmissionError::Create { job, source: e });
            }
            Err(e) => {
                error!(job = %job, event_id = %event_id, error = %e, "Job submission task failed");
                errors.push(SubmissionError::Task {
                    job,
                    message: e.to_string(),
                });
            }
        }
    }

    match AggregateError::from_vec(errors) {
        Some(err) => Err(err),
        None => Ok(handles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tollgate_core::fakes::FakeJobBackend;

    fn make_pr() -> PullRequestRef {
        PullRequestRef::new("org", "repo", "branch", "foobar1")
    }

    fn names(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn requested() -> Vec<JobSpec> {
        vec![
            JobSpec::new("first", "first-context"),
            JobSpec::new("second", "second-context"),
        ]
    }

    #[tokio::test]
    async fn test_nothing_requested_means_nothing_done() {
        let fake = Arc::new(FakeJobBackend::new());
        let backend: Arc<dyn JobBackend> = fake.clone();

        let handles = submit_all(&backend, &make_pr(), &[], &EventId::from("event-guid"))
            .await
            .unwrap();

        assert!(handles.is_empty());
        assert_eq!(fake.created_count(), 0);
    }

    #[tokio::test]
    async fn test_all_requested_jobs_get_run() {
        let fake = Arc::new(FakeJobBackend::new());
        let backend: Arc<dyn JobBackend> = fake.clone();

        let handles = submit_all(&backend, &make_pr(), &requested(), &EventId::from("event-guid"))
            .await
            .unwrap();

        let handle_jobs: Vec<_> = handles.iter().map(|h| h.job.as_str()).collect();
        assert_eq!(handle_jobs, vec!["first", "second"]);
        assert_eq!(fake.created_jobs(), names(&["first", "second"]));
    }

    #[tokio::test]
    async fn test_failure_bubbles_up_but_does_not_stop_others() {
        let fake = Arc::new(FakeJobBackend::failing_on(["first"]));
        let backend: Arc<dyn JobBackend> = fake.clone();

        let err = submit_all(&backend, &make_pr(), &requested(), &EventId::from("event-guid"))
            .await
            .unwrap_err();

        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].job(), "first");
        assert!(matches!(err.errors()[0], SubmissionError::Create { .. }));
        assert_eq!(fake.created_jobs(), names(&["second"]));
    }

    #[tokio::test]
    async fn test_requests_carry_event_id_and_refs() {
        let fake = Arc::new(FakeJobBackend::new());
        let backend: Arc<dyn JobBackend> = fake.clone();

        submit_all(&backend, &make_pr(), &requested(), &EventId::from("event-guid"))
            .await
            .unwrap();

        for request in fake.requests() {
            assert_eq!(request.event_id.as_str(), "event-guid");
            assert_eq!(request.refs, make_pr());
            assert_eq!(request.context, format!("{}-context", request.job));
        }
    }

    /// Backend whose calls only complete once `n` of them are in flight.
    struct RendezvousBackend {
        barrier: Barrier,
    }

    #[async_trait]
    impl JobBackend for RendezvousBackend {
        fn name(&self) -> &'static str {
            "rendezvous"
        }

        async fn create(&self, request: ExecutionRequest) -> tollgate_core::Result<JobHandle> {
            self.barrier.wait().await;
            Ok(JobHandle {
                id: request.id,
                job: request.job,
                backend_id: "rendezvous".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_submissions_run_concurrently() {
        let jobs: Vec<_> = (0..8)
            .map(|i| JobSpec::new(format!("job-{}", i), format!("context-{}", i)))
            .collect();
        let backend: Arc<dyn JobBackend> = Arc::new(RendezvousBackend {
            barrier: Barrier::new(jobs.len()),
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            submit_all(&backend, &make_pr(), &jobs, &EventId::from("event-guid")),
        )
        .await
        .expect("submissions were serialized");

        assert_eq!(result.unwrap().len(), 8);
    }

    struct PanickingBackend;

    #[async_trait]
    impl JobBackend for PanickingBackend {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn create(&self, request: ExecutionRequest) -> tollgate_core::Result<JobHandle> {
            if request.job == "first" {
                panic!("backend bug");
            }
            Ok(JobHandle {
                id: request.id,
                job: request.job,
                backend_id: "ok".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_panicking_submission_is_reported_as_task_error() {
        let backend: Arc<dyn JobBackend> = Arc::new(PanickingBackend);

        let err = submit_all(&backend, &make_pr(), &requested(), &EventId::from("event-guid"))
            .await
            .unwrap_err();

        assert_eq!(err.len(), 1);
        assert!(matches!(
            &err.errors()[0],
            SubmissionError::Task { job, .. } if job == "first"
        ));
    }
}
