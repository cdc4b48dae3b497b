//! Skip reporting.

use tollgate_core::{JobSpec, PullRequestRef, StatusReport, StatusService};
use tracing::{debug, info, warn};

use crate::{AggregateError, ReportError};

/// Publish a "Skipped." status for every job in `to_skip`.
///
/// Statuses are published one at a time in input order so the status
/// stream on the commit matches the skip list. Jobs with `skip_report` set
/// are passed over, and nothing at all is published when `elide_all` is
/// set. A failed publish does not stop the remaining jobs.
pub async fn report_skipped(
    status: &dyn StatusService,
    pr: &PullRequestRef,
    to_skip: &[JobSpec],
    elide_all: bool,
) -> Result<(), AggregateError<ReportError>> {
    if elide_all {
        debug!(
            repo = %pr.full_name(),
            skipped = to_skip.len(),
            "Eliding all skipped statuses"
        );
        return Ok(());
    }

    let mut errors = Vec::new();

    for job in to_skip {
        if job.skip_report {
            debug!(job = %job.name, context = %job.context, "Job does not report, not publishing skip status");
            continue;
        }

        let report = StatusReport::skipped(&job.context);
        match status.set_status(pr, &pr.head_sha, &report).await {
            Ok(()) => {
                info!(
                    job = %job.name,
                    context = %job.context,
                    sha = %pr.short_sha(),
                    "Reported job as skipped"
                );
            }
            Err(e) => {
                warn!(
                    job = %job.name,
                    context = %job.context,
                    sha = %pr.short_sha(),
                    error = %e,
                    "Failed to report job as skipped"
                );
                errors.push(ReportError {
                    job: job.name.clone(),
                    context: job.context.clone(),
                    source: e,
                });
            }
        }
    }

    match AggregateError::from_vec(errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
