//! Dispatch errors.

use std::fmt;
use thiserror::Error;

/// The run set and skip set report to at least one common context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("run and skip sets overlap on contexts: {}", .contexts.join(", "))]
pub struct OverlapError {
    /// Colliding contexts, sorted.
    pub contexts: Vec<String>,
}

/// A run-set job that could not be started.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to create job {job}: {source}")]
    Create {
        job: String,
        #[source]
        source: tollgate_core::Error,
    },

    #[error("submission of job {job} did not complete: {message}")]
    Task { job: String, message: String },
}

impl SubmissionError {
    pub fn job(&self) -> &str {
        match self {
            SubmissionError::Create { job, .. } | SubmissionError::Task { job, .. } => job,
        }
    }
}

/// A skip-set job whose "Skipped." status could not be published.
#[derive(Debug, Error)]
#[error("failed to report job {job} as skipped under {context}: {source}")]
pub struct ReportError {
    pub job: String,
    pub context: String,
    #[source]
    pub source: tollgate_core::Error,
}

/// Independent per-item failures collected from one batch operation.
///
/// Never empty: batches with no failures return `Ok`.
#[derive(Debug)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    /// Wrap `errors`, or `None` when there are none.
    pub fn from_vec(errors: Vec<E>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_inner(self) -> Vec<E> {
        self.errors
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            write!(f, "1 error occurred: ")?;
        } else {
            write!(f, "{} errors occurred: ", self.errors.len())?;
        }
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl<E: std::error::Error> std::error::Error for AggregateError<E> {}

/// Failures left behind by a dispatch that got past validation.
///
/// Submission and report failures are kept apart so callers can tell a job
/// that did not start from a skip status that was not published. Jobs and
/// statuses not listed here took effect.
#[derive(Debug, Default)]
pub struct DispatchFailures {
    pub submissions: Vec<SubmissionError>,
    pub reports: Vec<ReportError>,
}

impl DispatchFailures {
    pub(crate) fn from_results<T>(
        submissions: Result<T, AggregateError<SubmissionError>>,
        reports: Result<(), AggregateError<ReportError>>,
    ) -> Option<Self> {
        let failures = Self {
            submissions: submissions.err().map(AggregateError::into_inner).unwrap_or_default(),
            reports: reports.err().map(AggregateError::into_inner).unwrap_or_default(),
        };
        if failures.submissions.is_empty() && failures.reports.is_empty() {
            None
        } else {
            Some(failures)
        }
    }

    /// Names of the jobs that failed to start.
    pub fn failed_submissions(&self) -> Vec<&str> {
        self.submissions.iter().map(SubmissionError::job).collect()
    }

    /// Names of the skipped jobs whose status was not published.
    pub fn failed_reports(&self) -> Vec<&str> {
        self.reports.iter().map(|e| e.job.as_str()).collect()
    }
}

impl fmt::Display for DispatchFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(err) = AggregateError::from_vec(self.submissions.iter().collect::<Vec<_>>()) {
            parts.push(format!("job submission: {}", err));
        }
        if let Some(err) = AggregateError::from_vec(self.reports.iter().collect::<Vec<_>>()) {
            parts.push(format!("skip reporting: {}", err));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for DispatchFailures {}

/// Error returned by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Validation failed; nothing was submitted or reported.
    #[error(transparent)]
    Overlap(#[from] OverlapError),

    /// At least one job failed to start or one skip status failed to
    /// publish. Everything else took effect and is not rolled back.
    #[error("dispatch partially failed: {0}")]
    Partial(DispatchFailures),
}

impl DispatchError {
    pub fn is_overlap(&self) -> bool {
        matches!(self, DispatchError::Overlap(_))
    }

    /// Names of every job that failed, in either category.
    pub fn failed_jobs(&self) -> Vec<&str> {
        match self {
            DispatchError::Overlap(_) => Vec::new(),
            DispatchError::Partial(failures) => {
                let mut jobs = failures.failed_submissions();
                jobs.extend(failures.failed_reports());
                jobs
            }
        }
    }
}
