//! Presubmit dispatch for Tollgate.
//!
//! Given a pull request and the presubmits an event decided to run and to
//! skip, starts the run set on a job backend and publishes "Skipped."
//! statuses for the skip set:
//!
//! - [`validate_context_overlap`] rejects run and skip sets that share a
//!   status context, before anything happens
//! - [`report_skipped`] publishes skip statuses sequentially, in order
//! - [`submit_all`] submits one execution request per job, concurrently
//! - [`Dispatcher`] wires them together and merges failures

pub mod dispatcher;
pub mod error;
pub mod skip;
pub mod submit;
pub mod validate;

pub use dispatcher::Dispatcher;
pub use error::{
    AggregateError, DispatchError, DispatchFailures, OverlapError, ReportError, SubmissionError,
};
pub use skip::report_skipped;
pub use submit::submit_all;
pub use validate::validate_context_overlap;
