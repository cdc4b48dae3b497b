//! Core domain types and traits for Tollgate presubmit dispatch.
//!
//! This crate contains:
//! - Resource and event identifiers
//! - Presubmit job definitions
//! - Pull request references
//! - Execution requests and the job backend trait
//! - Status reports and the status service trait
//! - In-memory fakes of both collaborators (`test-support` feature)

pub mod error;
pub mod execution;
#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
pub mod id;
pub mod job;
pub mod pull_request;
pub mod status;

pub use error::{Error, Result};
pub use execution::{ExecutionRequest, JobBackend, JobHandle, JobKind};
pub use id::{EventId, ResourceId};
pub use job::JobSpec;
pub use pull_request::PullRequestRef;
pub use status::{StatusReport, StatusService, StatusState};
