//! Collaborators used by the CLI.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;
use tollgate_core::{
    Error, ExecutionRequest, JobBackend, JobHandle, PullRequestRef, Result, StatusReport,
    StatusService,
};
use tracing::info;

/// Job backend that hands each execution request downstream as one JSON
/// line on the wrapped writer.
pub struct JsonLinesBackend<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesBackend<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

#[async_trait]
impl<W: Write + Send> JobBackend for JsonLinesBackend<W> {
    fn name(&self) -> &'static str {
        "json-lines"
    }

    async fn create(&self, request: ExecutionRequest) -> Result<JobHandle> {
        let line =
            serde_json::to_string(&request).map_err(|e| Error::Backend(e.to_string()))?;

        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::Internal("output writer poisoned".to_string()))?;
        writeln!(out, "{}", line).map_err(|e| Error::Backend(e.to_string()))?;
        out.flush().map_err(|e| Error::Backend(e.to_string()))?;

        Ok(JobHandle {
            id: request.id,
            job: request.job,
            backend_id: request.id.to_string(),
        })
    }
}

/// Status service that only logs what it would publish.
pub struct LogStatusService;

#[async_trait]
impl StatusService for LogStatusService {
    async fn set_status(
        &self,
        pr: &PullRequestRef,
        commit: &str,
        report: &StatusReport,
    ) -> Result<()> {
        info!(
            repo = %pr.full_name(),
            sha = %commit,
            context = %report.context,
            state = %report.state,
            description = %report.description,
            "Dry run: would publish status"
        );
        Ok(())
    }
}
