//! Presubmit job definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A presubmit job configured to run against pull requests.
///
/// Only `name`, `context` and `skip_report` matter to dispatch; the
/// remaining fields are carried through to the job backend untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Unique name of the job within a repository.
    pub name: String,
    /// Status context the job reports under.
    pub context: String,
    /// Suppress every status for this job, including "Skipped.".
    pub skip_report: bool,
    /// Container image to run.
    pub image: String,
    /// Commands to execute.
    pub commands: Vec<String>,
    /// Environment variables.
    pub env: HashMap<String, String>,
    /// Labels copied onto every execution request.
    pub labels: HashMap<String, String>,
    /// Run on every pull request without being requested.
    pub always_run: bool,
    /// Regex matched against comments to request the job.
    pub trigger: String,
    /// Comment that re-runs the job.
    pub rerun_command: String,
    /// Maximum number of concurrent executions (0 means unlimited).
    pub max_concurrency: u32,
}

impl JobSpec {
    /// Create a job with the given name and context and default
    /// execution parameters.
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            context: context.into(),
            skip_report: false,
            image: String::new(),
            commands: Vec::new(),
            env: HashMap::new(),
            labels: HashMap::new(),
            always_run: false,
            trigger: default_trigger(&name),
            rerun_command: default_rerun_command(&name),
            max_concurrency: 0,
            name,
        }
    }

    pub fn with_skip_report(mut self, skip_report: bool) -> Self {
        self.skip_report = skip_report;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Trigger regex used when a job does not configure one: `/test <name>`
/// or `/test all` anywhere on its own line.
pub fn default_trigger(name: &str) -> String {
    format!(r"(?m)^/test( all| {}),?(\s+|$)", regex::escape(name))
}

/// Rerun command used when a job does not configure one.
pub fn default_rerun_command(name: &str) -> String {
    format!("/test {}", name)
}
