//! Presubmit configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tollgate_core::JobSpec;
use tollgate_core::job::{default_rerun_command, default_trigger};
use tracing::debug;

/// Presubmits configured for one repository.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    pub org: String,
    pub repo: String,
    /// Overrides the global `elide-skipped-contexts` setting when present.
    pub elide_skipped_contexts: Option<bool>,
    /// Presubmits in configuration order.
    pub presubmits: Vec<JobSpec>,
}

impl RepoConfig {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}

/// Trigger configuration: global settings plus per-repository presubmits.
#[derive(Debug, Clone, Default)]
pub struct TriggerConfig {
    /// Publish no "Skipped." statuses at all.
    pub elide_skipped_contexts: bool,
    repos: Vec<RepoConfig>,
}

impl TriggerConfig {
    /// All configured repositories, in configuration order.
    pub fn repos(&self) -> &[RepoConfig] {
        &self.repos
    }

    pub fn repo(&self, org: &str, repo: &str) -> Option<&RepoConfig> {
        self.repos.iter().find(|r| r.org == org && r.repo == repo)
    }

    /// Presubmits configured for `org/repo`, in configuration order.
    pub fn presubmits(&self, org: &str, repo: &str) -> &[JobSpec] {
        self.repo(org, repo)
            .map(|r| r.presubmits.as_slice())
            .unwrap_or(&[])
    }

    /// Whether skipped statuses are elided for `org/repo`.
    pub fn elide_skipped_contexts(&self, org: &str, repo: &str) -> bool {
        self.repo(org, repo)
            .and_then(|r| r.elide_skipped_contexts)
            .unwrap_or(self.elide_skipped_contexts)
    }

    /// Resolve the named presubmits of `org/repo`, in the order given.
    pub fn select<S: AsRef<str>>(
        &self,
        org: &str,
        repo: &str,
        names: &[S],
    ) -> ConfigResult<Vec<JobSpec>> {
        let presubmits = self.presubmits(org, repo);
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                presubmits
                    .iter()
                    .find(|p| p.name == name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownJob {
                        repo: format!("{}/{}", org, repo),
                        job: name.to_string(),
                    })
            })
            .collect()
    }
}

/// Read and parse a trigger configuration file.
pub fn load_trigger_config(path: impl AsRef<Path>) -> ConfigResult<TriggerConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading trigger configuration");
    let text = std::fs::read_to_string(path)?;
    parse_trigger_config(&text)
}

/// Parse a trigger configuration from KDL text.
pub fn parse_trigger_config(kdl: &str) -> ConfigResult<TriggerConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut config = TriggerConfig::default();
    let mut seen_repos = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "trigger" => {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        if child.name().value() == "elide-skipped-contexts" {
                            config.elide_skipped_contexts =
                                get_first_bool_arg(child).unwrap_or(false);
                        }
                    }
                }
            }
            "repo" => {
                let repo = parse_repo(node)?;
                if !seen_repos.insert(repo.full_name()) {
                    return Err(ConfigError::Duplicate(format!(
                        "repo '{}'",
                        repo.full_name()
                    )));
                }
                config.repos.push(repo);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn parse_repo(node: &KdlNode) -> ConfigResult<RepoConfig> {
    let full_name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("repo name".to_string()))?;

    let (org, repo) = match full_name.split_once('/') {
        Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            (org.to_string(), repo.to_string())
        }
        _ => {
            return Err(ConfigError::InvalidValue {
                field: "repo name".to_string(),
                message: format!("expected org/repo, got '{}'", full_name),
            });
        }
    };

    let mut presubmits: Vec<JobSpec> = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "presubmit" {
                presubmits.push(parse_presubmit(child)?);
            }
        }
    }

    // Job names and report contexts must both be unique per repository
    let mut names = HashSet::new();
    let mut contexts = HashSet::new();
    for presubmit in &presubmits {
        if !names.insert(presubmit.name.as_str()) {
            return Err(ConfigError::Duplicate(format!(
                "presubmit '{}' in {}",
                presubmit.name, full_name
            )));
        }
        if !contexts.insert(presubmit.context.as_str()) {
            return Err(ConfigError::Duplicate(format!(
                "context '{}' in {}",
                presubmit.context, full_name
            )));
        }
    }

    Ok(RepoConfig {
        org,
        repo,
        elide_skipped_contexts: get_bool_prop(node, "elide-skipped-contexts"),
        presubmits,
    })
}

fn parse_presubmit(node: &KdlNode) -> ConfigResult<JobSpec> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("presubmit name".to_string()))?;

    let context = get_string_prop(node, "context").unwrap_or_else(|| name.clone());
    let skip_report = get_bool_prop(node, "skip-report").unwrap_or(false);
    let always_run = get_bool_prop(node, "always-run").unwrap_or(false);
    let max_concurrency = match node.get("max-concurrency").and_then(|v| v.as_integer()) {
        Some(n) => u32::try_from(n).map_err(|_| ConfigError::InvalidValue {
            field: format!("max-concurrency for presubmit '{}'", name),
            message: format!("{} is out of range", n),
        })?,
        None => 0,
    };

    let mut image = String::new();
    let mut commands = Vec::new();
    let mut env = HashMap::new();
    let mut labels = HashMap::new();
    let mut trigger = None;
    let mut rerun_command = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "image" => {
                    image = get_first_string_arg(child).unwrap_or_default();
                }
                "run" => {
                    if let Some(cmd) = get_first_string_arg(child) {
                        commands.push(cmd);
                    }
                }
                "env" => env = get_string_map(child),
                "labels" => labels = get_string_map(child),
                "trigger" => trigger = get_first_string_arg(child),
                "rerun-command" => rerun_command = get_first_string_arg(child),
                _ => {}
            }
        }
    }

    if image.is_empty() {
        return Err(ConfigError::MissingField(format!(
            "image for presubmit '{}'",
            name
        )));
    }

    let trigger = trigger.unwrap_or_else(|| default_trigger(&name));
    if let Err(e) = Regex::new(&trigger) {
        return Err(ConfigError::InvalidValue {
            field: format!("trigger for presubmit '{}'", name),
            message: e.to_string(),
        });
    }

    Ok(JobSpec {
        rerun_command: rerun_command.unwrap_or_else(|| default_rerun_command(&name)),
        name,
        context,
        skip_report,
        image,
        commands,
        env,
        labels,
        always_run,
        trigger,
        max_concurrency,
    })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_bool_prop(node: &KdlNode, name: &str) -> Option<bool> {
    node.get(name).and_then(|v| v.as_bool())
}

/// Collect `key "value"` children of a block node.
fn get_string_map(node: &KdlNode) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if let Some(val) = get_first_string_arg(child) {
                map.insert(child.name().value().to_string(), val);
            }
        }
    }
    map
}
