//! Dispatch command: run and skip presubmits for one pull request.

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tollgate_config::load_trigger_config;
use tollgate_core::{EventId, PullRequestRef, StatusService};
use tollgate_github::{GitHubConfig, GitHubStatusClient};
use tollgate_trigger::Dispatcher;
use tracing::info;

use crate::DispatchArgs;
use crate::backends::{JsonLinesBackend, LogStatusService};

pub async fn dispatch(args: DispatchArgs) -> Result<()> {
    let (org, repo) = split_repo(&args.repo)?;

    let config = load_trigger_config(&args.config)
        .with_context(|| format!("Failed to load config file: {}", args.config))?;

    let to_run = config
        .select(org, repo, args.run.as_slice())
        .context("Failed to resolve presubmits to run")?;
    let to_skip = config
        .select(org, repo, args.skip.as_slice())
        .context("Failed to resolve presubmits to skip")?;

    let mut pr = PullRequestRef::new(org, repo, &args.base, &args.head);
    if let Some(number) = args.pull {
        pr = pr.with_number(number);
    }
    if let Some(author) = &args.author {
        pr = pr.with_author(author);
    }

    let status: Arc<dyn StatusService> = if args.dry_run {
        Arc::new(LogStatusService)
    } else {
        let github = GitHubConfig::from_env().context("Failed to configure GitHub client")?;
        Arc::new(GitHubStatusClient::new(github)?)
    };
    let backend = Arc::new(JsonLinesBackend::new(std::io::stdout()));
    let dispatcher = Dispatcher::new(backend, status);

    let event_id = EventId::new(args.event_id);
    let elide = args.elide_skipped || config.elide_skipped_contexts(org, repo);

    if to_skip.is_empty() {
        dispatcher.run_requested(&pr, &to_run, &event_id).await?;
    } else {
        dispatcher
            .run_and_skip(&pr, &to_run, &to_skip, &event_id, elide)
            .await?;
    }

    info!(
        repo = %pr.full_name(),
        run = to_run.len(),
        skip = to_skip.len(),
        "Dispatch complete"
    );
    Ok(())
}

fn split_repo(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('/') {
        Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((org, repo))
        }
        _ => bail!("Expected --repo as org/repo, got '{}'", full_name),
    }
}
