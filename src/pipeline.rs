//! Fetch → match → dispatch, once per invocation

use tracing::{debug, error, info, warn};

use crate::TriggerConfig;
use crate::error::{DispatchError, FetchError};
use crate::github::{Commit, GitHubApi};
use crate::matcher::{find_build_commit, short_tag};
use crate::run::Run;

/// Fetch the most recent commits of the configured source repository.
pub async fn fetch_commits<A: GitHubApi>(
    api: &A,
    config: &TriggerConfig,
) -> Result<Vec<Commit>, FetchError> {
    api.list_commits(&config.source_repo)
        .await
        .map_err(|source| FetchError {
            repo: config.source_repo.to_string(),
            source,
        })
}

/// Trigger the configured workflow on the configured branch of the target repository.
pub async fn trigger_workflow<A: GitHubApi>(
    api: &A,
    config: &TriggerConfig,
) -> Result<String, DispatchError> {
    api.dispatch_workflow(&config.target_repo, &config.workflow_id, &config.branch)
        .await
        .map_err(|source| DispatchError {
            repo: config.target_repo.to_string(),
            workflow: config.workflow_id.clone(),
            source,
        })
}

/// Run the whole sequence once.
///
/// Fetch and dispatch failures are logged and recorded on the returned `Run`;
/// they never escape as errors.
pub async fn run_once<A: GitHubApi>(api: &A, config: &TriggerConfig) -> Run {
    let mut run = Run::new();
    info!(
        run_id = %run.id,
        "Checking {} for commits containing {:?}", config.source_repo, config.marker
    );

    run.mark_fetching();
    let commits = match fetch_commits(api, config).await {
        Ok(commits) => {
            debug!("Fetched {} commits from {}", commits.len(), config.source_repo);
            commits
        }
        Err(e) => {
            error!("Error fetching commits: {}", e);
            run.mark_fetch_failed(e.to_string());
            info!("No matching build commit found.");
            return run;
        }
    };

    let Some(found) = find_build_commit(&commits, &config.marker) else {
        run.mark_no_match(commits.len());
        info!("No matching build commit found.");
        return run;
    };

    let tag = short_tag(&commits);
    info!(
        sha = %found.sha.as_deref().unwrap_or("unknown"),
        url = %found.html_url.as_deref().unwrap_or("unknown"),
        tag = %tag,
        "Build commit: {}",
        found.message().lines().next().unwrap_or_default()
    );
    run.mark_matched(commits.len(), found.sha.clone(), tag);

    if config.dry_run {
        warn!(
            "Dry run: would trigger {} on {}@{}",
            config.workflow_id, config.target_repo, config.branch
        );
        run.mark_dry_run();
        return run;
    }

    info!("Detected build commit, triggering the workflow...");
    run.mark_dispatching();
    match trigger_workflow(api, config).await {
        Ok(body) => {
            info!("Workflow triggered successfully: {:?}", body);
            run.mark_dispatched(body);
        }
        Err(e) => {
            error!("Error triggering workflow: {}", e);
            run.mark_dispatch_failed(e.to_string());
        }
    }
    run
}
