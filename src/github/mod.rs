//! Minimal GitHub REST client covering the two calls a run makes

use std::future::Future;

mod client;
mod client_builder;
mod error;
mod models;

pub use client::Client;
pub use client_builder::ClientBuilder;
pub use error::{Error, Result};
pub use models::{ClientError, Commit, CommitDetails, DispatchRequest};

use crate::RepoId;

/// The GitHub operations a run depends on.
///
/// `Client` is the real implementation; tests substitute in-memory fakes.
pub trait GitHubApi {
    /// List the most recent commits of `repo`, as ordered by the server.
    fn list_commits(&self, repo: &RepoId) -> impl Future<Output = Result<Vec<Commit>>> + Send;

    /// Trigger `workflow_id` on `git_ref` of `repo`, returning the response body.
    fn dispatch_workflow(
        &self,
        repo: &RepoId,
        workflow_id: &str,
        git_ref: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}
