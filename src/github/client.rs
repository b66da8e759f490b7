use reqwest::{header, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::models::{ClientError, Commit, DispatchRequest};
use super::{Error, GitHubApi, Result};
use crate::RepoId;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

// -------------------------------------------------------------------------------------------------
// Client
// -------------------------------------------------------------------------------------------------
pub struct Client {
    pub(super) base_url: Url,
    pub(super) inner: reqwest::Client,
    pub(super) token: SecretString,
}

impl Client {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /repos/{owner}/{repo}/commits`, first page only, in server order.
    pub async fn get_commits(&self, repo: &RepoId) -> Result<Vec<Commit>> {
        let url = self.make_url(&["repos", repo.owner(), repo.name(), "commits"])?;
        debug!("GET {}", url);
        let response = self.authorized(self.inner.get(url)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /repos/{owner}/{repo}/actions/workflows/{workflow_id}/dispatches`.
    ///
    /// Returns the raw response body; GitHub normally answers with an empty 204.
    pub async fn create_workflow_dispatch(
        &self,
        repo: &RepoId,
        workflow_id: &str,
        git_ref: &str,
    ) -> Result<String> {
        let url = self.make_url(&[
            "repos",
            repo.owner(),
            repo.name(),
            "actions",
            "workflows",
            workflow_id,
            "dispatches",
        ])?;
        debug!("POST {} (ref = {})", url, git_ref);
        let response = self
            .authorized(self.inner.post(url))
            .json(&DispatchRequest { git_ref })
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

impl GitHubApi for Client {
    async fn list_commits(&self, repo: &RepoId) -> Result<Vec<Commit>> {
        self.get_commits(repo).await
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoId,
        workflow_id: &str,
        git_ref: &str,
    ) -> Result<String> {
        self.create_workflow_dispatch(repo, workflow_id, git_ref).await
    }
}

// private implementation
impl Client {
    /// Construct a `Url` by appending the given path parts to the base URL.
    fn make_url(&self, path_parts: &[&str]) -> Result<Url> {
        if let Some(p) = path_parts.iter().find(|p| p.contains('/')) {
            return Err(Error::UrlSlash(p.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlCannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path_parts);
        Ok(url)
    }

    fn authorized(&self, request_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request_builder
            .header(header::ACCEPT, ACCEPT_V3)
            .header(
                header::AUTHORIZATION,
                format!("token {}", self.token.expose_secret()),
            )
    }
}

/// Turn a non-2xx response into `Error::Status`, keeping GitHub's error message when there is one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ClientError>(&body) {
        Ok(client_error) => client_error.message,
        Err(_) => body,
    };
    Err(Error::Status { status, message })
}
