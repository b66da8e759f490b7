use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Commit
// -------------------------------------------------------------------------------------------------
/// One item of `GET /repos/{owner}/{repo}/commits`.
///
/// Only the fields this crate reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Commit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    pub commit: CommitDetails,
}

impl Commit {
    pub fn message(&self) -> &str {
        &self.commit.message
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommitDetails {
    pub message: String,
}

// -------------------------------------------------------------------------------------------------
// DispatchRequest
// -------------------------------------------------------------------------------------------------
/// Body of `POST /repos/{owner}/{repo}/actions/workflows/{id}/dispatches`
#[derive(Debug, Serialize)]
pub struct DispatchRequest<'a> {
    #[serde(rename = "ref")]
    pub git_ref: &'a str,
}

// -------------------------------------------------------------------------------------------------
// ClientError
// -------------------------------------------------------------------------------------------------
/// Error body GitHub sends alongside 4xx/5xx responses
#[derive(Debug, Deserialize)]
pub struct ClientError {
    pub message: String,
    pub documentation_url: Option<String>,
}
