pub mod error;
pub mod github;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod run;

#[cfg(test)]
mod test_support;

use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use error::{ConfigError, NameError};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SOURCE_REPO: &str = "aayush2622/Dartotsu";
pub const DEFAULT_TARGET_REPO: &str = "grayankit/Dartotsu-Downloader";
pub const DEFAULT_WORKFLOW_ID: &str = "main.yml";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MARKER: &str = "[build.";

/// A GitHub repository identifier in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn parse(value: &str) -> Result<Self, NameError> {
        let (owner, name) = value
            .split_once('/')
            .ok_or_else(|| NameError::NotOwnerName(value.to_string()))?;
        if owner.is_empty() || name.is_empty() {
            return Err(NameError::EmptyPart(value.to_string()));
        }
        if name.contains('/') {
            return Err(NameError::NotOwnerName(value.to_string()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(NameError::Whitespace(value.to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Checks the subset of git's ref-name rules that matter for a dispatch target.
pub fn validate_ref_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::EmptyRef);
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(NameError::Whitespace(name.to_string()));
    }
    if name.contains("..") {
        return Err(NameError::DoubleDot(name.to_string()));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(NameError::EdgeSlash(name.to_string()));
    }
    Ok(())
}

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub token: SecretString,
    pub source_repo: RepoId,
    pub target_repo: RepoId,
    pub workflow_id: String,
    pub branch: String,
    pub marker: String,
    pub api_url: String,
    pub timeout: Option<Duration>,
    pub dry_run: bool,
    pub log_dir: Option<PathBuf>,
}

impl TriggerConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;

        let source_repo = RepoId::parse(
            &get("SOURCE_REPO").unwrap_or_else(|| DEFAULT_SOURCE_REPO.to_string()),
        )
        .map_err(|source| ConfigError::InvalidName {
            var: "SOURCE_REPO",
            source,
        })?;
        let target_repo = RepoId::parse(
            &get("TARGET_REPO").unwrap_or_else(|| DEFAULT_TARGET_REPO.to_string()),
        )
        .map_err(|source| ConfigError::InvalidName {
            var: "TARGET_REPO",
            source,
        })?;

        let workflow_id = get("WORKFLOW_ID").unwrap_or_else(|| DEFAULT_WORKFLOW_ID.to_string());
        if workflow_id.contains('/') {
            return Err(ConfigError::Invalid {
                var: "WORKFLOW_ID",
                reason: format!("'{}' must be a workflow file name or id", workflow_id),
            });
        }

        let branch = get("TARGET_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        validate_ref_name(&branch).map_err(|source| ConfigError::InvalidName {
            var: "TARGET_BRANCH",
            source,
        })?;

        // The marker is matched literally, so surrounding whitespace is kept.
        let marker = lookup("BUILD_MARKER")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MARKER.to_string());

        let api_url = get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url::Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
            var: "GITHUB_API_URL",
            reason: e.to_string(),
        })?;

        let timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "HTTP_TIMEOUT_SECS",
                    reason: format!("'{}' is not a whole number of seconds", raw),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let dry_run = match get("DRY_RUN") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "DRY_RUN",
                reason: format!("'{}' is not a boolean", raw),
            })?,
            None => false,
        };

        Ok(Self {
            token: SecretString::new(token),
            source_repo,
            target_repo,
            workflow_id,
            branch,
            marker,
            api_url,
            timeout,
            dry_run,
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
