use crate::github;

/// Errors that stop the program before the pipeline runs
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub client error: {0}")]
    Client(#[from] github::Error),
}

/// Problems found while reading configuration from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("invalid value for {var}: {source}")]
    InvalidName {
        var: &'static str,
        #[source]
        source: NameError,
    },
}

impl ConfigError {
    /// The environment variable the error refers to
    pub fn var(&self) -> &'static str {
        match self {
            ConfigError::Missing(var)
            | ConfigError::Invalid { var, .. }
            | ConfigError::InvalidName { var, .. } => var,
        }
    }
}

/// Why a repository or ref name was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("'{0}' is not in owner/name form")]
    NotOwnerName(String),

    #[error("'{0}' has an empty owner or name")]
    EmptyPart(String),

    #[error("ref name is empty")]
    EmptyRef,

    #[error("'{0}' contains whitespace")]
    Whitespace(String),

    #[error("'{0}' contains '..'")]
    DoubleDot(String),

    #[error("'{0}' starts or ends with '/'")]
    EdgeSlash(String),
}

/// Listing commits of the source repository failed
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch commits from {repo}: {source}")]
pub struct FetchError {
    pub repo: String,
    #[source]
    pub source: github::Error,
}

/// Triggering the workflow on the target repository failed
#[derive(Debug, thiserror::Error)]
#[error("failed to dispatch workflow {workflow} on {repo}: {source}")]
pub struct DispatchError {
    pub repo: String,
    pub workflow: String,
    #[source]
    pub source: github::Error,
}

/// Helper type for Results that use TriggerError
pub type Result<T> = std::result::Result<T, TriggerError>;
