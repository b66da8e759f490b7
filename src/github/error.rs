use reqwest::StatusCode;

/// Errors raised while talking to the GitHub REST API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("GitHub returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("error building URL: component {0:?} contains a slash")]
    UrlSlash(String),

    #[error("error building URL: {0} cannot be used as a base URL")]
    UrlCannotBeABase(String),

    #[error("error making request: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
