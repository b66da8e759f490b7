use std::time::Duration;

use reqwest::{IntoUrl, Url};
use secrecy::SecretString;

use super::{Client, Result};

// -------------------------------------------------------------------------------------------------
// ClientBuilder
// -------------------------------------------------------------------------------------------------
pub struct ClientBuilder {
    base_url: Option<Url>,
    token: SecretString,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    const USER_AGENT: &str = "build_trigger";

    pub fn new(token: SecretString) -> Self {
        ClientBuilder {
            base_url: None,
            token,
            timeout: None,
        }
    }

    pub fn base_url<T: IntoUrl>(mut self, url: T) -> Result<Self> {
        self.base_url = Some(url.into_url()?);
        Ok(self)
    }

    /// Bound every request to `timeout`. Without one a hung connection blocks the run.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client, falling back to `https://api.github.com` when no base URL was set.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => into_url(crate::DEFAULT_API_URL)?,
        };
        let mut inner = reqwest::ClientBuilder::new().user_agent(Self::USER_AGENT);
        if let Some(timeout) = self.timeout {
            inner = inner.timeout(timeout);
        }
        Ok(Client {
            base_url,
            token: self.token,
            inner: inner.build()?,
        })
    }
}

fn into_url<T: IntoUrl>(url: T) -> reqwest::Result<Url> {
    url.into_url()
}
